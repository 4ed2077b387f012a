//! Connection opener: from a device name to an open, vendor-specific driver.
//!
//! The opener resolves credentials, classifies the device when its vendor
//! is not known up front, picks the driver from a [`VendorRegistry`] and
//! negotiates the transport. IOS devices are tried over Telnet first and
//! fall back to SSH; every other vendor goes straight to SSH.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};

use crate::driver::{Driver, DriverBuilder};
use crate::error::{Error, Result};
use crate::platform::VendorRegistry;
use crate::platform::vendors::cisco_ios;
use crate::transport::{Connector, HostKeyVerification, NetworkConnector, TransportKind};

/// Error type returned by the external lookups.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Login credentials for a device.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Source of login credentials.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn credentials(&self) -> std::result::Result<Credentials, BoxError>;
}

/// Device OS lookup.
///
/// Returns a vendor tag such as `"IOS"`, `"XR"` or `"sros"`. A result
/// containing `"Unable"` means the device could not be classified.
#[async_trait]
pub trait OsClassifier: Send + Sync {
    async fn classify(&self, device: &str, format: &str) -> std::result::Result<String, BoxError>;
}

/// Credentials known ahead of time.
#[async_trait]
impl CredentialProvider for Credentials {
    async fn credentials(&self) -> std::result::Result<Credentials, BoxError> {
        Ok(self.clone())
    }
}

fn default_timeout() -> Duration {
    Duration::from_secs(60)
}

fn timeout_from_secs<'de, D>(deserializer: D) -> std::result::Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    u64::deserialize(deserializer).map(Duration::from_secs)
}

/// A device to connect to.
///
/// ```
/// let target: netpilot::DeviceTarget =
///     serde_json::from_str(r#"{"device": "core-rtr1", "vendor": "IOS"}"#).unwrap();
/// assert_eq!(target.timeout, std::time::Duration::from_secs(60));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeviceTarget {
    /// Hostname or address.
    pub device: String,

    /// Vendor tag; classified when absent.
    #[serde(default)]
    pub vendor: Option<String>,

    /// Port override, applied to every transport attempt.
    #[serde(default)]
    pub port: Option<u16>,

    /// Connect and read timeout; `timeout_secs` in inventories.
    #[serde(
        rename = "timeout_secs",
        default = "default_timeout",
        deserialize_with = "timeout_from_secs"
    )]
    pub timeout: Duration,
}

impl DeviceTarget {
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            vendor: None,
            port: None,
            timeout: default_timeout(),
        }
    }

    pub fn with_vendor(mut self, vendor: impl Into<String>) -> Self {
        self.vendor = Some(vendor.into());
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Map a classifier tag to the canonical vendor tag.
pub fn normalize_vendor_tag(tag: &str) -> String {
    match tag {
        "XR" => "iosxr".to_string(),
        "JUNIPER" => "junos".to_string(),
        other => other.to_lowercase(),
    }
}

/// Ordered transports to try for a vendor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportPlan {
    attempts: Vec<TransportKind>,
}

impl TransportPlan {
    /// IOS boxes often lack a working SSH setup, so Telnet goes first.
    pub fn for_vendor(vendor: &str) -> Self {
        let attempts = if vendor == cisco_ios::PLATFORM_NAME {
            vec![TransportKind::Telnet, TransportKind::Ssh]
        } else {
            vec![TransportKind::Ssh]
        };
        Self { attempts }
    }

    pub fn attempts(&self) -> &[TransportKind] {
        &self.attempts
    }
}

/// A driver together with the transport it ended up on.
pub struct Negotiated {
    pub driver: Box<dyn Driver>,
    pub transport: TransportKind,
}

impl fmt::Debug for Negotiated {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Negotiated")
            .field("platform", &self.driver.platform().name)
            .field("transport", &self.transport)
            .finish()
    }
}

/// Opens drivers for named devices.
pub struct ConnectionOpener {
    credentials: Arc<dyn CredentialProvider>,
    classifier: Arc<dyn OsClassifier>,
    classifier_format: String,
    registry: VendorRegistry,
    connector: Arc<dyn Connector>,
    host_key_verification: HostKeyVerification,
}

impl ConnectionOpener {
    pub fn new(credentials: Arc<dyn CredentialProvider>, classifier: Arc<dyn OsClassifier>) -> Self {
        Self {
            credentials,
            classifier,
            classifier_format: "vendor".to_string(),
            registry: VendorRegistry::builtin(),
            connector: Arc::new(NetworkConnector),
            host_key_verification: HostKeyVerification::default(),
        }
    }

    /// Format argument passed to the classifier.
    pub fn classifier_format(mut self, format: impl Into<String>) -> Self {
        self.classifier_format = format.into();
        self
    }

    /// Use a custom vendor registry.
    pub fn registry(mut self, registry: VendorRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Use a custom connector for every attempt.
    pub fn connector(mut self, connector: Arc<dyn Connector>) -> Self {
        self.connector = connector;
        self
    }

    pub fn host_key_verification(mut self, mode: HostKeyVerification) -> Self {
        self.host_key_verification = mode;
        self
    }

    /// Open a driver for `target`.
    pub async fn open(&self, target: &DeviceTarget) -> Result<Box<dyn Driver>> {
        Ok(self.open_negotiated(target).await?.driver)
    }

    /// Open a driver for `target` and report which transport succeeded.
    pub async fn open_negotiated(&self, target: &DeviceTarget) -> Result<Negotiated> {
        let credentials = self
            .credentials
            .credentials()
            .await
            .map_err(|e| Error::AuthResolution(e.to_string()))?;

        let tag = match &target.vendor {
            Some(vendor) => vendor.clone(),
            None => self.classify(&target.device).await?,
        };
        let vendor = normalize_vendor_tag(&tag);
        if !self.registry.contains(&vendor) {
            return Err(Error::UnsupportedVendor { vendor });
        }

        let plan = TransportPlan::for_vendor(&vendor);
        let attempts = plan.attempts();
        for (index, &kind) in attempts.iter().enumerate() {
            let last = index + 1 == attempts.len();
            match self.attempt(target, &vendor, &credentials, kind).await {
                Ok(driver) => {
                    info!("connected to {} ({vendor}) over {kind}", target.device);
                    return Ok(Negotiated {
                        driver,
                        transport: kind,
                    });
                }
                Err(err) if !last && err.is_transport() => {
                    warn!("{kind} to {} failed, trying next transport: {err}", target.device);
                }
                Err(err) => return Err(err),
            }
        }

        Err(Error::InvalidArgument(format!(
            "no transport to try for vendor '{vendor}'"
        )))
    }

    async fn classify(&self, device: &str) -> Result<String> {
        let unknown = |detail: String| Error::UnknownDevice {
            device: device.to_string(),
            detail,
        };
        let tag = self
            .classifier
            .classify(device, &self.classifier_format)
            .await
            .map_err(|e| unknown(e.to_string()))?;
        if tag.contains("Unable") {
            return Err(unknown(tag));
        }
        debug!("{device} classified as {tag:?}");
        Ok(tag)
    }

    async fn attempt(
        &self,
        target: &DeviceTarget,
        vendor: &str,
        credentials: &Credentials,
        kind: TransportKind,
    ) -> Result<Box<dyn Driver>> {
        let mut builder = DriverBuilder::new(target.device.clone())
            .username(credentials.username.clone())
            .password(credentials.password.expose_secret())
            .vendor(vendor)
            .transport(kind)
            .timeout(target.timeout)
            .host_key_verification(self.host_key_verification.clone())
            .connector(self.connector.clone());
        if let Some(port) = target.port {
            builder = builder.port(port);
        }

        let mut driver = builder.build_with(&self.registry)?;
        debug!("opening {} over {kind}", target.device);
        driver.open().await?;
        Ok(driver)
    }
}
