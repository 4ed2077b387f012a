//! Builder for creating device drivers.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;

use super::Driver;
use super::session::CliSession;
use crate::error::{Error, Result};
use crate::platform::{PlatformDefinition, VendorRegistry};
use crate::transport::{
    AuthMethod, Connector, HostKeyVerification, NetworkConnector, TransportConfig, TransportKind,
};

/// Everything a vendor driver needs to create its session.
#[derive(Clone)]
pub struct DriverConfig {
    /// Connection parameters.
    pub transport: TransportConfig,

    /// Terminal size override; the platform's size is used when `None`.
    pub terminal_size: Option<(u32, u32)>,

    /// Opens the transport.
    pub connector: Arc<dyn Connector>,
}

impl DriverConfig {
    /// Create a closed session for `platform`.
    pub fn into_session(self, platform: PlatformDefinition) -> Result<CliSession> {
        let mut transport = self.transport;
        let (width, height) = self
            .terminal_size
            .unwrap_or((platform.terminal_width, platform.terminal_height));
        transport.terminal_width = width;
        transport.terminal_height = height;
        CliSession::new(transport, platform, self.connector)
    }
}

/// Builder for constructing device drivers.
///
/// # Example
///
/// ```rust,no_run
/// use netpilot::{Driver, DriverBuilder, TransportKind};
///
/// # async fn example() -> Result<(), netpilot::Error> {
/// let mut driver = DriverBuilder::new("192.0.2.10")
///     .username("admin")
///     .password("secret")
///     .vendor("sros")
///     .transport(TransportKind::Ssh)
///     .build()?;
/// driver.open().await?;
/// # Ok(())
/// # }
/// ```
pub struct DriverBuilder {
    host: String,
    port: Option<u16>,
    username: Option<String>,
    auth: AuthMethod,
    vendor: Option<String>,
    kind: TransportKind,
    timeout: Duration,
    terminal_size: Option<(u32, u32)>,
    host_key_verification: HostKeyVerification,
    known_hosts_path: Option<PathBuf>,
    connector: Option<Arc<dyn Connector>>,
}

impl DriverBuilder {
    /// Create a new driver builder for the specified host.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: None,
            username: None,
            auth: AuthMethod::None,
            vendor: None,
            kind: TransportKind::Ssh,
            timeout: Duration::from_secs(60),
            terminal_size: None,
            host_key_verification: HostKeyVerification::default(),
            known_hosts_path: None,
            connector: None,
        }
    }

    /// Set the port (default: the transport's well-known port).
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Set the username for authentication.
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Set password authentication. The password also answers `enable`.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.auth = AuthMethod::Password(SecretString::from(password.into()));
        self
    }

    /// Set private key authentication (SSH only).
    pub fn private_key(mut self, key_path: impl Into<PathBuf>) -> Self {
        self.auth = AuthMethod::PrivateKey {
            path: key_path.into(),
            passphrase: None,
        };
        self
    }

    /// Set private key authentication with passphrase (SSH only).
    pub fn private_key_with_passphrase(
        mut self,
        key_path: impl Into<PathBuf>,
        passphrase: impl Into<String>,
    ) -> Self {
        self.auth = AuthMethod::PrivateKey {
            path: key_path.into(),
            passphrase: Some(SecretString::from(passphrase.into())),
        };
        self
    }

    /// Set the canonical vendor tag (e.g. "sros", "ios").
    pub fn vendor(mut self, vendor: impl Into<String>) -> Self {
        self.vendor = Some(vendor.into());
        self
    }

    /// Set the transport (default: SSH).
    pub fn transport(mut self, kind: TransportKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set the connect and read timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the platform's terminal dimensions.
    pub fn terminal_size(mut self, width: u32, height: u32) -> Self {
        self.terminal_size = Some((width, height));
        self
    }

    /// Set the host key verification mode (SSH only).
    pub fn host_key_verification(mut self, mode: HostKeyVerification) -> Self {
        self.host_key_verification = mode;
        self
    }

    /// Use a custom known_hosts file (SSH only).
    pub fn known_hosts_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.known_hosts_path = Some(path.into());
        self
    }

    /// Open transports through `connector` instead of the network.
    pub fn connector(mut self, connector: Arc<dyn Connector>) -> Self {
        self.connector = Some(connector);
        self
    }

    /// Split into the vendor tag and the driver configuration.
    pub fn into_config(self) -> Result<(String, DriverConfig)> {
        let username = self
            .username
            .ok_or_else(|| Error::InvalidArgument("username is required".to_string()))?;
        let vendor = self
            .vendor
            .ok_or_else(|| Error::InvalidArgument("vendor is required".to_string()))?;

        let transport = TransportConfig {
            port: self.port.unwrap_or_else(|| self.kind.default_port()),
            host: self.host,
            kind: self.kind,
            username,
            auth: self.auth,
            timeout: self.timeout,
            terminal_width: 0,
            terminal_height: 0,
            host_key_verification: self.host_key_verification,
            known_hosts_path: self.known_hosts_path,
        };
        let config = DriverConfig {
            transport,
            terminal_size: self.terminal_size,
            connector: self
                .connector
                .unwrap_or_else(|| Arc::new(NetworkConnector)),
        };
        Ok((vendor, config))
    }

    /// Build a closed driver from the built-in vendors.
    ///
    /// Call `open()` on the returned driver to connect.
    pub fn build(self) -> Result<Box<dyn Driver>> {
        self.build_with(&VendorRegistry::builtin())
    }

    /// Build a closed driver from `registry`.
    pub fn build_with(self, registry: &VendorRegistry) -> Result<Box<dyn Driver>> {
        let (vendor, config) = self.into_config()?;
        registry.create(&vendor, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let (vendor, config) = DriverBuilder::new("r1")
            .username("admin")
            .password("secret")
            .vendor("ios")
            .transport(TransportKind::Telnet)
            .into_config()
            .unwrap();
        assert_eq!(vendor, "ios");
        assert_eq!(config.transport.port, 23);
        assert_eq!(config.transport.kind, TransportKind::Telnet);
        assert_eq!(config.transport.timeout, Duration::from_secs(60));
        assert!(config.transport.auth.password().is_some());
    }

    #[test]
    fn test_explicit_port_wins() {
        let (_, config) = DriverBuilder::new("r1")
            .username("admin")
            .vendor("sros")
            .port(2222)
            .into_config()
            .unwrap();
        assert_eq!(config.transport.port, 2222);
    }

    #[test]
    fn test_missing_fields() {
        assert!(matches!(
            DriverBuilder::new("r1").vendor("ios").into_config(),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            DriverBuilder::new("r1").username("admin").into_config(),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_terminal_size_from_platform() {
        let (_, config) = DriverBuilder::new("r1")
            .username("admin")
            .vendor("sros")
            .into_config()
            .unwrap();
        let platform = PlatformDefinition::new("lab")
            .with_mode(crate::platform::CliMode::new("exec", r"#$").unwrap())
            .with_default_mode("exec")
            .with_config_mode("exec")
            .with_terminal_size(512, 24);
        let session = config.into_session(platform).unwrap();
        assert_eq!(session.config().terminal_width, 512);
    }

    #[test]
    fn test_unknown_vendor() {
        let result = DriverBuilder::new("r1")
            .username("admin")
            .vendor("junos")
            .build();
        assert!(matches!(result, Err(Error::UnsupportedVendor { .. })));
    }
}
