//! Cisco IOS driver.

use async_trait::async_trait;

use super::config_session::IosDialect;
use super::platform::{PLATFORM_NAME, platform};
use crate::driver::{
    CandidateSource, CliSession, Command, ConfigManager, ConfigScope, ConfigSnapshot, ConfigState,
    Driver, DriverConfig, Getter, LoadMode,
};
use crate::error::{Error, Result};

/// Driver for Cisco IOS and IOS-XE devices.
pub struct IosDriver {
    session: CliSession,
    config: ConfigManager<IosDialect>,
}

impl IosDriver {
    /// Create a closed driver staging candidates on `flash:`.
    pub fn new(config: DriverConfig) -> Result<Self> {
        Self::with_dialect(config, IosDialect::default())
    }

    /// Create a closed driver with a custom configuration dialect.
    pub fn with_dialect(config: DriverConfig, dialect: IosDialect) -> Result<Self> {
        Ok(Self {
            session: config.into_session(platform())?,
            config: ConfigManager::new(dialect),
        })
    }

    /// Factory for the vendor registry.
    pub fn boxed(config: DriverConfig) -> Result<Box<dyn Driver>> {
        Ok(Box::new(Self::new(config)?))
    }

    fn getter_command(getter: Getter) -> Option<&'static str> {
        let command = match getter {
            Getter::Facts => "show version",
            Getter::Interfaces | Getter::InterfacesCounters => "show interfaces",
            Getter::InterfacesIp => "show ip interface",
            Getter::LldpNeighbors => "show lldp neighbors",
            Getter::LldpNeighborsDetail => "show lldp neighbors detail",
            Getter::BgpNeighbors => "show ip bgp summary",
            Getter::BgpNeighborsDetail => "show ip bgp neighbors",
            Getter::Environment => "show environment all",
            Getter::ArpTable => "show arp",
            Getter::Ipv6NeighborsTable => "show ipv6 neighbors",
            Getter::NtpPeers => "show running-config | include ntp peer",
            Getter::NtpServers => "show running-config | include ntp server",
            Getter::NtpStats => "show ntp associations",
            Getter::MacAddressTable => "show mac-address-table",
            Getter::SnmpInformation => "show running-config | include snmp-server",
            Getter::Users => "show running-config | include username",
            Getter::Optics => "show interfaces transceiver",
            Getter::NetworkInstances => "show vrf detail",
            Getter::ProbesConfig => return None,
        };
        Some(command)
    }
}

#[async_trait]
impl Driver for IosDriver {
    fn session(&self) -> &CliSession {
        &self.session
    }

    fn session_mut(&mut self) -> &mut CliSession {
        &mut self.session
    }

    fn config_state(&self) -> ConfigState {
        self.config.state()
    }

    async fn save_config(&mut self) -> Result<String> {
        self.session.send(&"write memory".into()).await
    }

    async fn get_config(&mut self, scope: ConfigScope) -> Result<ConfigSnapshot> {
        let mut snapshot = ConfigSnapshot::default();
        if scope.includes_startup() {
            snapshot.startup = self.session.send(&"show startup-config".into()).await?;
        }
        if scope.includes_running() {
            snapshot.running = self.session.send(&"show running-config".into()).await?;
        }
        Ok(snapshot)
    }

    async fn load_replace_candidate(&mut self, source: CandidateSource) -> Result<()> {
        self.config
            .load(&mut self.session, LoadMode::Replace, &source)
            .await
    }

    async fn load_merge_candidate(&mut self, source: CandidateSource) -> Result<()> {
        self.config
            .load(&mut self.session, LoadMode::Merge, &source)
            .await
    }

    async fn compare_config(&mut self) -> Result<String> {
        self.config.compare(&mut self.session).await
    }

    async fn commit_config(&mut self, message: &str) -> Result<()> {
        self.config.commit(&mut self.session, message).await
    }

    async fn discard_config(&mut self) -> Result<()> {
        self.config.discard(&mut self.session).await
    }

    async fn rollback(&mut self) -> Result<()> {
        self.config.rollback(&mut self.session).await
    }

    async fn getter(&mut self, getter: Getter) -> Result<String> {
        let Some(command) = Self::getter_command(getter) else {
            return Err(Error::NotImplemented {
                operation: getter.operation(),
                platform: PLATFORM_NAME.to_string(),
            });
        };
        self.session.send(&Command::from(command)).await
    }
}
