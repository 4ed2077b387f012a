//! Nokia SR OS driver.
//!
//! Classic CLI has no candidate datastore to stage against, so every
//! candidate operation and fact getter reports `NotImplemented`. Saving
//! runs `admin save`; the running configuration comes from
//! `admin display-config`.

use async_trait::async_trait;

use super::platform::{PLATFORM_NAME, platform};
use crate::driver::{
    CandidateSource, CliSession, Command, ConfigScope, ConfigSnapshot, ConfigState, Driver,
    DriverConfig, Getter,
};
use crate::error::{Error, Result};

/// Driver for Nokia SR OS routers.
pub struct SrosDriver {
    session: CliSession,
}

impl SrosDriver {
    /// Create a closed driver.
    pub fn new(config: DriverConfig) -> Result<Self> {
        Ok(Self {
            session: config.into_session(platform())?,
        })
    }

    /// Factory for the vendor registry.
    pub fn boxed(config: DriverConfig) -> Result<Box<dyn Driver>> {
        Ok(Box::new(Self::new(config)?))
    }

    fn not_implemented<T>(operation: &'static str) -> Result<T> {
        Err(Error::NotImplemented {
            operation,
            platform: PLATFORM_NAME.to_string(),
        })
    }
}

#[async_trait]
impl Driver for SrosDriver {
    fn session(&self) -> &CliSession {
        &self.session
    }

    fn session_mut(&mut self) -> &mut CliSession {
        &mut self.session
    }

    fn config_state(&self) -> ConfigState {
        ConfigState::NoCandidate
    }

    async fn save_config(&mut self) -> Result<String> {
        self.session.send(&Command::from(["admin save"])).await
    }

    async fn get_config(&mut self, scope: ConfigScope) -> Result<ConfigSnapshot> {
        let mut snapshot = ConfigSnapshot::default();
        if scope.includes_running() {
            snapshot.running = self.session.send(&"admin display-config".into()).await?;
        }
        Ok(snapshot)
    }

    async fn load_replace_candidate(&mut self, _source: CandidateSource) -> Result<()> {
        Self::not_implemented("load_replace_candidate")
    }

    async fn load_merge_candidate(&mut self, _source: CandidateSource) -> Result<()> {
        Self::not_implemented("load_merge_candidate")
    }

    async fn compare_config(&mut self) -> Result<String> {
        Self::not_implemented("compare_config")
    }

    async fn commit_config(&mut self, _message: &str) -> Result<()> {
        Self::not_implemented("commit_config")
    }

    async fn discard_config(&mut self) -> Result<()> {
        Self::not_implemented("discard_config")
    }

    async fn rollback(&mut self) -> Result<()> {
        Self::not_implemented("rollback")
    }

    async fn getter(&mut self, getter: Getter) -> Result<String> {
        Self::not_implemented(getter.operation())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::driver::DriverBuilder;
    use crate::transport::TransportKind;
    use crate::transport::mock::{MockConnector, ScriptedDevice};

    fn device() -> ScriptedDevice {
        ScriptedDevice::new("A:7750-1#")
            .respond("admin save", "Writing configuration to cf3:\\config.cfg\nCompleted.")
            .respond(
                "admin display-config",
                "# TiMOS-B-16.0.R4\nconfigure\n    system\n        name \"7750-1\"\n    exit\nexit all",
            )
            .respond("show uptime", "System Up Time         : 0 days, 00:01:44.31 (hr:min:sec)")
            .respond("show users", "Console  --  0d 00:02:05")
            .respond("show foo", "Error: Bad command.")
            .transition("configure", "A:7750-1>config#")
            .transition("port 1/1/3", "A:7750-1>config>port#")
            .transition("no shutdown", "*A:7750-1>config>port#")
            .transition("exit all", "*A:7750-1#")
    }

    async fn opened(connector: &MockConnector) -> Box<dyn Driver> {
        let mut driver = DriverBuilder::new("7750-1")
            .username("admin")
            .password("admin")
            .vendor("sros")
            .connector(Arc::new(connector.clone()))
            .build()
            .unwrap();
        driver.open().await.unwrap();
        driver
    }

    #[tokio::test]
    async fn test_open_disables_paging() {
        let connector = MockConnector::new(device());
        let driver = opened(&connector).await;
        assert_eq!(connector.writes(), vec!["environment no more"]);
        assert_eq!(driver.transport(), Some(TransportKind::Ssh));
        assert_eq!(driver.session().current_mode(), Some("exec"));
    }

    #[tokio::test]
    async fn test_save_config() {
        let connector = MockConnector::new(device());
        let mut driver = opened(&connector).await;
        let output = driver.save_config().await.unwrap();
        assert!(output.ends_with("Completed."));
        assert_eq!(connector.writes().last().map(String::as_str), Some("admin save"));
    }

    #[tokio::test]
    async fn test_get_config_running_only() {
        let connector = MockConnector::new(device());
        let mut driver = opened(&connector).await;

        let snapshot = driver.get_config(ConfigScope::All).await.unwrap();
        assert!(snapshot.running.starts_with("# TiMOS"));
        assert!(snapshot.startup.is_empty());
        assert!(snapshot.candidate.is_empty());

        let before = connector.writes().len();
        let snapshot = driver.get_config(ConfigScope::Startup).await.unwrap();
        assert_eq!(snapshot, ConfigSnapshot::default());
        assert_eq!(connector.writes().len(), before);
    }

    #[tokio::test]
    async fn test_cli() {
        let connector = MockConnector::new(device());
        let mut driver = opened(&connector).await;

        let results = driver
            .cli(Command::from(["show uptime", "show users"]))
            .await
            .unwrap();
        assert_eq!(results.len(), 2);
        assert!(results["show uptime"].starts_with("System Up Time"));

        let err = driver
            .cli(Command::from(["show uptime", "show foo"]))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::CommandRejected { command } if command == "show foo"));
    }

    #[tokio::test]
    async fn test_config_commands() {
        let connector = MockConnector::new(device());
        let mut driver = opened(&connector).await;

        let transcript = driver
            .config_commands(Command::from([
                "port 1/1/3",
                "description \"very nice\"",
                "no shutdown",
            ]))
            .await
            .unwrap();
        assert!(transcript.starts_with("port 1/1/3\r\nA:7750-1>config>port#"));
        assert!(transcript.ends_with("*A:7750-1>config>port#"));
        assert_eq!(driver.session().current_mode(), Some("exec"));
        assert_eq!(
            connector.writes()[1..],
            [
                "configure",
                "port 1/1/3",
                "description \"very nice\"",
                "no shutdown",
                "exit all"
            ]
        );
    }

    #[tokio::test]
    async fn test_candidate_operations_not_implemented() {
        let connector = MockConnector::new(device());
        let mut driver = opened(&connector).await;
        let before = connector.writes().len();

        let source = CandidateSource::Inline("configure system name r2".to_string());
        for result in [
            driver.load_replace_candidate(source.clone()).await,
            driver.load_merge_candidate(source).await,
            driver.discard_config().await,
            driver.commit_config("").await,
            driver.rollback().await,
        ] {
            assert!(matches!(result, Err(Error::NotImplemented { .. })));
        }
        assert!(matches!(
            driver.compare_config().await,
            Err(Error::NotImplemented { .. })
        ));
        assert!(matches!(
            driver.getter(Getter::Facts).await,
            Err(Error::NotImplemented { operation: "get_facts", .. })
        ));
        assert_eq!(connector.writes().len(), before);
    }
}
