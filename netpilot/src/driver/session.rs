//! Live CLI session: connection lifecycle, mode navigation and command execution.
//!
//! A [`CliSession`] owns at most one [`CliChannel`]. Transport failures while
//! opening surface as [`Error::Transport`]; once the session is up, any
//! transport failure destroys the channel and surfaces as
//! [`Error::ConnectionClosed`].

use std::sync::Arc;

use indexmap::IndexMap;
use log::{debug, trace, warn};
use regex::bytes::Regex;
use secrecy::ExposeSecret;

use super::command::Command;
use super::modes::ModeTracker;
use crate::channel::{CliChannel, Exchange, combine_patterns, split_prompt};
use crate::error::{DriverError, Error, PlatformError, Result};
use crate::normalize::OutputNormalizer;
use crate::platform::PlatformDefinition;
use crate::transport::{Connector, TransportConfig, TransportKind};

/// What is known about the health of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Liveness {
    /// Opened, and the last probe (if any) succeeded.
    Alive,
    /// Closed, lost, or failed a probe.
    Dead,
    /// Never opened.
    #[default]
    Unknown,
}

/// Single interactive CLI session to one device.
pub struct CliSession {
    config: TransportConfig,
    platform: PlatformDefinition,
    connector: Arc<dyn Connector>,
    prompt_pattern: Regex,
    normalizer: OutputNormalizer,
    modes: ModeTracker,
    channel: Option<CliChannel>,
    liveness: Liveness,
}

impl CliSession {
    /// Create a closed session.
    pub fn new(
        config: TransportConfig,
        platform: PlatformDefinition,
        connector: Arc<dyn Connector>,
    ) -> Result<Self> {
        platform.validate()?;
        let prompt_pattern = platform.prompt_pattern()?;
        let normalizer = OutputNormalizer::with_defaults(&platform.noise_patterns).map_err(|e| {
            PlatformError::InvalidDefinition {
                message: format!("{}: bad noise pattern: {e}", platform.name),
            }
        })?;
        let modes = ModeTracker::new(platform.modes.clone());

        Ok(Self {
            config,
            platform,
            connector,
            prompt_pattern,
            normalizer,
            modes,
            channel: None,
            liveness: Liveness::Unknown,
        })
    }

    /// Platform definition driving this session.
    pub fn platform(&self) -> &PlatformDefinition {
        &self.platform
    }

    /// Connection parameters.
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// Transport of the live session, if any.
    pub fn transport_kind(&self) -> Option<TransportKind> {
        self.channel.as_ref().map(CliChannel::kind)
    }

    /// Whether a channel is held.
    pub fn is_open(&self) -> bool {
        self.channel.is_some()
    }

    /// Last known health.
    pub fn liveness(&self) -> Liveness {
        self.liveness
    }

    /// Current CLI mode name.
    pub fn current_mode(&self) -> Option<&str> {
        self.modes.current()
    }

    /// Strip the platform's noise lines from `raw`.
    pub fn normalize(&self, raw: &str) -> String {
        self.normalizer.normalize(raw)
    }

    /// Connect, settle in the default mode and run the on-open commands.
    pub async fn open(&mut self) -> Result<()> {
        if self.channel.is_some() {
            return Err(DriverError::AlreadyConnected.into());
        }

        debug!(
            "opening {} session to {} ({})",
            self.config.kind,
            self.config.socket_addr(),
            self.platform.name
        );
        let transport = self.connector.connect(&self.config).await?;
        self.channel = Some(CliChannel::new(
            transport,
            self.config.timeout,
            self.platform.search_depth,
        ));

        if let Err(err) = self.establish().await {
            warn!("session setup on {} failed: {err}", self.config.host);
            self.teardown().await;
            return Err(err);
        }

        self.liveness = Liveness::Alive;
        Ok(())
    }

    async fn establish(&mut self) -> Result<()> {
        let channel = self.channel.as_mut().ok_or(DriverError::NotConnected)?;
        let greeting = channel.read_prompt(&self.prompt_pattern).await?;
        let mode = self.modes.observe(&greeting.prompt)?;
        debug!("initial prompt {:?} (mode {mode})", greeting.prompt);

        let target = self.platform.default_mode.clone();
        self.navigate(&target).await?;

        for command in self.platform.on_open_commands.clone() {
            let exchange = self.exchange(&command).await?;
            if let Some(marker) = self.platform.invalid_marker(&exchange.output) {
                debug!("on-open command {command:?} rejected ({marker})");
            }
        }
        Ok(())
    }

    async fn teardown(&mut self) {
        if let Some(channel) = self.channel.take() {
            if let Err(err) = channel.close().await {
                trace!("close after failure: {err}");
            }
        }
        self.modes.reset();
        self.liveness = Liveness::Dead;
    }

    /// Close the session. Closing a closed session is a no-op.
    pub async fn close(&mut self) -> Result<()> {
        let Some(channel) = self.channel.take() else {
            return Ok(());
        };
        debug!("closing session to {}", self.config.host);
        self.modes.reset();
        self.liveness = Liveness::Dead;
        channel.close().await?;
        Ok(())
    }

    /// Probe the transport. Never fails: a failed probe destroys the session
    /// and reports `false`.
    pub async fn is_alive(&mut self) -> bool {
        let Some(channel) = self.channel.as_mut() else {
            return false;
        };
        match channel.probe().await {
            Ok(true) => {
                self.liveness = Liveness::Alive;
                true
            }
            Ok(false) => {
                debug!("session to {} is no longer active", self.config.host);
                self.teardown().await;
                false
            }
            Err(err) => {
                debug!("liveness probe to {} failed: {err}", self.config.host);
                self.teardown().await;
                false
            }
        }
    }

    /// Run a command or an ordered list of candidates and return normalized output.
    ///
    /// See [`Command`] for the candidate-list semantics.
    pub async fn send(&mut self, command: &Command) -> Result<String> {
        let result = match command {
            Command::Single(command) => self.run(command).await,
            Command::List(candidates) if candidates.is_empty() => {
                return Err(Error::InvalidArgument(
                    "send needs at least one command".to_string(),
                ));
            }
            Command::List(candidates) => self.run_candidates(candidates).await,
        };
        self.settle(result)
    }

    /// Run every command of a list and map each command to its normalized output.
    ///
    /// Fails with [`Error::CommandRejected`] on the first rejected command;
    /// no partial result is returned.
    pub async fn cli(&mut self, commands: &Command) -> Result<IndexMap<String, String>> {
        let Command::List(commands) = commands else {
            return Err(Error::InvalidArgument(
                "cli expects a list of commands".to_string(),
            ));
        };
        let result = self.run_batch(commands).await;
        self.settle(result)
    }

    /// Send configuration lines in the platform's configuration mode.
    ///
    /// Returns the raw transcript of the exchanges.
    pub async fn config_commands(&mut self, commands: &Command) -> Result<String> {
        let lines = match commands {
            Command::List(lines) if !lines.is_empty() => lines,
            Command::List(_) => {
                return Err(Error::InvalidArgument(
                    "config_commands needs at least one line".to_string(),
                ));
            }
            Command::Single(_) => {
                return Err(Error::InvalidArgument(
                    "config_commands expects a list of commands".to_string(),
                ));
            }
        };
        let result = self.run_config(lines).await;
        self.settle(result)
    }

    /// Send one command and return the full exchange, unnormalized.
    pub async fn send_command(&mut self, command: &str) -> Result<Exchange> {
        let result = self.exchange(command).await;
        self.settle(result)
    }

    /// Move to the named CLI mode.
    pub async fn acquire_mode(&mut self, mode: &str) -> Result<()> {
        let result = self.navigate(mode).await;
        self.settle(result)
    }

    /// Turn a transport failure into `ConnectionClosed` and drop the channel.
    fn settle<T>(&mut self, result: Result<T>) -> Result<T> {
        match result {
            Err(Error::Transport(err)) => {
                warn!("session to {} lost: {err}", self.config.host);
                self.channel = None;
                self.modes.reset();
                self.liveness = Liveness::Dead;
                Err(Error::connection_closed(err))
            }
            other => other,
        }
    }

    async fn exchange(&mut self, command: &str) -> Result<Exchange> {
        let channel = self.channel.as_mut().ok_or(DriverError::NotConnected)?;
        trace!("sending {command:?}");
        let exchange = channel.send_command(command, &self.prompt_pattern).await?;
        if self.modes.observe(&exchange.prompt).is_err() {
            trace!("prompt {:?} matches no mode", exchange.prompt);
        }
        Ok(exchange)
    }

    async fn run(&mut self, command: &str) -> Result<String> {
        let exchange = self.exchange(command).await?;
        Ok(self.normalizer.normalize(&exchange.output))
    }

    async fn run_candidates(&mut self, candidates: &[String]) -> Result<String> {
        let mut last = String::new();
        for candidate in candidates {
            let output = self.run(candidate).await?;
            if !self.platform.is_invalid(&output) {
                return Ok(output);
            }
            debug!("{candidate:?} rejected, trying next candidate");
            last = output;
        }
        Ok(last)
    }

    async fn run_batch(&mut self, commands: &[String]) -> Result<IndexMap<String, String>> {
        let mut results = IndexMap::with_capacity(commands.len());
        for command in commands {
            let output = self.run(command).await?;
            if self.platform.is_invalid(&output) {
                return Err(Error::CommandRejected {
                    command: command.clone(),
                });
            }
            results.insert(command.clone(), output);
        }
        Ok(results)
    }

    async fn run_config(&mut self, lines: &[String]) -> Result<String> {
        let previous = self
            .modes
            .current()
            .map(str::to_string)
            .ok_or(DriverError::NotConnected)?;
        let config_mode = self.platform.config_mode.clone();
        self.navigate(&config_mode).await?;

        let mut transcript = String::new();
        for line in lines {
            let exchange = self.exchange(line).await?;
            transcript.push_str(&exchange.raw);
        }

        self.navigate(&previous).await?;
        Ok(transcript)
    }

    async fn navigate(&mut self, target: &str) -> Result<()> {
        let current = self
            .modes
            .current()
            .map(str::to_string)
            .ok_or(DriverError::NotConnected)?;
        if current == target {
            return Ok(());
        }

        let path = self.modes.find_path(&current, target)?;
        for hop in path.windows(2) {
            let (from, to) = (&hop[0], &hop[1]);
            let transition =
                self.modes
                    .transition(from, to)
                    .ok_or_else(|| DriverError::NoModePath {
                        from: from.clone(),
                        to: to.clone(),
                    })?;
            debug!("mode {from} -> {to} ({:?})", transition.command);

            let prompt = match &transition.auth_prompt {
                Some(auth) => self.enter_with_auth(&transition.command, auth, to).await?,
                None => self.exchange(&transition.command).await?.prompt,
            };
            if self.modes.observe(&prompt)? != *to {
                return Err(DriverError::ModeAcquisitionFailed { target: to.clone() }.into());
            }
        }
        Ok(())
    }

    /// Send a mode command that may ask for a password; returns the prompt reached.
    async fn enter_with_auth(&mut self, command: &str, auth: &Regex, target: &str) -> Result<String> {
        let either = combine_patterns([auth, &self.prompt_pattern]).map_err(|e| {
            PlatformError::InvalidDefinition {
                message: format!("{}: {e}", self.platform.name),
            }
        })?;
        let channel = self.channel.as_mut().ok_or(DriverError::NotConnected)?;
        let failed = || DriverError::ModeAcquisitionFailed {
            target: target.to_string(),
        };

        let mut raw = channel.send_until(command, &either).await?;
        if !split_prompt(&raw, auth).1.is_empty() {
            let password = self.config.auth.password().ok_or_else(failed)?;
            trace!("answering password prompt for {target}");
            raw = channel.send_until(password.expose_secret(), &either).await?;
            if !split_prompt(&raw, auth).1.is_empty() {
                return Err(failed().into());
            }
        }

        let (_, prompt) = split_prompt(&raw, &self.prompt_pattern);
        Ok(prompt.to_string())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use secrecy::SecretString;

    use super::*;
    use crate::platform::CliMode;
    use crate::transport::AuthMethod;
    use crate::transport::mock::{MockConnector, ScriptedDevice};

    fn platform() -> PlatformDefinition {
        PlatformDefinition::new("lab")
            .with_mode(CliMode::new("exec", r"(?m)^[\w.\-]+>\s?$").unwrap())
            .with_mode(
                CliMode::new("privilege_exec", r"(?m)^[\w.\-]+#\s?$")
                    .unwrap()
                    .with_parent("exec")
                    .with_enter("enable")
                    .with_exit("disable")
                    .with_auth(r"(?m)^Password:\s?$")
                    .unwrap(),
            )
            .with_mode(
                CliMode::new("configuration", r"(?m)^[\w.\-]+\(config[\w.\-]*\)#\s?$")
                    .unwrap()
                    .with_parent("privilege_exec")
                    .with_enter("configure terminal")
                    .with_exit("end"),
            )
            .with_default_mode("privilege_exec")
            .with_config_mode("configuration")
            .with_invalid_marker("% Invalid")
            .with_on_open_command("terminal length 0")
    }

    fn device() -> ScriptedDevice {
        ScriptedDevice::new("r1>")
            .transition("enable", "Password:")
            .transition("secret", "r1#")
            .transition("configure terminal", "r1(config)#")
            .transition("interface Gi3", "r1(config-if)#")
            .transition("end", "r1#")
            .respond("show clock", "Time source is NTP\n10:00:00 UTC")
            .respond("show version", "% Invalid input detected at '^' marker.")
            .respond("show system information", "System Name : r1")
            .respond("bogus-cmd", "% Invalid input detected")
            .respond("show uptime", "up 3 days")
            .hangup_on("reload")
    }

    fn session(connector: &MockConnector) -> CliSession {
        let config = TransportConfig {
            host: "r1".to_string(),
            port: 22,
            kind: TransportKind::Ssh,
            username: "admin".to_string(),
            auth: AuthMethod::Password(SecretString::from("secret")),
            timeout: Duration::from_secs(5),
            terminal_width: 511,
            terminal_height: 24,
            host_key_verification: Default::default(),
            known_hosts_path: None,
        };
        CliSession::new(config, platform(), Arc::new(connector.clone())).unwrap()
    }

    async fn opened() -> (MockConnector, CliSession) {
        let connector = MockConnector::new(device());
        let mut session = session(&connector);
        session.open().await.unwrap();
        (connector, session)
    }

    #[tokio::test]
    async fn test_open_enables_and_runs_on_open() {
        let (connector, session) = opened().await;
        assert_eq!(session.current_mode(), Some("privilege_exec"));
        assert_eq!(session.liveness(), Liveness::Alive);
        assert_eq!(session.transport_kind(), Some(TransportKind::Ssh));
        assert_eq!(connector.writes(), vec!["enable", "secret", "terminal length 0"]);
    }

    #[tokio::test]
    async fn test_open_twice_rejected() {
        let (_, mut session) = opened().await;
        assert!(matches!(
            session.open().await,
            Err(Error::Driver(DriverError::AlreadyConnected))
        ));
    }

    #[tokio::test]
    async fn test_wrong_enable_password() {
        let device = ScriptedDevice::new("r1>").transition("enable", "Password:");
        let connector = MockConnector::new(device);
        let mut session = session(&connector);

        let err = session.open().await.unwrap_err();
        assert!(matches!(
            err,
            Error::Driver(DriverError::ModeAcquisitionFailed { .. })
        ));
        assert!(!session.is_open());
        assert_eq!(connector.closes(), 1);
    }

    #[tokio::test]
    async fn test_send_single_normalizes() {
        let (_, mut session) = opened().await;
        let output = session.send(&"show clock".into()).await.unwrap();
        assert_eq!(output, "10:00:00 UTC");
    }

    #[tokio::test]
    async fn test_send_candidates_first_clean_wins() {
        let (connector, mut session) = opened().await;
        let output = session
            .send(&["show version", "show system information", "show uptime"].into())
            .await
            .unwrap();
        assert_eq!(output, "System Name : r1");
        assert!(!connector.writes().contains(&"show uptime".to_string()));
    }

    #[tokio::test]
    async fn test_send_candidates_all_rejected_returns_last() {
        let (_, mut session) = opened().await;
        let output = session.send(&["show version", "bogus-cmd"].into()).await.unwrap();
        assert_eq!(output, "% Invalid input detected");
    }

    #[tokio::test]
    async fn test_send_empty_list() {
        let (connector, mut session) = opened().await;
        let before = connector.writes().len();
        let err = session.send(&Vec::<String>::new().into()).await.unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert_eq!(connector.writes().len(), before);
    }

    #[tokio::test]
    async fn test_cli_batch() {
        let (_, mut session) = opened().await;
        let results = session
            .cli(&["show uptime", "show clock"].into())
            .await
            .unwrap();
        let keys: Vec<_> = results.keys().cloned().collect();
        assert_eq!(keys, vec!["show uptime", "show clock"]);
        assert_eq!(results["show uptime"], "up 3 days");
    }

    #[tokio::test]
    async fn test_cli_rejected_command() {
        let (_, mut session) = opened().await;
        let err = session
            .cli(&["show uptime", "bogus-cmd"].into())
            .await
            .unwrap_err();
        match err {
            Error::CommandRejected { command } => assert_eq!(command, "bogus-cmd"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_cli_single_is_invalid() {
        let (connector, mut session) = opened().await;
        let before = connector.writes().len();
        let err = session.cli(&"show uptime".into()).await.unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert_eq!(connector.writes().len(), before);
    }

    #[tokio::test]
    async fn test_config_commands() {
        let (connector, mut session) = opened().await;
        let transcript = session
            .config_commands(&["interface Gi3", "description uplink"].into())
            .await
            .unwrap();

        assert!(transcript.contains("interface Gi3"));
        assert!(transcript.contains("r1(config-if)#"));
        assert_eq!(session.current_mode(), Some("privilege_exec"));
        assert_eq!(
            connector.writes()[3..],
            ["configure terminal", "interface Gi3", "description uplink", "end"]
        );
    }

    #[tokio::test]
    async fn test_config_commands_rejects_non_list() {
        let (connector, mut session) = opened().await;
        let before = connector.writes().len();

        let err = session.config_commands(&"not a list".into()).await.unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        let err = session
            .config_commands(&Vec::<String>::new().into())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));

        assert_eq!(connector.writes().len(), before);
    }

    #[tokio::test]
    async fn test_hangup_closes_session() {
        let (_, mut session) = opened().await;
        let err = session.send(&"reload".into()).await.unwrap_err();
        assert!(matches!(err, Error::ConnectionClosed { .. }));
        assert!(!session.is_open());
        assert_eq!(session.liveness(), Liveness::Dead);

        let err = session.send(&"show clock".into()).await.unwrap_err();
        assert!(matches!(err, Error::Driver(DriverError::NotConnected)));
    }

    #[tokio::test]
    async fn test_is_alive_without_session() {
        let connector = MockConnector::new(device());
        let mut session = session(&connector);
        assert!(!session.is_alive().await);
        assert_eq!(connector.probes(), 0);
        assert!(connector.connects().is_empty());
    }

    #[tokio::test]
    async fn test_is_alive_probes() {
        let (connector, mut session) = opened().await;
        assert!(session.is_alive().await);
        assert_eq!(connector.probes(), 1);

        let _ = session.send(&"reload".into()).await;
        assert!(!session.is_alive().await);
        assert_eq!(connector.probes(), 1);
    }

    #[tokio::test]
    async fn test_close() {
        let (connector, mut session) = opened().await;
        session.close().await.unwrap();
        assert!(!session.is_open());
        assert_eq!(connector.closes(), 1);
        // Idempotent
        session.close().await.unwrap();
        assert_eq!(connector.closes(), 1);
    }
}
