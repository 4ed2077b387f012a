//! High-level driver for device interaction.
//!
//! Every vendor implements [`Driver`]. Session plumbing (open, close,
//! liveness, command execution) comes from default methods over the
//! driver's [`CliSession`]; configuration management has no defaults, so
//! each vendor states what it supports and returns
//! [`Error::NotImplemented`](crate::Error::NotImplemented) for the rest.

mod builder;
mod command;
pub mod config_session;
mod getter;
mod modes;
mod session;

pub use builder::{DriverBuilder, DriverConfig};
pub use command::Command;
pub use config_session::{
    CandidateSource, ConfigDialect, ConfigManager, ConfigScope, ConfigSnapshot, ConfigState,
    LoadMode,
};
pub use getter::Getter;
pub use modes::{ModeTracker, Transition};
pub use session::{CliSession, Liveness};

use async_trait::async_trait;
use indexmap::IndexMap;

use crate::error::Result;
use crate::platform::PlatformDefinition;
use crate::transport::TransportKind;

/// Trait for vendor device drivers.
///
/// # Example
///
/// ```rust,no_run
/// use netpilot::{Command, Driver, DriverBuilder};
///
/// # async fn example() -> Result<(), netpilot::Error> {
/// let mut driver = DriverBuilder::new("192.0.2.1")
///     .username("admin")
///     .password("secret")
///     .vendor("ios")
///     .build()?;
/// driver.open().await?;
///
/// let version = driver
///     .send(Command::from(["show version", "show system information"]))
///     .await?;
/// println!("{version}");
///
/// driver
///     .config_commands(Command::from(["interface Gi3", "description uplink"]))
///     .await?;
/// driver.close().await?;
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait Driver: Send {
    /// The underlying CLI session.
    fn session(&self) -> &CliSession;

    /// The underlying CLI session, mutably.
    fn session_mut(&mut self) -> &mut CliSession;

    /// Candidate configuration state.
    fn config_state(&self) -> ConfigState;

    /// Platform definition of this driver.
    fn platform(&self) -> &PlatformDefinition {
        self.session().platform()
    }

    /// Transport of the live session, if any.
    fn transport(&self) -> Option<TransportKind> {
        self.session().transport_kind()
    }

    /// Open the session.
    async fn open(&mut self) -> Result<()> {
        self.session_mut().open().await
    }

    /// Close the session.
    async fn close(&mut self) -> Result<()> {
        self.session_mut().close().await
    }

    /// Check whether the session is usable.
    ///
    /// Returns `false` without any I/O when no session is open. A failed
    /// probe destroys the session; this never returns an error.
    async fn is_alive(&mut self) -> bool {
        self.session_mut().is_alive().await
    }

    /// Run a command, or the first accepted of ordered candidates.
    async fn send(&mut self, command: Command) -> Result<String> {
        self.session_mut().send(&command).await
    }

    /// Run a list of commands and map each to its output.
    async fn cli(&mut self, commands: Command) -> Result<IndexMap<String, String>> {
        self.session_mut().cli(&commands).await
    }

    /// Send configuration lines in configuration mode.
    async fn config_commands(&mut self, commands: Command) -> Result<String> {
        self.session_mut().config_commands(&commands).await
    }

    /// Persist the running configuration.
    async fn save_config(&mut self) -> Result<String>;

    /// Retrieve configuration text for the requested roles.
    async fn get_config(&mut self, scope: ConfigScope) -> Result<ConfigSnapshot>;

    /// Stage a candidate that replaces the running configuration.
    async fn load_replace_candidate(&mut self, source: CandidateSource) -> Result<()>;

    /// Stage a candidate that merges into the running configuration.
    async fn load_merge_candidate(&mut self, source: CandidateSource) -> Result<()>;

    /// Diff of the staged candidate; empty when nothing is staged.
    async fn compare_config(&mut self) -> Result<String>;

    /// Apply the staged candidate.
    async fn commit_config(&mut self, message: &str) -> Result<()>;

    /// Drop the staged candidate.
    async fn discard_config(&mut self) -> Result<()>;

    /// Undo the last commit.
    async fn rollback(&mut self) -> Result<()>;

    /// Raw output for a vendor fact getter.
    async fn getter(&mut self, getter: Getter) -> Result<String>;
}
