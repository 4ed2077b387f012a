//! Configuration candidate state machine.
//!
//! Candidate configurations are handled as transactions:
//!
//! ```text
//!              load_*_candidate            commit_config
//! NoCandidate ──────────────────► Loaded ────────────────► Committed ──┐
//!      ▲                            │  ▲                     │  ▲      │ rollback
//!      │                            │  └─────────────────────┘  └──────┘
//!      │            discard_config  ▼       load_*_candidate
//!      └────────────────────────  Discarded
//! ```
//!
//! [`ConfigManager`] owns the state and enforces the transitions; a
//! [`ConfigDialect`] performs the vendor-specific exchanges. A failed
//! exchange never changes the state.

use std::future::Future;
use std::path::PathBuf;

use log::{debug, info};

use super::session::CliSession;
use crate::error::{Error, Result};

/// How a candidate is applied on commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMode {
    /// Replace the running configuration with the candidate.
    Replace,
    /// Merge the candidate into the running configuration.
    Merge,
}

impl LoadMode {
    /// The error a dialect reports when the device rejects a candidate.
    pub fn rejected(self, message: impl Into<String>) -> Error {
        match self {
            LoadMode::Replace => Error::ReplaceConfig(message.into()),
            LoadMode::Merge => Error::MergeConfig(message.into()),
        }
    }
}

/// Candidate lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfigState {
    #[default]
    NoCandidate,
    CandidateLoaded(LoadMode),
    Committed,
    Discarded,
}

/// Where candidate text comes from: exactly one of a file or inline text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateSource {
    File(PathBuf),
    Inline(String),
}

impl CandidateSource {
    /// Build from optional inputs; exactly one must be given.
    pub fn new(file: Option<PathBuf>, config: Option<String>) -> Result<Self> {
        match (file, config) {
            (Some(path), None) => Ok(CandidateSource::File(path)),
            (None, Some(text)) => Ok(CandidateSource::Inline(text)),
            (None, None) => Err(Error::InvalidArgument(
                "a candidate needs either a file or inline config".to_string(),
            )),
            (Some(_), Some(_)) => Err(Error::InvalidArgument(
                "give a candidate file or inline config, not both".to_string(),
            )),
        }
    }

    /// Resolve to text; an unreadable file is a rejection for `mode`.
    pub async fn read(&self, mode: LoadMode) -> Result<String> {
        match self {
            CandidateSource::Inline(text) => Ok(text.clone()),
            CandidateSource::File(path) => tokio::fs::read_to_string(path)
                .await
                .map_err(|e| mode.rejected(format!("reading {}: {e}", path.display()))),
        }
    }
}

/// Which configuration roles to retrieve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfigScope {
    Startup,
    Running,
    Candidate,
    #[default]
    All,
}

impl ConfigScope {
    pub fn includes_startup(self) -> bool {
        matches!(self, ConfigScope::Startup | ConfigScope::All)
    }

    pub fn includes_running(self) -> bool {
        matches!(self, ConfigScope::Running | ConfigScope::All)
    }

    pub fn includes_candidate(self) -> bool {
        matches!(self, ConfigScope::Candidate | ConfigScope::All)
    }
}

/// Retrieved configuration text per role; empty when absent or not requested.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigSnapshot {
    pub startup: String,
    pub running: String,
    pub candidate: String,
}

/// Vendor-specific candidate handling.
pub trait ConfigDialect: Send + Sync {
    /// Stage `text` as the candidate for `mode`.
    fn load(
        &self,
        session: &mut CliSession,
        mode: LoadMode,
        text: &str,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Diff between the staged candidate and the running configuration.
    fn compare(
        &self,
        session: &mut CliSession,
        mode: LoadMode,
    ) -> impl Future<Output = Result<String>> + Send;

    /// Apply the staged candidate.
    fn commit(
        &self,
        session: &mut CliSession,
        mode: LoadMode,
        message: &str,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Drop the staged candidate.
    fn discard(
        &self,
        session: &mut CliSession,
        mode: LoadMode,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Restore the configuration saved by the last commit.
    fn rollback(&self, session: &mut CliSession) -> impl Future<Output = Result<()>> + Send;
}

/// Enforces the candidate lifecycle on top of a [`ConfigDialect`].
#[derive(Debug, Default)]
pub struct ConfigManager<D> {
    dialect: D,
    state: ConfigState,
}

impl<D: ConfigDialect> ConfigManager<D> {
    pub fn new(dialect: D) -> Self {
        Self {
            dialect,
            state: ConfigState::NoCandidate,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConfigState {
        self.state
    }

    /// The vendor dialect.
    pub fn dialect(&self) -> &D {
        &self.dialect
    }

    /// Stage a candidate. Loading again replaces the previous candidate.
    pub async fn load(
        &mut self,
        session: &mut CliSession,
        mode: LoadMode,
        source: &CandidateSource,
    ) -> Result<()> {
        let text = source.read(mode).await?;
        self.dialect.load(session, mode, &text).await?;
        debug!("candidate loaded ({mode:?}), was {:?}", self.state);
        self.state = ConfigState::CandidateLoaded(mode);
        Ok(())
    }

    /// Diff of the staged candidate; empty when nothing is staged.
    pub async fn compare(&mut self, session: &mut CliSession) -> Result<String> {
        match self.state {
            ConfigState::CandidateLoaded(mode) => self.dialect.compare(session, mode).await,
            _ => Ok(String::new()),
        }
    }

    /// Apply the staged candidate.
    pub async fn commit(&mut self, session: &mut CliSession, message: &str) -> Result<()> {
        let ConfigState::CandidateLoaded(mode) = self.state else {
            return Err(Error::InvalidArgument(
                "no candidate loaded to commit".to_string(),
            ));
        };
        self.dialect.commit(session, mode, message).await?;
        if !message.is_empty() {
            info!("committed {mode:?} candidate: {message}");
        }
        self.state = ConfigState::Committed;
        Ok(())
    }

    /// Drop the staged candidate; a no-op when nothing is staged.
    pub async fn discard(&mut self, session: &mut CliSession) -> Result<()> {
        if let ConfigState::CandidateLoaded(mode) = self.state {
            self.dialect.discard(session, mode).await?;
            self.state = ConfigState::Discarded;
        }
        Ok(())
    }

    /// Undo the last commit.
    pub async fn rollback(&mut self, session: &mut CliSession) -> Result<()> {
        if self.state != ConfigState::Committed {
            return Err(Error::InvalidArgument(
                "rollback needs a committed configuration".to_string(),
            ));
        }
        self.dialect.rollback(session).await
    }
}
