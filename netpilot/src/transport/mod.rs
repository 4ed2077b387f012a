//! Transport layer: raw byte channels to a device.
//!
//! A [`Transport`] moves bytes and nothing else: prompt detection, echo
//! stripping and command framing live in [`crate::channel`]. Transports are
//! created by a [`Connector`] so callers (and tests) can substitute their own.

pub mod config;
#[cfg(test)]
pub(crate) mod mock;
mod ssh;
mod telnet;

pub use config::{AuthMethod, HostKeyVerification, TransportConfig, TransportKind};
pub use ssh::SshTransport;
pub use telnet::TelnetTransport;

use async_trait::async_trait;

use crate::error::TransportError;

/// A live, authenticated byte channel to a device shell.
#[async_trait]
pub trait Transport: Send {
    /// Which protocol this transport speaks.
    fn kind(&self) -> TransportKind;

    /// Write raw bytes to the remote shell.
    async fn write(&mut self, data: &[u8]) -> Result<(), TransportError>;

    /// Wait for the next chunk of output.
    ///
    /// Returns `TransportError::Disconnected` once the remote end has closed.
    /// Callers bound the wait with their own deadline.
    async fn read(&mut self) -> Result<Vec<u8>, TransportError>;

    /// Send a protocol-level no-op and report whether the link is usable.
    async fn probe(&mut self) -> Result<bool, TransportError>;

    /// Tear the connection down.
    async fn close(&mut self) -> Result<(), TransportError>;
}

/// Opens transports.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Connect and authenticate according to `config`.
    async fn connect(&self, config: &TransportConfig) -> Result<Box<dyn Transport>, TransportError>;
}

/// Default connector: russh for SSH, tokio TCP for Telnet.
#[derive(Debug, Default, Clone, Copy)]
pub struct NetworkConnector;

#[async_trait]
impl Connector for NetworkConnector {
    async fn connect(&self, config: &TransportConfig) -> Result<Box<dyn Transport>, TransportError> {
        match config.kind {
            TransportKind::Ssh => Ok(Box::new(SshTransport::connect(config.clone()).await?)),
            TransportKind::Telnet => Ok(Box::new(TelnetTransport::connect(config).await?)),
        }
    }
}
