//! Error types for netpilot.

use std::io;
use thiserror::Error;

/// Main error type for netpilot operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Credentials could not be resolved before connecting.
    #[error("Unable to resolve credentials: {0}")]
    AuthResolution(String),

    /// The OS classifier could not identify the device.
    #[error("Unable to classify device '{device}': {detail}")]
    UnknownDevice { device: String, detail: String },

    /// No driver is registered for the canonical vendor tag.
    #[error("No driver registered for vendor '{vendor}'")]
    UnsupportedVendor { vendor: String },

    /// The session was severed (or timed out) while an operation was running.
    ///
    /// The session is dead once this is returned; reopen the driver to continue.
    #[error("Connection closed: {message}")]
    ConnectionClosed { message: String },

    /// Caller misuse, detected before any device I/O.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The device rejected one command of a batch.
    #[error("Unable to execute command \"{command}\"")]
    CommandRejected { command: String },

    /// The device rejected a replace candidate.
    #[error("Replace config failed: {0}")]
    ReplaceConfig(String),

    /// The device rejected a merge candidate.
    #[error("Merge config failed: {0}")]
    MergeConfig(String),

    /// The operation is not supported by this vendor dialect.
    #[error("{operation} is not implemented for platform '{platform}'")]
    NotImplemented {
        operation: &'static str,
        platform: String,
    },

    /// Transport-level errors while establishing a session.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Driver-level errors
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    /// Platform/vendor errors
    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),
}

impl Error {
    /// Re-signal a transport failure that happened mid-operation.
    pub(crate) fn connection_closed(err: TransportError) -> Self {
        Error::ConnectionClosed {
            message: err.to_string(),
        }
    }

    /// Whether this error came from the transport rather than the device or caller.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_) | Error::ConnectionClosed { .. })
    }
}

/// Transport layer errors (TCP, SSH, Telnet).
#[derive(Error, Debug)]
pub enum TransportError {
    /// Failed to connect to host
    #[error("Connection failed to {host}:{port}: {source}")]
    ConnectionFailed {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },

    /// SSH handshake or protocol error
    #[error("SSH error: {0}")]
    Ssh(#[from] russh::Error),

    /// Authentication failed
    #[error("Authentication failed for user '{user}'")]
    AuthenticationFailed { user: String },

    /// SSH key error
    #[error("SSH key error: {0}")]
    Key(String),

    /// The host key is not in known_hosts and verification is strict.
    #[error("Host key for {host}:{port} is unknown")]
    HostKeyUnknown { host: String, port: u16 },

    /// The host key differs from the one recorded in known_hosts.
    #[error("Host key for {host}:{port} changed (known_hosts line {line})")]
    HostKeyChanged { host: String, port: u16, line: usize },

    /// known_hosts could not be read or written.
    #[error("known_hosts error: {0}")]
    KnownHosts(String),

    /// Failed to open the PTY shell channel
    #[error("Failed to open shell channel: {0}")]
    ShellFailed(String),

    /// Connection was closed unexpectedly
    #[error("Connection disconnected")]
    Disconnected,

    /// Operation timed out
    #[error("Operation timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Driver layer errors (session state, CLI mode navigation).
#[derive(Error, Debug)]
pub enum DriverError {
    /// Driver not connected
    #[error("Driver not connected - call open() first")]
    NotConnected,

    /// Driver already connected
    #[error("Driver already connected")]
    AlreadyConnected,

    /// Failed to reach the target CLI mode
    #[error("Failed to acquire CLI mode '{target}'")]
    ModeAcquisitionFailed { target: String },

    /// Prompt did not match any mode of the platform
    #[error("Unknown CLI mode from prompt: '{prompt}'")]
    UnknownMode { prompt: String },

    /// No path found between CLI modes
    #[error("No path from mode '{from}' to '{to}'")]
    NoModePath { from: String, to: String },
}

/// Platform/vendor definition errors.
#[derive(Error, Debug)]
pub enum PlatformError {
    /// Invalid platform definition
    #[error("Invalid platform definition: {message}")]
    InvalidDefinition { message: String },

    /// A driver is already registered under this vendor tag
    #[error("Vendor already registered: {name}")]
    AlreadyRegistered { name: String },
}

/// Result type alias using netpilot's Error.
pub type Result<T> = std::result::Result<T, Error>;
