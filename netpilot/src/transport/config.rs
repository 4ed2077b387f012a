//! Transport connection configuration.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// Which wire protocol carries the CLI session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    Ssh,
    Telnet,
}

impl TransportKind {
    /// Well-known port for this transport.
    pub fn default_port(self) -> u16 {
        match self {
            TransportKind::Ssh => 22,
            TransportKind::Telnet => 23,
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportKind::Ssh => f.write_str("ssh"),
            TransportKind::Telnet => f.write_str("telnet"),
        }
    }
}

/// Host key verification mode, analogous to OpenSSH's `StrictHostKeyChecking`.
///
/// Ignored by the Telnet transport.
#[derive(Debug, Clone, Default)]
pub enum HostKeyVerification {
    /// Reject unknown and changed keys.
    Strict,

    /// Accept and auto-learn unknown keys, but reject changed keys.
    #[default]
    AcceptNew,

    /// Accept all keys without checking. For testing and lab use only.
    Disabled,
}

/// Connection configuration shared by every transport.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Target host (hostname or IP address).
    pub host: String,

    /// TCP port.
    pub port: u16,

    /// Protocol to speak.
    pub kind: TransportKind,

    /// Username for authentication.
    pub username: String,

    /// Authentication method.
    pub auth: AuthMethod,

    /// Connect and per-read timeout.
    pub timeout: Duration,

    /// Terminal width for the PTY.
    pub terminal_width: u32,

    /// Terminal height for the PTY.
    pub terminal_height: u32,

    /// Host key verification mode (SSH only).
    pub host_key_verification: HostKeyVerification,

    /// Path to known_hosts file (SSH only).
    pub known_hosts_path: Option<PathBuf>,
}

impl TransportConfig {
    /// Get the socket address for connection.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Authentication method.
#[derive(Debug, Clone)]
pub enum AuthMethod {
    /// No authentication (for testing only).
    None,

    /// Password authentication. Also answers `enable` prompts.
    Password(SecretString),

    /// Private key authentication (SSH only).
    PrivateKey {
        /// Path to the private key file.
        path: PathBuf,
        /// Optional passphrase for encrypted keys.
        passphrase: Option<SecretString>,
    },
}

impl AuthMethod {
    /// The password, if this method carries one.
    pub fn password(&self) -> Option<&SecretString> {
        match self {
            AuthMethod::Password(password) => Some(password),
            _ => None,
        }
    }
}
