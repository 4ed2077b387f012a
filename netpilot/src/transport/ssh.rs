//! SSH transport implementation using russh.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use log::{debug, warn};
use russh::client::{self, Handle, Msg};
use russh::keys::{PrivateKeyWithHashAlg, PublicKey, load_secret_key};
use russh::{Channel, ChannelMsg};
use secrecy::ExposeSecret;

use super::config::{AuthMethod, HostKeyVerification, TransportConfig, TransportKind};
use super::Transport;
use crate::error::TransportError;

/// SSH transport: one russh session with one interactive PTY shell channel.
pub struct SshTransport {
    /// The russh session handle.
    session: Handle<SshHandler>,

    /// The interactive shell channel.
    channel: Channel<Msg>,

    /// Configuration used for this connection.
    config: TransportConfig,
}

impl SshTransport {
    /// Connect, authenticate and open the shell channel.
    pub async fn connect(config: TransportConfig) -> Result<Self, TransportError> {
        let ssh_config = Arc::new(client::Config {
            inactivity_timeout: Some(config.timeout),
            ..Default::default()
        });

        let host_key_error: Arc<Mutex<Option<TransportError>>> = Arc::new(Mutex::new(None));

        let handler = SshHandler {
            host: config.host.clone(),
            port: config.port,
            host_key_verification: config.host_key_verification.clone(),
            known_hosts_path: config.known_hosts_path.clone(),
            host_key_error: host_key_error.clone(),
        };

        debug!("ssh: connecting to {}", config.socket_addr());

        let mut session = tokio::time::timeout(
            config.timeout,
            client::connect(ssh_config, (config.host.as_str(), config.port), handler),
        )
        .await
        .map_err(|_| TransportError::Timeout(config.timeout))?
        .map_err(|e| {
            // Prefer the detailed host-key error over russh's generic UnknownKey
            match host_key_error.lock().ok().and_then(|mut slot| slot.take()) {
                Some(hk_err) => hk_err,
                None => TransportError::Ssh(e),
            }
        })?;

        Self::authenticate(&mut session, &config).await?;

        let channel = Self::open_shell(&session, &config).await?;

        Ok(Self {
            session,
            channel,
            config,
        })
    }

    /// Open a PTY channel and start a shell on it.
    async fn open_shell(
        session: &Handle<SshHandler>,
        config: &TransportConfig,
    ) -> Result<Channel<Msg>, TransportError> {
        let channel = session
            .channel_open_session()
            .await
            .map_err(|e| TransportError::ShellFailed(e.to_string()))?;

        channel
            .request_pty(
                true,
                "vt100",
                config.terminal_width,
                config.terminal_height,
                0,
                0,
                &[],
            )
            .await
            .map_err(|e| TransportError::ShellFailed(e.to_string()))?;

        channel
            .request_shell(true)
            .await
            .map_err(|e| TransportError::ShellFailed(e.to_string()))?;

        Ok(channel)
    }

    /// Authenticate with the server.
    async fn authenticate(
        session: &mut Handle<SshHandler>,
        config: &TransportConfig,
    ) -> Result<(), TransportError> {
        let success = match &config.auth {
            AuthMethod::None => session
                .authenticate_none(&config.username)
                .await?
                .success(),
            AuthMethod::Password(password) => session
                .authenticate_password(&config.username, password.expose_secret())
                .await?
                .success(),
            AuthMethod::PrivateKey { path, passphrase } => {
                let key = load_secret_key(path, passphrase.as_ref().map(|p| p.expose_secret()))
                    .map_err(|e| TransportError::Key(e.to_string()))?;

                let hash_alg = session.best_supported_rsa_hash().await?.flatten();

                session
                    .authenticate_publickey(
                        &config.username,
                        PrivateKeyWithHashAlg::new(Arc::new(key), hash_alg),
                    )
                    .await?
                    .success()
            }
        };

        if !success {
            return Err(TransportError::AuthenticationFailed {
                user: config.username.clone(),
            });
        }

        Ok(())
    }
}

#[async_trait]
impl Transport for SshTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Ssh
    }

    async fn write(&mut self, data: &[u8]) -> Result<(), TransportError> {
        self.channel.data(data).await?;
        Ok(())
    }

    async fn read(&mut self) -> Result<Vec<u8>, TransportError> {
        loop {
            match self.channel.wait().await {
                Some(ChannelMsg::Data { data }) => return Ok(data.to_vec()),
                Some(ChannelMsg::ExtendedData { data, .. }) => return Ok(data.to_vec()),
                Some(ChannelMsg::Eof) | Some(ChannelMsg::Close) | None => {
                    return Err(TransportError::Disconnected);
                }
                Some(_) => continue,
            }
        }
    }

    async fn probe(&mut self) -> Result<bool, TransportError> {
        // A NUL byte keeps the session warm without producing output
        self.channel.data(&[0u8][..]).await?;
        Ok(!self.session.is_closed())
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        debug!("ssh: closing {}", self.config.socket_addr());
        let _ = self.channel.eof().await;
        self.session
            .disconnect(russh::Disconnect::ByApplication, "", "en")
            .await?;
        Ok(())
    }
}

/// SSH client handler for russh.
struct SshHandler {
    host: String,
    port: u16,
    host_key_verification: HostKeyVerification,
    known_hosts_path: Option<PathBuf>,
    /// Detailed host-key error surfaced by connect().
    host_key_error: Arc<Mutex<Option<TransportError>>>,
}

impl SshHandler {
    /// Check the host key against known_hosts.
    ///
    /// `Ok(true)` if matched, `Ok(false)` if the host is not recorded.
    fn check_known_hosts(&self, pubkey: &PublicKey) -> Result<bool, TransportError> {
        let result = match self.known_hosts_path {
            Some(ref path) => russh::keys::check_known_hosts_path(&self.host, self.port, pubkey, path),
            None => russh::keys::check_known_hosts(&self.host, self.port, pubkey),
        };

        match result {
            Ok(matched) => Ok(matched),
            Err(russh::keys::Error::KeyChanged { line }) => Err(TransportError::HostKeyChanged {
                host: self.host.clone(),
                port: self.port,
                line,
            }),
            Err(e) => Err(TransportError::KnownHosts(e.to_string())),
        }
    }

    /// Save a new host key to known_hosts.
    fn learn_host_key(&self, pubkey: &PublicKey) -> Result<(), TransportError> {
        let result = match self.known_hosts_path {
            Some(ref path) => {
                russh::keys::known_hosts::learn_known_hosts_path(&self.host, self.port, pubkey, path)
            }
            None => russh::keys::known_hosts::learn_known_hosts(&self.host, self.port, pubkey),
        };

        result.map_err(|e| TransportError::KnownHosts(e.to_string()))
    }

    fn reject(&self, err: TransportError) -> bool {
        if let Ok(mut slot) = self.host_key_error.lock() {
            *slot = Some(err);
        }
        false
    }
}

impl client::Handler for SshHandler {
    type Error = russh::Error;

    async fn check_server_key(&mut self, server_public_key: &PublicKey) -> Result<bool, Self::Error> {
        match self.host_key_verification {
            HostKeyVerification::Disabled => Ok(true),

            HostKeyVerification::AcceptNew => match self.check_known_hosts(server_public_key) {
                Ok(true) => Ok(true),
                Ok(false) => {
                    if let Err(e) = self.learn_host_key(server_public_key) {
                        warn!("Failed to save host key: {}", e);
                    }
                    Ok(true)
                }
                Err(e) => Ok(self.reject(e)),
            },

            HostKeyVerification::Strict => match self.check_known_hosts(server_public_key) {
                Ok(true) => Ok(true),
                Ok(false) => Ok(self.reject(TransportError::HostKeyUnknown {
                    host: self.host.clone(),
                    port: self.port,
                })),
                Err(e) => Ok(self.reject(e)),
            },
        }
    }
}
