//! Telnet transport over a tokio stream.
//!
//! Every option the server offers is refused (`DO` -> `WONT`, `WILL` ->
//! `DONT`), which leaves the session in plain NVT mode with remote echo.
//! Login is a username/password prompt exchange.

use std::sync::LazyLock;

use async_trait::async_trait;
use log::{debug, trace};
use regex::bytes::Regex;
use secrecy::ExposeSecret;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::Instant;

use super::config::{TransportConfig, TransportKind};
use super::Transport;
use crate::error::TransportError;

pub(crate) const IAC: u8 = 255;
pub(crate) const DONT: u8 = 254;
pub(crate) const DO: u8 = 253;
pub(crate) const WONT: u8 = 252;
pub(crate) const WILL: u8 = 251;
pub(crate) const SB: u8 = 250;
pub(crate) const NOP: u8 = 241;
pub(crate) const SE: u8 = 240;

static USERNAME_PROMPT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(user ?name|login)\s*:\s*$").expect("valid username regex"));
static PASSWORD_PROMPT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)password\s*:\s*$").expect("valid password regex"));
static SHELL_PROMPT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[>#$%]\s*$").expect("valid shell regex"));
static LOGIN_FAILED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(login invalid|login incorrect|authentication failed|access denied)")
        .expect("valid login failure regex")
});

/// Telnet transport.
pub struct TelnetTransport<S = TcpStream> {
    stream: S,
    parser: IacParser,
    /// Shell output consumed during login, handed out by the next read.
    pending: Vec<u8>,
    buf: Vec<u8>,
}

impl TelnetTransport<TcpStream> {
    /// Connect over TCP and log in.
    pub async fn connect(config: &TransportConfig) -> Result<Self, TransportError> {
        debug!("telnet: connecting to {}", config.socket_addr());

        let stream = tokio::time::timeout(
            config.timeout,
            TcpStream::connect((config.host.as_str(), config.port)),
        )
        .await
        .map_err(|_| TransportError::Timeout(config.timeout))?
        .map_err(|source| TransportError::ConnectionFailed {
            host: config.host.clone(),
            port: config.port,
            source,
        })?;

        let mut transport = Self::from_stream(stream);
        transport.login(config).await?;
        Ok(transport)
    }
}

impl<S> TelnetTransport<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Wrap an already connected stream.
    pub fn from_stream(stream: S) -> Self {
        Self {
            stream,
            parser: IacParser::default(),
            pending: Vec::new(),
            buf: vec![0; 4096],
        }
    }

    /// Answer the username/password prompts.
    ///
    /// Devices that drop straight into a shell are accepted as-is.
    pub(crate) async fn login(&mut self, config: &TransportConfig) -> Result<(), TransportError> {
        let deadline = Instant::now() + config.timeout;
        let mut seen = Vec::new();
        let mut password_sent = false;

        loop {
            let chunk = tokio::time::timeout_at(deadline, self.read())
                .await
                .map_err(|_| TransportError::Timeout(config.timeout))??;
            seen.extend_from_slice(&chunk);

            let failed = || TransportError::AuthenticationFailed {
                user: config.username.clone(),
            };

            if password_sent && LOGIN_FAILED.is_match(&seen) {
                return Err(failed());
            }

            if USERNAME_PROMPT.is_match(&seen) {
                if password_sent {
                    return Err(failed());
                }
                trace!("telnet: username prompt");
                self.send_line(config.username.as_bytes()).await?;
                seen.clear();
            } else if PASSWORD_PROMPT.is_match(&seen) {
                if password_sent {
                    return Err(failed());
                }
                trace!("telnet: password prompt");
                let password = config
                    .auth
                    .password()
                    .map(|p| p.expose_secret().as_bytes().to_vec())
                    .unwrap_or_default();
                self.send_line(&password).await?;
                password_sent = true;
                seen.clear();
            } else if SHELL_PROMPT.is_match(&seen) {
                self.pending = seen;
                return Ok(());
            }
        }
    }

    async fn send_line(&mut self, line: &[u8]) -> Result<(), TransportError> {
        let mut data = Vec::with_capacity(line.len() + 2);
        data.extend_from_slice(line);
        data.extend_from_slice(b"\r\n");
        self.write(&data).await
    }
}

#[async_trait]
impl<S> Transport for TelnetTransport<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    fn kind(&self) -> TransportKind {
        TransportKind::Telnet
    }

    async fn write(&mut self, data: &[u8]) -> Result<(), TransportError> {
        let mut escaped = Vec::with_capacity(data.len());
        for &byte in data {
            if byte == IAC {
                escaped.push(IAC);
            }
            escaped.push(byte);
        }
        self.stream.write_all(&escaped).await?;
        self.stream.flush().await?;
        Ok(())
    }

    async fn read(&mut self) -> Result<Vec<u8>, TransportError> {
        if !self.pending.is_empty() {
            return Ok(std::mem::take(&mut self.pending));
        }

        loop {
            let n = self.stream.read(&mut self.buf).await?;
            if n == 0 {
                return Err(TransportError::Disconnected);
            }

            let mut data = Vec::with_capacity(n);
            let mut replies = Vec::new();
            self.parser.feed(&self.buf[..n], &mut data, &mut replies);

            if !replies.is_empty() {
                trace!("telnet: refusing {} option bytes", replies.len());
                self.stream.write_all(&replies).await?;
                self.stream.flush().await?;
            }
            if !data.is_empty() {
                return Ok(data);
            }
        }
    }

    async fn probe(&mut self) -> Result<bool, TransportError> {
        self.stream.write_all(&[IAC, NOP]).await?;
        self.stream.flush().await?;
        Ok(true)
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.stream.shutdown().await?;
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
enum IacState {
    #[default]
    Data,
    Iac,
    Option(u8),
    Sub,
    SubIac,
}

/// Incremental Telnet command stripper. State survives across reads.
#[derive(Debug, Default)]
struct IacParser {
    state: IacState,
}

impl IacParser {
    /// Split `input` into shell data and the negotiation replies it requires.
    fn feed(&mut self, input: &[u8], data: &mut Vec<u8>, replies: &mut Vec<u8>) {
        for &byte in input {
            self.state = match self.state {
                IacState::Data if byte == IAC => IacState::Iac,
                IacState::Data => {
                    data.push(byte);
                    IacState::Data
                }
                IacState::Iac => match byte {
                    IAC => {
                        data.push(IAC);
                        IacState::Data
                    }
                    DO | DONT | WILL | WONT => IacState::Option(byte),
                    SB => IacState::Sub,
                    _ => IacState::Data,
                },
                IacState::Option(command) => {
                    match command {
                        DO => replies.extend_from_slice(&[IAC, WONT, byte]),
                        WILL => replies.extend_from_slice(&[IAC, DONT, byte]),
                        _ => {}
                    }
                    IacState::Data
                }
                IacState::Sub if byte == IAC => IacState::SubIac,
                IacState::Sub => IacState::Sub,
                IacState::SubIac if byte == SE => IacState::Data,
                IacState::SubIac => IacState::Sub,
            };
        }
    }
}
