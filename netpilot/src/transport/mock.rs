//! Scripted in-memory transport for driver tests.

use std::collections::{HashMap, VecDeque};
use std::io;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{Connector, Transport, TransportConfig, TransportKind};
use crate::error::TransportError;

/// What a simulated device does with one line of input.
pub(crate) enum Reply {
    /// Print this output, then the (possibly changed) prompt.
    Output(String),
    /// Drop the connection.
    Hangup,
}

/// A simulated device shell.
pub(crate) trait MockDevice: Send {
    fn prompt(&self) -> String;
    fn handle(&mut self, input: &str) -> Reply;
}

/// Device answering from fixed tables.
#[derive(Default)]
pub(crate) struct ScriptedDevice {
    prompt: String,
    responses: HashMap<String, String>,
    transitions: HashMap<String, String>,
    hangup_on: Option<String>,
}

impl ScriptedDevice {
    pub(crate) fn new(prompt: &str) -> Self {
        Self {
            prompt: prompt.to_string(),
            ..Default::default()
        }
    }

    pub(crate) fn respond(mut self, command: &str, output: &str) -> Self {
        self.responses.insert(command.to_string(), output.to_string());
        self
    }

    /// Switch to `prompt` after `command`.
    pub(crate) fn transition(mut self, command: &str, prompt: &str) -> Self {
        self.transitions.insert(command.to_string(), prompt.to_string());
        self
    }

    pub(crate) fn hangup_on(mut self, command: &str) -> Self {
        self.hangup_on = Some(command.to_string());
        self
    }
}

impl MockDevice for ScriptedDevice {
    fn prompt(&self) -> String {
        self.prompt.clone()
    }

    fn handle(&mut self, input: &str) -> Reply {
        if self.hangup_on.as_deref() == Some(input) {
            return Reply::Hangup;
        }
        if let Some(prompt) = self.transitions.get(input) {
            self.prompt = prompt.clone();
        }
        Reply::Output(self.responses.get(input).cloned().unwrap_or_default())
    }
}

#[derive(Default)]
pub(crate) struct MockLog {
    pub(crate) connects: Vec<TransportKind>,
    pub(crate) writes: Vec<String>,
    pub(crate) probes: usize,
    pub(crate) closes: usize,
}

/// Connector handing out transports wired to one shared device.
#[derive(Clone)]
pub(crate) struct MockConnector {
    device: Arc<Mutex<Box<dyn MockDevice>>>,
    log: Arc<Mutex<MockLog>>,
    refuse: Vec<TransportKind>,
}

impl MockConnector {
    pub(crate) fn new(device: impl MockDevice + 'static) -> Self {
        Self {
            device: Arc::new(Mutex::new(Box::new(device))),
            log: Arc::new(Mutex::new(MockLog::default())),
            refuse: Vec::new(),
        }
    }

    /// Refuse connections over `kind`.
    pub(crate) fn refuse(mut self, kind: TransportKind) -> Self {
        self.refuse.push(kind);
        self
    }

    pub(crate) fn writes(&self) -> Vec<String> {
        self.log.lock().unwrap().writes.clone()
    }

    pub(crate) fn connects(&self) -> Vec<TransportKind> {
        self.log.lock().unwrap().connects.clone()
    }

    pub(crate) fn probes(&self) -> usize {
        self.log.lock().unwrap().probes
    }

    pub(crate) fn closes(&self) -> usize {
        self.log.lock().unwrap().closes
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(&self, config: &TransportConfig) -> Result<Box<dyn Transport>, TransportError> {
        self.log.lock().unwrap().connects.push(config.kind);

        if self.refuse.contains(&config.kind) {
            return Err(TransportError::ConnectionFailed {
                host: config.host.clone(),
                port: config.port,
                source: io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused"),
            });
        }

        let prompt = self.device.lock().unwrap().prompt();
        Ok(Box::new(MockTransport {
            kind: config.kind,
            device: self.device.clone(),
            log: self.log.clone(),
            pending: VecDeque::from([format!("\r\n{prompt}").into_bytes()]),
            hung_up: false,
        }))
    }
}

struct MockTransport {
    kind: TransportKind,
    device: Arc<Mutex<Box<dyn MockDevice>>>,
    log: Arc<Mutex<MockLog>>,
    pending: VecDeque<Vec<u8>>,
    hung_up: bool,
}

#[async_trait]
impl Transport for MockTransport {
    fn kind(&self) -> TransportKind {
        self.kind
    }

    async fn write(&mut self, data: &[u8]) -> Result<(), TransportError> {
        if self.hung_up {
            return Err(TransportError::Disconnected);
        }

        let input = String::from_utf8_lossy(data).trim_end_matches('\n').to_string();
        self.log.lock().unwrap().writes.push(input.clone());

        let mut device = self.device.lock().unwrap();
        match device.handle(&input) {
            Reply::Output(output) => {
                let mut echo = format!("{input}\r\n");
                if !output.is_empty() {
                    echo.push_str(&output.replace('\n', "\r\n"));
                    echo.push_str("\r\n");
                }
                echo.push_str(&device.prompt());
                self.pending.push_back(echo.into_bytes());
            }
            Reply::Hangup => self.hung_up = true,
        }
        Ok(())
    }

    async fn read(&mut self) -> Result<Vec<u8>, TransportError> {
        self.pending.pop_front().ok_or(TransportError::Disconnected)
    }

    async fn probe(&mut self) -> Result<bool, TransportError> {
        self.log.lock().unwrap().probes += 1;
        if self.hung_up {
            return Err(TransportError::Disconnected);
        }
        Ok(true)
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.log.lock().unwrap().closes += 1;
        Ok(())
    }
}
