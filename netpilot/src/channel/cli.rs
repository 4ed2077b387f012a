//! Prompt-aware command channel over a [`Transport`].

use std::time::Duration;

use log::trace;
use regex::bytes::Regex;
use tokio::time::Instant;

use super::buffer::PatternBuffer;
use super::patterns::{split_prompt, strip_echo, unify_newlines};
use crate::error::TransportError;
use crate::transport::{Transport, TransportKind};

/// One command/response round trip.
#[derive(Debug, Clone, Default)]
pub struct Exchange {
    /// Everything the device sent, including echo and prompt.
    pub raw: String,

    /// Output with echo and trailing prompt removed, LF line endings.
    pub output: String,

    /// The prompt the device returned to.
    pub prompt: String,
}

/// Interactive shell channel: writes lines and reads until a prompt.
pub struct CliChannel {
    transport: Box<dyn Transport>,
    buffer: PatternBuffer,
    timeout: Duration,
}

impl CliChannel {
    /// Wrap a connected transport.
    pub fn new(transport: Box<dyn Transport>, timeout: Duration, search_depth: usize) -> Self {
        Self {
            transport,
            buffer: PatternBuffer::new(search_depth),
            timeout,
        }
    }

    /// Transport kind underneath.
    pub fn kind(&self) -> TransportKind {
        self.transport.kind()
    }

    /// Read until `pattern` matches at the end of the output.
    pub async fn read_until(&mut self, pattern: &Regex) -> Result<String, TransportError> {
        let deadline = Instant::now() + self.timeout;
        loop {
            if self.buffer.find_trailing(pattern).is_some() {
                let data = self.buffer.take();
                return Ok(String::from_utf8_lossy(&data).into_owned());
            }
            let chunk = tokio::time::timeout_at(deadline, self.transport.read())
                .await
                .map_err(|_| TransportError::Timeout(self.timeout))??;
            trace!("channel: read {} bytes", chunk.len());
            self.buffer.extend(&chunk);
        }
    }

    /// Read the prompt the device shows without sending anything.
    pub async fn read_prompt(&mut self, prompt: &Regex) -> Result<Exchange, TransportError> {
        let raw = self.read_until(prompt).await?;
        let (body, found) = split_prompt(&raw, prompt);
        Ok(Exchange {
            output: unify_newlines(body),
            prompt: found.to_string(),
            raw,
        })
    }

    /// Send `input` followed by a newline and read until `pattern`.
    pub async fn send_until(&mut self, input: &str, pattern: &Regex) -> Result<String, TransportError> {
        self.buffer.clear();
        let mut line = String::with_capacity(input.len() + 1);
        line.push_str(input);
        line.push('\n');
        self.transport.write(line.as_bytes()).await?;
        self.read_until(pattern).await
    }

    /// Send a command and wait for the prompt.
    pub async fn send_command(&mut self, command: &str, prompt: &Regex) -> Result<Exchange, TransportError> {
        let raw = self.send_until(command, prompt).await?;
        let (body, found) = split_prompt(&raw, prompt);
        let output = unify_newlines(strip_echo(body, command));
        Ok(Exchange {
            output,
            prompt: found.to_string(),
            raw,
        })
    }

    /// Transport-level liveness probe.
    pub async fn probe(&mut self) -> Result<bool, TransportError> {
        self.transport.probe().await
    }

    /// Close the transport.
    pub async fn close(mut self) -> Result<(), TransportError> {
        self.transport.close().await
    }
}
