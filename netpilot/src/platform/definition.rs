//! Platform definition for vendor-specific configurations.

use indexmap::IndexMap;
use regex::bytes::Regex;

use super::mode::CliMode;
use crate::channel::combine_patterns;
use crate::error::PlatformError;

/// Platform definition containing all vendor-specific CLI configuration.
#[derive(Debug, Clone)]
pub struct PlatformDefinition {
    /// Platform name (e.g., "sros", "ios").
    pub name: String,

    /// CLI modes for this platform.
    pub modes: IndexMap<String, CliMode>,

    /// Mode the session settles in after connecting.
    pub default_mode: String,

    /// Mode `config_commands` runs in.
    pub config_mode: String,

    /// Output substrings that mark a command as rejected by the device.
    pub invalid_markers: Vec<String>,

    /// Line patterns the output normalizer removes.
    pub noise_patterns: Vec<String>,

    /// Commands to run when the session is established.
    pub on_open_commands: Vec<String>,

    /// Terminal width for the PTY.
    pub terminal_width: u32,

    /// Terminal height for the PTY.
    pub terminal_height: u32,

    /// How many trailing bytes are searched for a prompt.
    pub search_depth: usize,
}

impl PlatformDefinition {
    /// Create a new platform definition with minimal required fields.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            modes: IndexMap::new(),
            default_mode: String::new(),
            config_mode: String::new(),
            invalid_markers: vec![],
            noise_patterns: vec![],
            on_open_commands: vec![],
            terminal_width: 511,
            terminal_height: 24,
            search_depth: 1000,
        }
    }

    /// Add a CLI mode.
    pub fn with_mode(mut self, mode: CliMode) -> Self {
        self.modes.insert(mode.name.clone(), mode);
        self
    }

    /// Set the default mode.
    pub fn with_default_mode(mut self, name: impl Into<String>) -> Self {
        self.default_mode = name.into();
        self
    }

    /// Set the configuration mode.
    pub fn with_config_mode(mut self, name: impl Into<String>) -> Self {
        self.config_mode = name.into();
        self
    }

    /// Add an invalid-command marker.
    pub fn with_invalid_marker(mut self, marker: impl Into<String>) -> Self {
        self.invalid_markers.push(marker.into());
        self
    }

    /// Add a noise line pattern.
    pub fn with_noise_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.noise_patterns.push(pattern.into());
        self
    }

    /// Add an on_open command.
    pub fn with_on_open_command(mut self, command: impl Into<String>) -> Self {
        self.on_open_commands.push(command.into());
        self
    }

    /// Set terminal dimensions.
    pub fn with_terminal_size(mut self, width: u32, height: u32) -> Self {
        self.terminal_width = width;
        self.terminal_height = height;
        self
    }

    /// Get a mode by name.
    pub fn mode(&self, name: &str) -> Option<&CliMode> {
        self.modes.get(name)
    }

    /// The first invalid-command marker found in `output`.
    pub fn invalid_marker(&self, output: &str) -> Option<&str> {
        self.invalid_markers
            .iter()
            .find(|marker| output.contains(marker.as_str()))
            .map(String::as_str)
    }

    /// Whether `output` carries any invalid-command marker.
    pub fn is_invalid(&self, output: &str) -> bool {
        self.invalid_marker(output).is_some()
    }

    /// One pattern matching the prompt of every mode.
    pub fn prompt_pattern(&self) -> Result<Regex, PlatformError> {
        combine_patterns(self.modes.values().map(|m| &m.pattern)).map_err(|e| {
            PlatformError::InvalidDefinition {
                message: format!("{}: {e}", self.name),
            }
        })
    }

    /// Check that every mode reference points at a defined mode.
    pub fn validate(&self) -> Result<(), PlatformError> {
        let invalid = |message: String| PlatformError::InvalidDefinition {
            message: format!("{}: {message}", self.name),
        };

        if self.modes.is_empty() {
            return Err(invalid("no CLI modes defined".to_string()));
        }
        for name in [&self.default_mode, &self.config_mode] {
            if !self.modes.contains_key(name) {
                return Err(invalid(format!("mode '{name}' is not defined")));
            }
        }
        for mode in self.modes.values() {
            if let Some(parent) = mode.parent.as_ref().filter(|p| !self.modes.contains_key(*p)) {
                return Err(invalid(format!(
                    "mode '{}' has unknown parent '{parent}'",
                    mode.name
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PlatformDefinition {
        PlatformDefinition::new("sample")
            .with_mode(CliMode::new("exec", r"(?m)^\w+>\s?$").unwrap())
            .with_mode(
                CliMode::new("configuration", r"(?m)^\w+\(config\)#\s?$")
                    .unwrap()
                    .with_parent("exec")
                    .with_enter("configure")
                    .with_exit("end"),
            )
            .with_default_mode("exec")
            .with_config_mode("configuration")
            .with_invalid_marker("% Invalid")
    }

    #[test]
    fn test_valid_definition() {
        let platform = sample();
        assert!(platform.validate().is_ok());
        assert_eq!(platform.modes.len(), 2);
        assert!(platform.mode("exec").is_some());
    }

    #[test]
    fn test_unknown_mode_reference() {
        let platform = sample().with_config_mode("missing");
        assert!(platform.validate().is_err());

        let platform = sample().with_mode(
            CliMode::new("orphan", r"x").unwrap().with_parent("nowhere"),
        );
        assert!(platform.validate().is_err());
    }

    #[test]
    fn test_invalid_marker() {
        let platform = sample();
        assert_eq!(
            platform.invalid_marker("       ^\n% Invalid input detected"),
            Some("% Invalid")
        );
        assert!(!platform.is_invalid("Cisco IOS Software"));
    }

    #[test]
    fn test_prompt_pattern() {
        let pattern = sample().prompt_pattern().unwrap();
        assert!(pattern.is_match(b"r1>"));
        assert!(pattern.is_match(b"r1(config)#"));
        assert!(!pattern.is_match(b"r1#"));
    }
}
