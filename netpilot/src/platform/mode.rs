//! CLI mode definition.

use regex::bytes::Regex;

/// A CLI mode of a network device (exec, privileged exec, configuration...).
///
/// Modes form a tree: each mode names its parent and the commands that
/// enter it from the parent and leave it back to the parent.
#[derive(Debug, Clone)]
pub struct CliMode {
    /// Name of this mode (e.g. "exec", "privilege_exec", "configuration").
    pub name: String,

    /// Regex matching the prompt shown in this mode.
    pub pattern: Regex,

    /// Parent mode (None for the root).
    pub parent: Option<String>,

    /// Command that enters this mode from the parent.
    pub enter_command: Option<String>,

    /// Command that leaves this mode to the parent.
    pub exit_command: Option<String>,

    /// Password prompt shown while entering this mode, if any.
    pub auth_prompt: Option<Regex>,

    /// Substrings that must NOT be in the prompt for this mode to match.
    pub not_contains: Vec<String>,
}

impl CliMode {
    /// Create a root mode matching `pattern`.
    pub fn new(name: impl Into<String>, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            name: name.into(),
            pattern: Regex::new(pattern)?,
            parent: None,
            enter_command: None,
            exit_command: None,
            auth_prompt: None,
            not_contains: vec![],
        })
    }

    /// Set the parent mode.
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Set the command entering this mode.
    pub fn with_enter(mut self, command: impl Into<String>) -> Self {
        self.enter_command = Some(command.into());
        self
    }

    /// Set the command leaving this mode.
    pub fn with_exit(mut self, command: impl Into<String>) -> Self {
        self.exit_command = Some(command.into());
        self
    }

    /// Entering this mode asks for a password matching `prompt_pattern`.
    pub fn with_auth(mut self, prompt_pattern: &str) -> Result<Self, regex::Error> {
        self.auth_prompt = Some(Regex::new(prompt_pattern)?);
        Ok(self)
    }

    /// Add a not_contains substring.
    pub fn with_not_contains(mut self, needle: impl Into<String>) -> Self {
        self.not_contains.push(needle.into());
        self
    }

    /// Check whether `prompt` belongs to this mode.
    pub fn matches(&self, prompt: &str) -> bool {
        if self.not_contains.iter().any(|nc| prompt.contains(nc.as_str())) {
            return false;
        }
        self.pattern.is_match(prompt.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_with_not_contains() {
        let mode = CliMode::new("privilege_exec", r"(?m)^[\w.\-]+#\s?$")
            .unwrap()
            .with_not_contains("(config");
        assert!(mode.matches("router#"));
        assert!(!mode.matches("router(config)#"));
        assert!(!mode.matches("router>"));
    }

    #[test]
    fn test_builder() {
        let mode = CliMode::new("configuration", r"\(config\)#$")
            .unwrap()
            .with_parent("privilege_exec")
            .with_enter("configure terminal")
            .with_exit("end");
        assert_eq!(mode.parent.as_deref(), Some("privilege_exec"));
        assert_eq!(mode.enter_command.as_deref(), Some("configure terminal"));
        assert_eq!(mode.exit_command.as_deref(), Some("end"));
        assert!(mode.auth_prompt.is_none());
    }
}
