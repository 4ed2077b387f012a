//! CLI mode tracking with graph-based navigation.

use std::collections::{HashMap, HashSet, VecDeque};

use indexmap::IndexMap;
use regex::bytes::Regex;

use crate::error::{DriverError, Result};
use crate::platform::CliMode;

/// Tracks the current CLI mode and plans moves between modes.
///
/// Modes form a bidirectional graph along parent links; moving between two
/// modes walks the shortest path, one enter/exit command per hop.
#[derive(Debug, Clone)]
pub struct ModeTracker {
    modes: IndexMap<String, CliMode>,
    graph: HashMap<String, HashSet<String>>,
    current: Option<String>,
}

impl ModeTracker {
    /// Create a tracker over the given modes; the current mode is unknown.
    pub fn new(modes: IndexMap<String, CliMode>) -> Self {
        let graph = Self::build_graph(&modes);
        Self {
            modes,
            graph,
            current: None,
        }
    }

    fn build_graph(modes: &IndexMap<String, CliMode>) -> HashMap<String, HashSet<String>> {
        let mut graph: HashMap<String, HashSet<String>> = HashMap::new();
        for (name, mode) in modes {
            graph.entry(name.clone()).or_default();
            if let Some(parent) = &mode.parent {
                graph.entry(name.clone()).or_default().insert(parent.clone());
                graph.entry(parent.clone()).or_default().insert(name.clone());
            }
        }
        graph
    }

    /// Determine the mode a prompt belongs to.
    pub fn determine_from_prompt(&self, prompt: &str) -> Result<&CliMode> {
        self.modes
            .values()
            .find(|mode| mode.matches(prompt))
            .ok_or_else(|| {
                DriverError::UnknownMode {
                    prompt: prompt.to_string(),
                }
                .into()
            })
    }

    /// Record the mode shown by `prompt`; returns its name.
    pub fn observe(&mut self, prompt: &str) -> Result<String> {
        let name = self.determine_from_prompt(prompt)?.name.clone();
        self.current = Some(name.clone());
        Ok(name)
    }

    /// Current mode name, if known.
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Forget the current mode (session closed).
    pub fn reset(&mut self) {
        self.current = None;
    }

    /// Shortest path between two modes, both ends included.
    pub fn find_path(&self, from: &str, to: &str) -> Result<Vec<String>> {
        if from == to {
            return Ok(vec![from.to_string()]);
        }

        let mut queue = VecDeque::from([from.to_string()]);
        let mut visited = HashSet::from([from.to_string()]);
        let mut came_from: HashMap<String, String> = HashMap::new();

        while let Some(node) = queue.pop_front() {
            if node == to {
                let mut path = vec![to.to_string()];
                let mut cursor = to;
                while let Some(prev) = came_from.get(cursor) {
                    path.push(prev.clone());
                    cursor = prev.as_str();
                }
                path.reverse();
                return Ok(path);
            }

            for next in self.graph.get(&node).into_iter().flatten() {
                if visited.insert(next.clone()) {
                    came_from.insert(next.clone(), node.clone());
                    queue.push_back(next.clone());
                }
            }
        }

        Err(DriverError::NoModePath {
            from: from.to_string(),
            to: to.to_string(),
        }
        .into())
    }

    /// The command moving from `from` to the adjacent mode `to`.
    pub fn transition(&self, from: &str, to: &str) -> Option<Transition> {
        let from_mode = self.modes.get(from)?;
        let to_mode = self.modes.get(to)?;

        if to_mode.parent.as_deref() == Some(from) {
            return Some(Transition {
                command: to_mode.enter_command.clone()?,
                auth_prompt: to_mode.auth_prompt.clone(),
            });
        }
        if from_mode.parent.as_deref() == Some(to) {
            return Some(Transition {
                command: from_mode.exit_command.clone()?,
                auth_prompt: None,
            });
        }
        None
    }
}

/// One hop between adjacent modes.
#[derive(Debug, Clone)]
pub struct Transition {
    /// Command to send.
    pub command: String,

    /// Password prompt expected after the command, if any.
    pub auth_prompt: Option<Regex>,
}
