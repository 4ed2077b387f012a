//! Cisco IOS candidate configuration handling.
//!
//! IOS has no candidate datastore, so candidates are staged as files on the
//! device filesystem and applied with the config archive feature:
//!
//! - load: the text is written through `tclsh` (`puts [open ...]`)
//! - compare: `show archive config differences` / `incremental-diffs`
//! - commit: running config is copied to the rollback file, then
//!   `configure replace` (replace) or `copy <file> running-config` (merge)
//! - rollback: `configure replace <rollback file> force`
//!
//! Commit and rollback save the result to startup with `write memory`.

use log::{debug, warn};

use super::platform::{PRIVILEGE_EXEC, TCL};
use crate::driver::{CliSession, Command, ConfigDialect, LoadMode};
use crate::error::Result;

/// Replace candidate file name.
pub const CANDIDATE_FILE: &str = "candidate_config.txt";

/// Merge candidate file name.
pub const MERGE_FILE: &str = "merge_config.txt";

/// Snapshot of the running config taken before each commit.
pub const ROLLBACK_FILE: &str = "rollback_config.txt";

const TCL_ERRORS: &[&str] = &[
    "invalid command name",
    "couldn't open",
    "missing close-brace",
    "extra characters after close-brace",
];

const REPLACE_FAILURES: &[&str] = &[
    "original configuration has been successfully restored",
    "error",
    "not a valid config file",
    "failed",
];

const DIFF_NOISE: &[&str] = &[
    "Contextual Config Diffs",
    "List of Commands",
    "ntp clock-period",
    "file prompt quiet",
];

/// IOS configuration dialect.
#[derive(Debug, Clone)]
pub struct IosDialect {
    filesystem: String,
}

impl Default for IosDialect {
    fn default() -> Self {
        Self::new("flash:")
    }
}

impl IosDialect {
    /// Stage candidates on `filesystem` (e.g. "flash:", "bootflash:").
    pub fn new(filesystem: impl Into<String>) -> Self {
        Self {
            filesystem: filesystem.into(),
        }
    }

    /// Full device path of `file`.
    pub fn path(&self, file: &str) -> String {
        format!("{}{file}", self.filesystem)
    }

    fn staged_file(mode: LoadMode) -> &'static str {
        match mode {
            LoadMode::Replace => CANDIDATE_FILE,
            LoadMode::Merge => MERGE_FILE,
        }
    }

    /// Run a privileged exec command and return its normalized output.
    async fn run(&self, session: &mut CliSession, command: &str) -> Result<String> {
        session.acquire_mode(PRIVILEGE_EXEC).await?;
        let exchange = session.send_command(command).await?;
        Ok(session.normalize(&exchange.output))
    }

    async fn set_file_prompts_quiet(&self, session: &mut CliSession, quiet: bool) -> Result<()> {
        let line = if quiet {
            "file prompt quiet"
        } else {
            "no file prompt quiet"
        };
        session.config_commands(&Command::from([line])).await?;
        Ok(())
    }

    /// Undo the quiet setting after `result`; a restore failure only
    /// surfaces when `result` succeeded.
    async fn restore_file_prompts<T>(&self, session: &mut CliSession, result: Result<T>) -> Result<T> {
        if !session.is_open() {
            return result;
        }
        let restored = self.set_file_prompts_quiet(session, false).await;
        match (result, restored) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(err)) => Err(err),
            (Err(err), _) => Err(err),
        }
    }

    async fn apply(&self, session: &mut CliSession, mode: LoadMode) -> Result<()> {
        // A stale snapshot would make rollback restore the wrong config.
        let snapshot = format!("copy running-config {}", self.path(ROLLBACK_FILE));
        let saved = self.run(session, &snapshot).await?;
        if copy_failed(&saved) {
            return Err(mode.rejected(format!(
                "could not save rollback snapshot; nothing applied\n{saved}"
            )));
        }

        match mode {
            LoadMode::Replace => {
                let command = format!(
                    "configure replace {} force revert trigger error",
                    self.path(CANDIDATE_FILE)
                );
                let output = self.run(session, &command).await?;
                if replace_failed(&output) {
                    return Err(mode.rejected(format!(
                        "candidate config could not be applied\n{output}"
                    )));
                }
            }
            LoadMode::Merge => {
                let command = format!("copy {} running-config", self.path(MERGE_FILE));
                let output = self.run(session, &command).await?;
                if output.contains("Invalid input detected") {
                    if let Err(err) = self.restore_rollback(session).await {
                        warn!("automatic rollback after failed merge failed: {err}");
                    }
                    return Err(mode.rejected(format!(
                        "configuration merge failed; automatic rollback attempted\n{output}"
                    )));
                }
            }
        }

        self.run(session, "write memory").await?;
        Ok(())
    }

    async fn restore_rollback(&self, session: &mut CliSession) -> Result<String> {
        let command = format!("configure replace {} force", self.path(ROLLBACK_FILE));
        self.run(session, &command).await
    }
}

impl ConfigDialect for IosDialect {
    async fn load(&self, session: &mut CliSession, mode: LoadMode, text: &str) -> Result<()> {
        if text.contains(['{', '}']) {
            return Err(mode.rejected("candidate text may not contain braces"));
        }

        let path = self.path(Self::staged_file(mode));
        session.acquire_mode(TCL).await?;
        let transfer = format!("puts [open \"{path}\" w+] {{\n{}\n}}", text.trim_end());
        let exchange = session.send_command(&transfer).await?;
        session.acquire_mode(PRIVILEGE_EXEC).await?;

        if TCL_ERRORS.iter().any(|e| exchange.output.contains(e)) {
            return Err(mode.rejected(format!(
                "writing {path} failed: {}",
                exchange.output.trim()
            )));
        }
        debug!("staged {} bytes at {path}", text.len());
        Ok(())
    }

    async fn compare(&self, session: &mut CliSession, mode: LoadMode) -> Result<String> {
        let command = match mode {
            LoadMode::Replace => format!(
                "show archive config differences system:running-config {}",
                self.path(CANDIDATE_FILE)
            ),
            LoadMode::Merge => format!(
                "show archive config incremental-diffs {} ignorecase",
                self.path(MERGE_FILE)
            ),
        };
        let diff = self.run(session, &command).await?;
        Ok(clean_diff(&diff, mode))
    }

    async fn commit(&self, session: &mut CliSession, mode: LoadMode, _message: &str) -> Result<()> {
        self.set_file_prompts_quiet(session, true).await?;
        let result = self.apply(session, mode).await;
        self.restore_file_prompts(session, result).await
    }

    async fn discard(&self, session: &mut CliSession, mode: LoadMode) -> Result<()> {
        match mode {
            LoadMode::Replace => {
                self.set_file_prompts_quiet(session, true).await?;
                let command = format!("copy running-config {}", self.path(CANDIDATE_FILE));
                let result = self.run(session, &command).await.map(|_| ());
                self.restore_file_prompts(session, result).await
            }
            LoadMode::Merge => {
                let command = format!("delete /force {}", self.path(MERGE_FILE));
                self.run(session, &command).await?;
                Ok(())
            }
        }
    }

    async fn rollback(&self, session: &mut CliSession) -> Result<()> {
        let output = self.restore_rollback(session).await?;
        if replace_failed(&output) {
            return Err(LoadMode::Replace.rejected(format!("rollback failed\n{output}")));
        }
        self.run(session, "write memory").await?;
        Ok(())
    }
}

fn replace_failed(output: &str) -> bool {
    let lower = output.to_lowercase();
    REPLACE_FAILURES.iter().any(|m| lower.contains(m))
        || output.contains("%Please turn config archive on")
}

fn copy_failed(output: &str) -> bool {
    output.contains("%Error") || output.contains("% Invalid") || output.contains("%Invalid")
}

/// Strip archive headers; merge diffs are shown as additions.
fn clean_diff(diff: &str, mode: LoadMode) -> String {
    if diff.contains("No changes were found") {
        return String::new();
    }
    diff.lines()
        .map(str::trim_end)
        .filter(|line| {
            let trimmed = line.trim_start();
            !trimmed.is_empty()
                && !trimmed.starts_with('!')
                && !DIFF_NOISE.iter().any(|noise| line.contains(noise))
        })
        .map(|line| match mode {
            LoadMode::Replace => line.to_string(),
            LoadMode::Merge => format!("+{line}"),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths() {
        assert_eq!(IosDialect::default().path(CANDIDATE_FILE), "flash:candidate_config.txt");
        assert_eq!(
            IosDialect::new("bootflash:").path(ROLLBACK_FILE),
            "bootflash:rollback_config.txt"
        );
    }

    #[test]
    fn test_clean_replace_diff() {
        let diff = "!Contextual Config Diffs:\n+hostname r2\n-hostname r1\n";
        assert_eq!(clean_diff(diff, LoadMode::Replace), "+hostname r2\n-hostname r1");
        assert_eq!(
            clean_diff("!Contextual Config Diffs:\nNo changes were found", LoadMode::Replace),
            ""
        );
    }

    #[test]
    fn test_clean_merge_diff() {
        let diff = "!List of Commands:\nntp server 10.0.0.9\n";
        assert_eq!(clean_diff(diff, LoadMode::Merge), "+ntp server 10.0.0.9");
    }

    #[test]
    fn test_replace_failed() {
        assert!(replace_failed("%Error opening flash:candidate_config.txt (File not found)"));
        assert!(replace_failed("Rollback failed. The original configuration has been successfully restored."));
        assert!(replace_failed("%Please turn config archive on before using Rollback Confirmed Change."));
        assert!(!replace_failed("Total number of passes: 1\nRollback Done"));
    }

    #[test]
    fn test_copy_failed() {
        assert!(copy_failed("%Error opening flash:rollback_config.txt (No space left on device)"));
        assert!(copy_failed("% Invalid input detected at '^' marker."));
        assert!(!copy_failed("1024 bytes copied in 0.100 secs (10240 bytes/sec)"));
    }
}
