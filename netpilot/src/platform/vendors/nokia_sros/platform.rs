//! Nokia SR OS platform definition (Classic CLI).
//!
//! # Prompt Examples
//!
//! ```text
//! A:router#                            # exec
//! *A:router#                           # exec with unsaved changes
//! A:router>config#                     # configuration
//! *A:router>config>router>bgp#         # configuration, deeper context
//! A:router>config>port$                # configuration, new context
//! ```
//!
//! # Mode Graph
//!
//! ```text
//! ┌──────┐  configure  ┌───────────────┐
//! │ exec ├─────────────► configuration │
//! │      │  exit all   │               │
//! └──────┘◄────────────┴───────────────┘
//! ```

use crate::platform::{CliMode, PlatformDefinition};

/// Canonical vendor tag for Nokia SR OS.
pub const PLATFORM_NAME: &str = "sros";

/// Output markers of a command the CLI did not accept.
pub const INVALID_MARKERS: &[&str] = &["Bad command", "CLI Invalid"];

/// Create the Nokia SR OS platform definition.
pub fn platform() -> PlatformDefinition {
    // not_contains "@" keeps MD-CLI prompts out, ">config" keeps config out
    let exec = CliMode::new("exec", r"(?mi)^\*?[abcd]:[\w\s_.-]+#\s?$")
        .unwrap()
        .with_not_contains("@")
        .with_not_contains(">config");

    let configuration = CliMode::new(
        "configuration",
        r"(?mi)^\*?[abcd]:[\w\s_.-]+>config[\w>]*(#|\$)\s?$",
    )
    .unwrap()
    .with_parent("exec")
    .with_enter("configure")
    .with_exit("exit all")
    .with_not_contains("@");

    let mut platform = PlatformDefinition::new(PLATFORM_NAME)
        .with_mode(exec)
        .with_mode(configuration)
        .with_default_mode("exec")
        .with_config_mode("configuration")
        .with_on_open_command("environment no more")
        .with_terminal_size(512, 24);
    for marker in INVALID_MARKERS {
        platform = platform.with_invalid_marker(*marker);
    }
    platform
}
