//! Cisco IOS platform definition.
//!
//! # Prompt Examples
//!
//! ```text
//! router>                            # exec mode
//! router#                            # privilege_exec mode
//! router(config)#                    # configuration mode
//! router(config-if)#                 # config sub-mode (interface)
//! router(tcl)#                       # Tcl shell, used for file transfer
//! ```
//!
//! # Mode Graph
//!
//! ```text
//! ┌──────┐  enable     ┌────────────────┐  configure terminal  ┌───────────────┐
//! │ exec ├──────────────► privilege_exec ├──────────────────────► configuration │
//! │  >   │   disable   │       #        │        end           │  (config*)#   │
//! └──────┘◄────────────┴───────┬────────┘◄─────────────────────┴───────────────┘
//!                        tclsh │ ▲ tclquit
//!                              ▼ │
//!                          ┌─────┴─┐
//!                          │  tcl  │
//!                          └───────┘
//! ```

use crate::platform::{CliMode, PlatformDefinition};

/// Canonical vendor tag for Cisco IOS.
pub const PLATFORM_NAME: &str = "ios";

/// Mode names used by the configuration dialect.
pub const PRIVILEGE_EXEC: &str = "privilege_exec";
pub const TCL: &str = "tcl";

/// Output markers of a command the CLI did not accept.
pub const INVALID_MARKERS: &[&str] = &[
    "% Invalid",
    "% Ambiguous command",
    "% Incomplete command",
    "% Unknown command",
];

/// Create the Cisco IOS platform definition.
pub fn platform() -> PlatformDefinition {
    let exec = CliMode::new("exec", r"(?mi)^[\w.\-@/:]{1,63}>\s?$").unwrap();

    let privilege_exec = CliMode::new(PRIVILEGE_EXEC, r"(?mi)^[\w.\-@/:]{1,63}#\s?$")
        .unwrap()
        .with_parent("exec")
        .with_enter("enable")
        .with_exit("disable")
        .with_auth(r"(?mi)^password:\s?$")
        .unwrap();

    let configuration = CliMode::new(
        "configuration",
        r"(?mi)^[\w.\-@/:]{1,63}\(config[\w.\-@/:+]{0,32}\)#\s?$",
    )
    .unwrap()
    .with_parent(PRIVILEGE_EXEC)
    .with_enter("configure terminal")
    .with_exit("end");

    let tcl = CliMode::new(TCL, r"(?mi)^[\w.\-@/:]{1,63}\(tcl\)#\s?$")
        .unwrap()
        .with_parent(PRIVILEGE_EXEC)
        .with_enter("tclsh")
        .with_exit("tclquit");

    let mut platform = PlatformDefinition::new(PLATFORM_NAME)
        .with_mode(exec)
        .with_mode(privilege_exec)
        .with_mode(configuration)
        .with_mode(tcl)
        .with_default_mode(PRIVILEGE_EXEC)
        .with_config_mode("configuration")
        .with_noise_pattern(r"^Building configuration")
        .with_noise_pattern(r"^Current configuration :")
        .with_on_open_command("terminal length 0")
        .with_on_open_command("terminal width 511")
        .with_terminal_size(511, 24);
    for marker in INVALID_MARKERS {
        platform = platform.with_invalid_marker(*marker);
    }
    platform
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ios_platform() {
        let platform = platform();
        assert_eq!(platform.name, "ios");
        assert_eq!(platform.modes.len(), 4);
        assert!(platform.validate().is_ok());
        assert_eq!(platform.default_mode, "privilege_exec");
        assert_eq!(platform.config_mode, "configuration");
    }

    #[test]
    fn test_prompt_modes() {
        let platform = platform();
        let mode_of = |prompt: &str| {
            platform
                .modes
                .values()
                .find(|m| m.matches(prompt))
                .map(|m| m.name.as_str())
        };

        assert_eq!(mode_of("router>"), Some("exec"));
        assert_eq!(mode_of("router.lab>"), Some("exec"));
        assert_eq!(mode_of("router#"), Some("privilege_exec"));
        assert_eq!(mode_of("router# "), Some("privilege_exec"));
        assert_eq!(mode_of("router(config)#"), Some("configuration"));
        assert_eq!(mode_of("router(config-if)#"), Some("configuration"));
        assert_eq!(mode_of("router(config-router)#"), Some("configuration"));
        assert_eq!(mode_of("router(tcl)#"), Some("tcl"));
        assert_eq!(mode_of("Password:"), None);
    }

    #[test]
    fn test_enable_needs_password() {
        let platform = platform();
        let privilege_exec = platform.mode(PRIVILEGE_EXEC).unwrap();
        let auth = privilege_exec.auth_prompt.as_ref().unwrap();
        assert!(auth.is_match(b"Password:"));
        assert!(auth.is_match(b"Password: "));
    }

    #[test]
    fn test_invalid_markers() {
        let platform = platform();
        assert!(platform.is_invalid("                 ^\n% Invalid input detected at '^' marker."));
        assert!(platform.is_invalid("% Ambiguous command:  \"sh\""));
        assert!(platform.is_invalid("% Incomplete command."));
        assert!(platform.is_invalid("% Unknown command or computer name"));
        assert!(!platform.is_invalid("Cisco IOS Software, IOSv Software"));
    }
}
