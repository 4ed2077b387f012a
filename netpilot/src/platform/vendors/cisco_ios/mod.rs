//! Cisco IOS platform support.

mod config_session;
mod driver;
mod platform;

pub use config_session::{CANDIDATE_FILE, IosDialect, MERGE_FILE, ROLLBACK_FILE};
pub use driver::IosDriver;
pub use platform::{INVALID_MARKERS, PLATFORM_NAME, PRIVILEGE_EXEC, TCL, platform};
