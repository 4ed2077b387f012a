//! Nokia SR OS platform support.

mod driver;
mod platform;

pub use driver::SrosDriver;
pub use platform::{INVALID_MARKERS, PLATFORM_NAME, platform};
