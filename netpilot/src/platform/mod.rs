//! Platform definitions for multi-vendor support.
//!
//! A [`PlatformDefinition`] describes a vendor CLI as data: prompt patterns
//! and the mode graph, invalid-command markers, noise lines and on-open
//! commands. The [`VendorRegistry`] maps canonical vendor tags to drivers.

mod definition;
mod mode;
mod registry;
pub mod vendors;

pub use definition::PlatformDefinition;
pub use mode::CliMode;
pub use registry::{DriverFactory, VendorRegistry};
