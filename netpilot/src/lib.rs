//! # netpilot
//!
//! Async multi-vendor CLI session drivers for routers and switches.
//!
//! netpilot hides vendor differences behind one [`Driver`] contract: open a
//! session over SSH or Telnet, run commands (with ordered fallback
//! candidates), push configuration lines, and manage candidate
//! configurations as load / compare / commit / discard / rollback
//! transactions.
//!
//! ## Features
//!
//! - Async SSH (russh) and Telnet transports behind a pluggable [`transport::Connector`]
//! - Built-in Nokia SR OS (Classic CLI) and Cisco IOS drivers
//! - Graph-based CLI mode navigation, including `enable` passwords
//! - Output normalization that strips banner and timestamp noise
//! - A [`ConnectionOpener`] that classifies devices and negotiates the transport
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use netpilot::{Command, Driver, DriverBuilder};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), netpilot::Error> {
//!     let mut driver = DriverBuilder::new("192.0.2.10")
//!         .username("admin")
//!         .password("secret")
//!         .vendor("sros")
//!         .build()?;
//!
//!     driver.open().await?;
//!
//!     let uptime = driver.send(Command::from("show uptime")).await?;
//!     println!("{uptime}");
//!
//!     driver.close().await?;
//!     Ok(())
//! }
//! ```

pub mod channel;
pub mod driver;
pub mod error;
pub mod normalize;
pub mod opener;
pub mod platform;
pub mod transport;

// Re-export main types for convenience
pub use driver::{
    CandidateSource, Command, ConfigScope, ConfigSnapshot, ConfigState, Driver, DriverBuilder,
    Getter, LoadMode, Liveness,
};
pub use error::{Error, Result};
pub use normalize::OutputNormalizer;
pub use opener::{
    ConnectionOpener, CredentialProvider, Credentials, DeviceTarget, Negotiated, OsClassifier,
    TransportPlan, normalize_vendor_tag,
};
pub use platform::{CliMode, PlatformDefinition, VendorRegistry};
pub use transport::{AuthMethod, HostKeyVerification, TransportKind};
