//! Built-in vendor drivers.

pub mod cisco_ios;
pub mod nokia_sros;
