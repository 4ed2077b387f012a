//! Channel layer for prompt detection and command framing.
//!
//! Sits between a raw [`Transport`](crate::transport::Transport) and the
//! driver: writes command lines, reads until a prompt, strips ANSI escapes,
//! command echo and the trailing prompt.

mod buffer;
mod cli;
mod patterns;

pub use buffer::PatternBuffer;
pub use cli::{CliChannel, Exchange};
pub use patterns::{combine_patterns, split_prompt, strip_echo, unify_newlines};
