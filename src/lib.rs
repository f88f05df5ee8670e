// ABOUTME: Library root for settle - exposes public types for testing.
// ABOUTME: The main binary is in main.rs.

pub mod archive;
pub mod channel;
pub mod config;
pub mod credential;
pub mod deploy;
pub mod diagnostics;
pub mod error;
pub mod object;
pub mod output;
pub mod sink;
pub mod stability;
pub mod types;
