//! Wavpipe CLI Library
//!
//! Configuration loading and progress rendering for the `wavpipe` binary.
//!
//! This library exposes the core components for testing purposes.

pub mod config;
pub mod error;
pub mod progress;

// Re-export commonly used types for convenience
pub use config::{CliConfig, DecodeSettings, LogSettings};
pub use error::{CliError, Result};
pub use progress::ProgressLine;
