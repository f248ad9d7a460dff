//! Zoomies Common Utilities
//!
//! Shared infrastructure for all Zoomies crates:
//! - Error types and result aliases
//! - Frame timebase conversions
//! - Tracing/logging initialization
//! - Configuration loading

pub mod config;
pub mod error;
pub mod logging;
pub mod timebase;

pub use config::*;
pub use error::*;
pub use timebase::*;
