//! # qrlink Common Library
//!
//! Shared code for the qrlink workspace:
//! - Error types and the per-stage failure taxonomy
//! - Key lookup and bootstrap configuration loading
//! - Scoped resource release

pub mod config;
pub mod error;
pub mod scope;
pub mod stage;

pub use error::{Error, Result};
pub use scope::{Release, Scoped};
pub use stage::{Stage, StageError, StageResult};
