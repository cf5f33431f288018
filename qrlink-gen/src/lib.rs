//! qrlink-gen library interface
//!
//! Exposes the pipeline stages and the orchestrator for the binary and for
//! integration testing.

pub mod config;
pub mod http;
pub mod input;
pub mod models;
pub mod pipeline;
pub mod qr;
pub mod store;
pub mod summary;

pub use crate::config::PipelineSettings;
pub use crate::models::RunReport;
pub use crate::pipeline::Pipeline;
