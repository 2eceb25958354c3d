//! Models Module - Data Structures & Configuration
//!
//! Single source of truth for the data types, errors and configuration
//! shared across the pipeline.

pub mod config;
pub mod errors;
pub mod types;

pub use config::*;
pub use errors::*;
pub use types::*;
