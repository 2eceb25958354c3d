//! Core Module - Analysis Pipeline
//!
//! Counterparty enrichment, eligibility scoring, and the analyzer that
//! sequences a request through them.

pub mod analyzer;
pub mod enricher;
pub mod scoring;

pub use analyzer::*;
pub use enricher::*;
pub use scoring::*;
