//! Utils Module - Shared State & Helpers
//!
//! Process-scoped state (cache, rate limiter, telemetry) and the constants
//! every other module reads from.

pub mod cache;
pub mod constants;
pub mod rate_limiter;
pub mod telemetry;

pub use cache::*;
pub use rate_limiter::*;
pub use telemetry::*;
