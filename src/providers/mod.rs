//! Providers Module - External Data Sources
//!
//! Upstream chain data: the source trait and the Etherscan-compatible client.

pub mod explorer;
pub mod source;

pub use explorer::*;
pub use source::*;
