//! Wallet Scout HTTP API Module
//! Thin REST surface over the wallet analyzer

pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod types;

pub use handlers::AppState;
pub use routes::create_router;
pub use types::*;
