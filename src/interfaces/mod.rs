//! Interfaces layer - HTTP and WebSocket adapters

pub mod http;
pub mod ws;

pub use http::{create_api_router, ApiContext, ApiDoc};
