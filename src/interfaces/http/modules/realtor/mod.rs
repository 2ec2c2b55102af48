//! Realtor search proxy endpoints

pub mod handlers;

pub use handlers::*;
