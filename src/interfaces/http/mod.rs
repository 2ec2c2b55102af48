//! HTTP interface: REST API, middleware and OpenAPI docs

pub mod common;
pub mod middleware;
pub mod modules;
pub mod router;

pub use common::{ApiResponse, ApiResult, ValidatedJson};
pub use router::{create_api_router, ApiContext, ApiDoc};
