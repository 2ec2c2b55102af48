//! # tour-desk
//!
//! Backend for real-estate agent dashboards: the tour-request lifecycle,
//! live per-agent notifications, calendar events for scheduled tours and
//! the aggregates behind the dashboard charts.
//!
//! ## Architecture
//!
//! - **domain**: entities, the tour-request state machine, calendar
//!   materialization, analytics and repository traits
//! - **application**: services, the event bus and background tasks
//! - **infrastructure**: SeaORM storage, in-memory storage, JWT, Realtor client
//! - **interfaces**: REST API with Swagger docs and WebSocket notifications
//! - **server**: process bootstrap and graceful shutdown

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig};

pub use infrastructure::{init_database, DatabaseConfig, InMemoryRepositoryProvider};

pub use interfaces::{create_api_router, ApiContext};

pub use application::{create_event_bus, EventBus, SharedEventBus};

pub use shared::errors::{DomainError, InfraError};
