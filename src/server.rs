//! Reusable tour-desk server runtime.
//!
//! [`ServerHandle`] owns the full lifecycle: metrics recorder, storage
//! (SQLite through SeaORM or the in-memory store), services, the tour
//! expiry task, the REST/WebSocket API and graceful shutdown.

use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::{error, info, warn};

use crate::application::{
    create_event_bus, start_tour_expiry_task, AnalyticsService, CalendarService, SharedEventBus,
    TourRequestService,
};
use crate::config::{AppConfig, LoggingConfig};
use crate::domain::RepositoryProvider;
use crate::infrastructure::database::migrator::Migrator;
use crate::infrastructure::database::repositories::SeaOrmRepositoryProvider;
use crate::infrastructure::{init_database, InMemoryRepositoryProvider, RealtorClient};
use crate::interfaces::{create_api_router, ApiContext};
use crate::shared::shutdown::{ShutdownCoordinator, ShutdownSignal};

// ── Options ────────────────────────────────────────────────────────

pub struct ServerOptions {
    pub config: AppConfig,
    /// Run database migrations on startup (default: true).
    pub auto_migrate: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            config: AppConfig::default(),
            auto_migrate: true,
        }
    }
}

// ── ServerHandle ───────────────────────────────────────────────────

/// Handle to a running tour-desk server.
///
/// ```rust,no_run
/// use tour_desk::server::{ServerHandle, ServerOptions};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let handle = ServerHandle::start(ServerOptions::default()).await?;
///     handle.install_signal_handler();
///     handle.shutdown_signal().wait().await;
///     handle.wait().await;
///     Ok(())
/// }
/// ```
pub struct ServerHandle {
    pub event_bus: SharedEventBus,
    pub repos: Arc<dyn RepositoryProvider>,
    pub tour_requests: Arc<TourRequestService>,
    pub config: AppConfig,
    /// Address the REST API is bound to (resolved, so port 0 works).
    pub api_addr: SocketAddr,

    db: Option<DatabaseConnection>,
    shutdown: ShutdownCoordinator,
    api_task: tokio::task::JoinHandle<()>,
    expiry_task: tokio::task::JoinHandle<()>,
}

impl ServerHandle {
    pub async fn start(opts: ServerOptions) -> Result<Self, Box<dyn std::error::Error>> {
        let app_cfg = opts.config;

        info!("Starting tour-desk...");

        let prometheus_handle = prometheus_handle();

        // ── Storage ────────────────────────────────────────────
        let (repos, db): (Arc<dyn RepositoryProvider>, Option<DatabaseConnection>) =
            if app_cfg.database.is_memory() {
                warn!("Using in-memory storage, data is lost on shutdown");
                (Arc::new(InMemoryRepositoryProvider::new()), None)
            } else {
                let db = init_database(&app_cfg.database.to_database_config()).await?;
                if opts.auto_migrate {
                    info!("Running database migrations...");
                    Migrator::up(&db, None).await?;
                    info!("Migrations completed");
                }
                (Arc::new(SeaOrmRepositoryProvider::new(db.clone())), Some(db))
            };

        // ── Services ───────────────────────────────────────────
        let event_bus = create_event_bus();
        let tour_requests = Arc::new(TourRequestService::new(
            repos.clone(),
            event_bus.clone(),
            app_cfg.tours.pending_ttl(),
        ));
        let calendar = Arc::new(CalendarService::new(tour_requests.clone()));
        let analytics = Arc::new(AnalyticsService::new(repos.clone()));
        let realtor = Arc::new(RealtorClient::new(&app_cfg.realtor.realtor_config())?);
        if !realtor.is_configured() {
            warn!("RAPIDAPI_KEY not configured, Realtor search will return errors");
        }

        let jwt_config = app_cfg.security.jwt_config();
        info!(audience = ?jwt_config.audience, "JWT verification configured");

        // ── Shutdown coordinator ───────────────────────────────
        let shutdown = ShutdownCoordinator::new(app_cfg.server.shutdown_timeout);
        let shutdown_signal = shutdown.signal();

        // ── Background tasks ───────────────────────────────────
        let expiry_task = start_tour_expiry_task(
            tour_requests.clone(),
            shutdown_signal.clone(),
            app_cfg.tours.expiry_check_interval_secs,
        );

        // ── REST API server ────────────────────────────────────
        let api_router = create_api_router(ApiContext {
            repos: repos.clone(),
            tour_requests: tour_requests.clone(),
            calendar,
            analytics,
            realtor,
            event_bus: event_bus.clone(),
            jwt_config,
            db: db.clone(),
            metrics: prometheus_handle,
        });

        let listener = tokio::net::TcpListener::bind(app_cfg.api_address()).await?;
        let api_addr = listener.local_addr()?;
        info!("REST API server listening on http://{}", api_addr);
        info!("Swagger UI available at http://{}/docs/", api_addr);

        let api_shutdown = shutdown_signal.clone();
        let api_server = axum::serve(
            listener,
            api_router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(async move {
            api_shutdown.wait().await;
            info!("REST API server received shutdown signal");
        });

        let api_task = tokio::spawn(async move {
            if let Err(e) = api_server.await {
                error!("REST API server error: {}", e);
            }
        });

        info!("tour-desk started");

        Ok(Self {
            event_bus,
            repos,
            tour_requests,
            config: app_cfg,
            api_addr,
            db,
            shutdown,
            api_task,
            expiry_task,
        })
    }

    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.signal()
    }

    /// Install SIGINT/SIGTERM listeners that trigger shutdown.
    pub fn install_signal_handler(&self) {
        self.shutdown.start_signal_listener();
    }

    pub fn trigger_shutdown(&self) {
        self.shutdown.signal().trigger();
    }

    /// Wait for the server to stop after shutdown has been triggered.
    ///
    /// Gives tasks `server.shutdown_timeout` seconds before aborting them.
    pub async fn wait(self) {
        info!("Waiting for server tasks to complete...");

        let Self {
            db,
            shutdown,
            api_task,
            expiry_task,
            ..
        } = self;

        let timeout = Duration::from_secs(shutdown.timeout_secs());
        let api_abort = api_task.abort_handle();
        let expiry_abort = expiry_task.abort_handle();

        let tasks = async move {
            let (api, expiry) = tokio::join!(api_task, expiry_task);
            if let Err(e) = api {
                error!("REST API server task failed: {}", e);
            }
            if let Err(e) = expiry {
                error!("Tour expiry task failed: {}", e);
            }
        };

        if tokio::time::timeout(timeout, tasks).await.is_err() {
            warn!(timeout_secs = timeout.as_secs(), "Shutdown timed out, aborting tasks");
            api_abort.abort();
            expiry_abort.abort();
        }

        if let Some(db) = db {
            if let Err(e) = db.close().await {
                warn!("Error closing database connection: {}", e);
            } else {
                info!("Database connection closed");
            }
        }

        info!("tour-desk shutdown complete");
    }

    /// Trigger shutdown and wait for completion.
    pub async fn shutdown(self) {
        info!("Shutting down tour-desk...");
        self.trigger_shutdown();
        self.wait().await;
    }

    pub fn is_running(&self) -> bool {
        !self.api_task.is_finished()
    }
}

// ── Helpers ────────────────────────────────────────────────────────

/// The global recorder can only be installed once per process, so a
/// restart in the same process reuses the first handle.
fn prometheus_handle() -> Option<PrometheusHandle> {
    static PROM_HANDLE: OnceLock<Option<PrometheusHandle>> = OnceLock::new();

    PROM_HANDLE
        .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => {
                info!("Prometheus metrics recorder installed");
                Some(handle)
            }
            Err(e) => {
                warn!("Prometheus recorder not installed, /metrics disabled: {}", e);
                None
            }
        })
        .clone()
}

/// Initialize tracing from the logging config. `RUST_LOG` wins over
/// `logging.level`. Call once at process startup.
pub fn init_tracing(config: &LoggingConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.level));

    let result = match config.format.to_lowercase().as_str() {
        "json" => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        _ => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init(),
    };

    if let Err(e) = result {
        eprintln!("tracing already initialized: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.database.url = "memory".into();
        config.server.api_host = "127.0.0.1".into();
        config.server.api_port = 0;
        config.server.shutdown_timeout = 5;
        config
    }

    #[tokio::test]
    async fn starts_on_memory_store_and_shuts_down() {
        let handle = ServerHandle::start(ServerOptions {
            config: memory_config(),
            auto_migrate: false,
        })
        .await
        .unwrap();

        assert!(handle.is_running());
        assert_ne!(handle.api_addr.port(), 0);

        let body: serde_json::Value =
            reqwest::get(format!("http://{}/health", handle.api_addr))
                .await
                .unwrap()
                .json()
                .await
                .unwrap();
        assert_eq!(body["database"]["status"], "memory");

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn starts_on_sqlite_and_runs_migrations() {
        let mut config = memory_config();
        config.database.url = "sqlite::memory:".into();
        config.database.max_connections = 1;

        let handle = ServerHandle::start(ServerOptions {
            config,
            auto_migrate: true,
        })
        .await
        .unwrap();

        assert!(handle.repos.properties().find_by_id("missing").await.unwrap().is_none());

        handle.shutdown().await;
    }
}
