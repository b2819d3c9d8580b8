//! HTTP front door: status endpoint, dashboard and static assets

pub mod dashboard;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::State,
    http::{HeaderName, HeaderValue},
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

use crate::application::errors::StartupError;
use crate::domain::entities::SessionStatus;
use crate::infrastructure::database::Database;

pub const DASHBOARD_PATH: &str = "/dashboard";

/// Baseline security headers, applied unless a handler set its own
const SECURITY_HEADERS: &[(&str, &str)] = &[
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "SAMEORIGIN"),
    ("referrer-policy", "no-referrer"),
    ("cross-origin-opener-policy", "same-origin"),
    ("cross-origin-resource-policy", "same-origin"),
    ("origin-agent-cluster", "?1"),
    ("x-dns-prefetch-control", "off"),
    ("x-download-options", "noopen"),
    ("x-permitted-cross-domain-policies", "none"),
    ("x-xss-protection", "0"),
];

// ── Shared app state ─────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct AppState {
    pub bot_name: String,
    pub version: &'static str,
    pub db: Arc<Database>,
    pub status: watch::Receiver<SessionStatus>,
    pub started_at: Instant,
    pub static_dir: PathBuf,
}

impl AppState {
    pub fn new(
        bot_name: impl Into<String>,
        db: Arc<Database>,
        status: watch::Receiver<SessionStatus>,
        static_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            bot_name: bot_name.into(),
            version: env!("CARGO_PKG_VERSION"),
            db,
            status,
            started_at: Instant::now(),
            static_dir: static_dir.into(),
        }
    }
}

// ── Router ───────────────────────────────────────────────────────────────────

/// Build the HTTP router (shared between production startup and tests).
pub fn build_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let router = Router::new()
        .route("/", get(status_handler))
        .nest(DASHBOARD_PATH, dashboard::router(&state.static_dir))
        .fallback_service(ServeDir::new(&state.static_dir))
        .with_state(state);

    let router = SECURITY_HEADERS.iter().fold(router, |router, &(name, value)| {
        router.layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        ))
    });

    router.layer(cors).layer(TraceLayer::new_for_http())
}

/// Liveness report; independent of session readiness
async fn status_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "running",
        "version": state.version,
        "dashboard": DASHBOARD_PATH,
    }))
}

// ── Server ───────────────────────────────────────────────────────────────────

/// A bound but not yet serving HTTP listener
pub struct HttpServer {
    listener: TcpListener,
    addr: SocketAddr,
}

impl HttpServer {
    pub async fn bind(addr: &str) -> Result<Self, StartupError> {
        let bind_err = |source| StartupError::HttpBind { addr: addr.to_string(), source };
        let listener = TcpListener::bind(addr).await.map_err(bind_err)?;
        let addr = listener.local_addr().map_err(bind_err)?;
        Ok(Self { listener, addr })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Start serving `app` on a background task
    pub fn serve(self, app: Router) -> RunningServer {
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let listener = self.listener;
        let handle = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await
        });

        tracing::info!("HTTP server listening on http://{}", self.addr);
        RunningServer {
            addr: self.addr,
            shutdown: shutdown_tx,
            handle,
        }
    }
}

/// Handle to a serving HTTP listener
pub struct RunningServer {
    addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<std::io::Result<()>>,
}

impl RunningServer {
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Stop accepting connections and wait for in-flight requests
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(());
        match self.handle.await {
            Ok(Ok(())) => tracing::debug!("HTTP server stopped"),
            Ok(Err(e)) => tracing::warn!("HTTP server exited with error: {}", e),
            Err(e) => tracing::warn!("HTTP server task failed: {}", e),
        }
    }
}
