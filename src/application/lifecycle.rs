//! Bootstrap/lifecycle controller
//!
//! Startup order is database, HTTP listener, session client, scheduled
//! automation. Any startup failure is fatal; shutdown is best effort.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::application::errors::StartupError;
use crate::application::messaging::EventDispatcher;
use crate::application::services::{AutomationService, CommandService, MessageService, ModerationService};
use crate::domain::entities::SessionStatus;
use crate::domain::traits::{ScheduledTasks, SessionClient};
use crate::infrastructure::config::Config;
use crate::infrastructure::database::Database;
use crate::infrastructure::http::{self, AppState, HttpServer, RunningServer};

pub const EXIT_OK: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;

/// How long blocking tasks (a pending stdin read) may hold up process exit
const RUNTIME_SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Starting,
    Running,
    Stopping,
    Terminated,
}

/// Owns the session client, HTTP server and background tasks
pub struct Bot {
    config: Config,
    client: Arc<dyn SessionClient>,
    state: LifecycleState,
    status: Option<watch::Receiver<SessionStatus>>,
    server: Option<RunningServer>,
    dispatcher: Option<JoinHandle<()>>,
    scheduler: Option<JoinHandle<()>>,
}

impl Bot {
    pub fn new(config: Config, client: Arc<dyn SessionClient>) -> Self {
        Self {
            config,
            client,
            state: LifecycleState::Starting,
            status: None,
            server: None,
            dispatcher: None,
            scheduler: None,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Address the HTTP server is bound to, once started
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server.as_ref().map(|s| s.local_addr())
    }

    pub fn session_status(&self) -> Option<watch::Receiver<SessionStatus>> {
        self.status.clone()
    }

    pub async fn start(&mut self) -> Result<(), StartupError> {
        self.state = LifecycleState::Starting;
        match self.start_inner().await {
            Ok(()) => {
                self.state = LifecycleState::Running;
                Ok(())
            }
            Err(e) => {
                self.state = LifecycleState::Terminated;
                Err(e)
            }
        }
    }

    async fn start_inner(&mut self) -> Result<(), StartupError> {
        tracing::info!("Starting {}", self.config.bot.name);

        let db = Arc::new(Database::open(&self.config.database.path)?);
        tracing::info!("Database initialized at {}", self.config.database.path.display());

        let mut commands = CommandService::new(&self.config.bot.prefix, self.config.bot.admins.clone());
        commands.register_defaults(&self.config.bot.name, Arc::clone(&db));
        let messages = Arc::new(MessageService::new(
            Arc::clone(&db),
            commands,
            ModerationService::new(&self.config.moderation),
        ));
        let automation = Arc::new(AutomationService::new(Arc::clone(&db), self.config.automation.clone()));

        let dispatcher = EventDispatcher::new(Arc::clone(&self.client), messages, automation.clone());
        let status = dispatcher.status();
        self.status = Some(status.clone());

        let server = HttpServer::bind(&self.config.bind_addr()).await?;
        let app = http::build_app(AppState::new(
            &self.config.bot.name,
            Arc::clone(&db),
            status,
            &self.config.http.static_dir,
        ));
        self.server = Some(server.serve(app));

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        self.dispatcher = Some(tokio::spawn(dispatcher.run(events_rx)));

        tracing::info!("Initializing session client ({})", self.client.info().backend);
        self.client.connect(events_tx).await?;

        self.scheduler = Some(automation.start(Arc::clone(&self.client)));
        Ok(())
    }

    /// Best-effort teardown; failures are logged, never returned
    pub async fn stop(&mut self) {
        self.state = LifecycleState::Stopping;
        tracing::info!("Shutting down {}", self.config.bot.name);

        if let Some(scheduler) = self.scheduler.take() {
            scheduler.abort();
        }

        if let Err(e) = self.client.disconnect().await {
            tracing::error!("Error during session shutdown: {}", e);
        }

        if let Some(server) = self.server.take() {
            server.shutdown().await;
        }

        if let Some(dispatcher) = self.dispatcher.take() {
            dispatcher.abort();
        }

        self.state = LifecycleState::Terminated;
        tracing::info!("Shutdown complete");
    }

    /// Start, wait for `shutdown`, then stop; returns the process exit code
    pub async fn run<F>(mut self, shutdown: F) -> i32
    where
        F: Future<Output = ()>,
    {
        if let Err(e) = self.start().await {
            tracing::error!("Failed to start: {}", e);
            return EXIT_FAILURE;
        }

        shutdown.await;
        self.stop().await;
        EXIT_OK
    }
}

/// Drive `bot` on a fresh multi-thread runtime until `shutdown` resolves.
///
/// Blocking reads cannot be cancelled, so once the bot has stopped the
/// runtime waits at most [`RUNTIME_SHUTDOWN_GRACE`] for them.
pub fn run_blocking<F>(bot: Bot, shutdown: F) -> i32
where
    F: Future<Output = ()>,
{
    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to create runtime: {}", e);
            return EXIT_FAILURE;
        }
    };

    let code = rt.block_on(bot.run(shutdown));
    rt.shutdown_timeout(RUNTIME_SHUTDOWN_GRACE);
    code
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::RecordingSession;
    use std::sync::atomic::Ordering;

    fn config(dir: &tempfile::TempDir) -> Config {
        let mut config = Config::default();
        config.http.host = "127.0.0.1".to_string();
        config.http.port = 0;
        config.database.path = dir.path().join("bot.db");
        config.http.static_dir = dir.path().to_path_buf();
        config
    }

    #[tokio::test]
    async fn test_database_failure_prevents_http_bind() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(&dir);
        config.database.path = dir.path().join("missing").join("bot.db");
        let client = Arc::new(RecordingSession::new());
        let mut bot = Bot::new(config, client.clone());

        assert!(matches!(bot.start().await, Err(StartupError::Database(_))));
        assert_eq!(bot.state(), LifecycleState::Terminated);
        assert!(bot.local_addr().is_none());
        assert_eq!(client.connects.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_session_failure_after_bind_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let client = Arc::new(RecordingSession::failing_connect());

        let code = Bot::new(config(&dir), client.clone()).run(async {}).await;

        assert_eq!(code, EXIT_FAILURE);
        assert_eq!(client.connects.load(Ordering::SeqCst), 1);
        assert_eq!(client.disconnects.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_stop_runs_once_and_exits_cleanly_even_if_teardown_fails() {
        let dir = tempfile::tempdir().unwrap();
        let client = Arc::new(RecordingSession::failing_disconnect());

        let code = Bot::new(config(&dir), client.clone()).run(async {}).await;

        assert_eq!(code, EXIT_OK);
        assert_eq!(client.disconnects.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_start_reaches_running() {
        let dir = tempfile::tempdir().unwrap();
        let mut bot = Bot::new(config(&dir), Arc::new(RecordingSession::new()));

        bot.start().await.unwrap();
        assert_eq!(bot.state(), LifecycleState::Running);
        assert!(bot.local_addr().is_some());

        let mut status = bot.session_status().unwrap();
        status.wait_for(|s| s.is_ready()).await.unwrap();

        bot.stop().await;
        assert_eq!(bot.state(), LifecycleState::Terminated);
    }

    #[test]
    fn test_run_blocking_returns_while_a_blocking_read_is_pending() {
        let dir = tempfile::tempdir().unwrap();
        let (input_tx, input_rx) = std::sync::mpsc::channel();
        let client = Arc::new(RecordingSession::with_blocking_reader(input_rx));
        let bot = Bot::new(config(&dir), client.clone());

        let (done_tx, done_rx) = std::sync::mpsc::channel();
        std::thread::spawn(move || {
            let _ = done_tx.send(run_blocking(bot, async {}));
        });

        assert_eq!(done_rx.recv_timeout(Duration::from_secs(10)), Ok(EXIT_OK));
        assert_eq!(client.disconnects.load(Ordering::SeqCst), 1);
        drop(input_tx);
    }
}
