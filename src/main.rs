use std::{future::IntoFuture, process, sync::Arc, time::Duration};

use todo_service::{
    application::{
        broker::{ChannelPublisher, KeyCache},
        cache::CacheLookupService,
        error::AppError,
        repos::TodosRepo,
        todos::{ChangeFeed, TodoService},
    },
    config::{self, BrokerBackend},
    infra::{
        db::PostgresRepositories,
        error::InfraError,
        http::{self, HttpState},
        memory::InMemoryBroker,
        redis::{RedisBroker, redact_url},
        telemetry,
    },
};
use tokio::signal;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;
    let (cache, publisher) = init_broker(&settings.broker).await?;
    let state = build_http_state(repositories, cache, publisher, &settings);
    serve_http(&settings, state).await
}

async fn init_repositories(
    settings: &config::Settings,
) -> Result<Arc<PostgresRepositories>, AppError> {
    let database_url = settings
        .database
        .url
        .as_ref()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))
        .map_err(AppError::from)?;

    let pool =
        PostgresRepositories::connect(database_url, settings.database.max_connections.get())
            .await
            .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    Ok(Arc::new(PostgresRepositories::new(pool)))
}

async fn init_broker(
    broker: &config::BrokerSettings,
) -> Result<(Arc<dyn KeyCache>, Arc<dyn ChannelPublisher>), AppError> {
    match broker.backend {
        BrokerBackend::Redis => {
            let redis = Arc::new(
                RedisBroker::connect(&broker.url)
                    .await
                    .map_err(|err| AppError::from(InfraError::broker(err.to_string())))?,
            );
            info!(
                target = "todo::bootstrap",
                backend = "redis",
                url = %redact_url(&broker.url),
                "broker ready"
            );
            let cache: Arc<dyn KeyCache> = redis.clone();
            let publisher: Arc<dyn ChannelPublisher> = redis;
            Ok((cache, publisher))
        }
        BrokerBackend::Memory => {
            warn!(
                target = "todo::bootstrap",
                backend = "memory",
                "using in-process broker; cache keys and notifications are not shared"
            );
            let memory = Arc::new(InMemoryBroker::new());
            let cache: Arc<dyn KeyCache> = memory.clone();
            let publisher: Arc<dyn ChannelPublisher> = memory;
            Ok((cache, publisher))
        }
    }
}

fn build_http_state(
    repositories: Arc<PostgresRepositories>,
    cache: Arc<dyn KeyCache>,
    publisher: Arc<dyn ChannelPublisher>,
    settings: &config::Settings,
) -> HttpState {
    let todos_repo: Arc<dyn TodosRepo> = repositories.clone();

    let change_feed = settings.pubsub.enabled.then(|| ChangeFeed {
        publisher,
        channel: settings.pubsub.channel.clone(),
    });
    let todos = TodoService::new(todos_repo).with_change_feed_opt(change_feed);

    HttpState {
        todos: Arc::new(todos),
        cache: Arc::new(CacheLookupService::new(cache)),
        db: repositories,
    }
}

async fn serve_http(settings: &config::Settings, state: HttpState) -> Result<(), AppError> {
    let router = http::build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        target = "todo::bootstrap",
        addr = %settings.server.addr,
        "listening"
    );

    let grace = settings.server.graceful_shutdown;
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    let server = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = shutdown_tx.send(());
        })
        .into_future();

    tokio::select! {
        result = server => {
            result.map_err(|err| AppError::unexpected(format!("server error: {err}")))
        }
        _ = drain_deadline(shutdown_rx, grace) => {
            warn!(
                target = "todo::bootstrap",
                grace_seconds = grace.as_secs(),
                "graceful shutdown timed out; dropping open connections"
            );
            Ok(())
        }
    }
}

/// Resolves `grace` after shutdown begins; pending forever until then.
async fn drain_deadline(shutdown_rx: tokio::sync::oneshot::Receiver<()>, grace: Duration) {
    if shutdown_rx.await.is_err() {
        std::future::pending::<()>().await;
    }
    tokio::time::sleep(grace).await;
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!(target = "todo::bootstrap", "shutdown signal received");
}
