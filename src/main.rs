use std::process;
use std::sync::Arc;

use merx::{
    application::products::ProductService,
    config,
    infra::{
        cache::RedisProductCache,
        db::PostgresRepositories,
        error::InfraError,
        http::{self, AppState},
        rpc, telemetry,
    },
};
use thiserror::Error;
use tokio::{sync::watch, try_join};
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }
}

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
    let (_cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    serve(settings).await
}

async fn serve(settings: config::Settings) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;
    let cache = Arc::new(RedisProductCache::connect(&settings.cache).await?);

    let products = Arc::new(ProductService::new(repositories.clone(), cache));

    let state = AppState {
        products: products.clone(),
        db: repositories,
    };
    let router = http::build_router(state);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    info!(addr = %settings.server.addr, "HTTP server listening");

    let (shutdown_tx, shutdown_rx) = watch::channel(());
    let graceful_shutdown = settings.server.graceful_shutdown;
    tokio::spawn(async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "failed to listen for shutdown signal");
            return;
        }
        info!("received shutdown signal");
        let _ = shutdown_tx.send(());

        // In-flight requests get the configured grace period, then we stop waiting.
        tokio::time::sleep(graceful_shutdown).await;
        error!("graceful shutdown timed out");
        process::exit(1);
    });

    let mut http_shutdown = shutdown_rx.clone();
    let http_server = axum::serve(listener, router).with_graceful_shutdown(async move {
        let _ = http_shutdown.changed().await;
    });

    let mut rpc_shutdown = shutdown_rx;
    let rpc_server = rpc::serve(settings.rpc.addr, products, async move {
        let _ = rpc_shutdown.changed().await;
    });

    let http_task = async {
        http_server
            .await
            .map_err(|err| AppError::unexpected(format!("http server error: {err}")))
    };
    let rpc_task = async {
        rpc_server
            .await
            .map_err(|err| AppError::unexpected(format!("rpc server error: {err}")))
    };

    try_join!(http_task, rpc_task)?;

    info!("shutdown complete");
    Ok(())
}

async fn init_repositories(settings: &config::Settings) -> Result<Arc<PostgresRepositories>, AppError> {
    let pool = PostgresRepositories::connect(&settings.database)
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    Ok(Arc::new(PostgresRepositories::new(pool)))
}
