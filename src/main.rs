use anyhow::Context;
use axum::Router;
use axum::extract::State;
use dotenv::dotenv;
use sqlx::postgres::PgPoolOptions;
use std::env;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

mod api;
mod app_env;
mod auth;
mod domain;
mod dto;
mod external_connections;
mod logging;
mod persistence;
mod routing_utils;

#[cfg(all(test, feature = "integration_test"))]
mod integration_test;

/// Fallback bind address when [app_env::LISTEN_ADDR] isn't set
const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8082";

/// Application state shared across request handlers
pub struct SharedData {
    pub ext_cxn: persistence::ExternalConnectivity,
}

type AppState = State<Arc<SharedData>>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let env_filter = logging::init_env_filter();
    let otel_exporters = match (
        env::var(app_env::OTEL_SPAN_EXPORT_URL),
        env::var(app_env::OTEL_METRIC_EXPORT_URL),
    ) {
        (Ok(traces_endpoint), Ok(metrics_endpoint)) => {
            Some(logging::init_exporters(&traces_endpoint, &metrics_endpoint))
        }
        _ => None,
    };
    logging::setup_logging_and_tracing(env_filter, otel_exporters);

    let db_url =
        env::var(app_env::DB_URL).context("DATABASE_URL must be set to reach postgres")?;
    let db_pool = PgPoolOptions::new()
        .max_connections(16)
        .connect(&db_url)
        .await
        .context("connecting to the database")?;
    sqlx::migrate!()
        .run(&db_pool)
        .await
        .context("running database migrations")?;

    let shared_data = Arc::new(SharedData {
        ext_cxn: persistence::ExternalConnectivity::new(db_pool),
    });

    let router = Router::new()
        .merge(api::swagger_main::build_documentation())
        .nest(
            "/users",
            api::user::user_routes()
                .merge(api::project::project_routes())
                .merge(api::task::task_routes()),
        )
        .with_state(shared_data);
    let router = logging::attach_tracing_http(router);

    let listen_addr =
        env::var(app_env::LISTEN_ADDR).unwrap_or_else(|_| DEFAULT_LISTEN_ADDR.to_owned());
    let listener = TcpListener::bind(&listen_addr)
        .await
        .with_context(|| format!("binding to {listen_addr}"))?;
    info!("Server listening at {listen_addr}.");
    axum::serve(listener, router)
        .await
        .context("serving the API")?;

    Ok(())
}
