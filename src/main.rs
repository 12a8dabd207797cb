use std::net::SocketAddr;

use anyhow::Context;
use dotenvy::dotenv;
use scholaris::router::init_router;
use scholaris::state::init_app_state;
use scholaris_config::{DatabaseConfig, ServerConfig};
use scholaris_db::{init_db_pool, run_migrations};
use scholaris_observability::init_tracing;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing();

    let db_config = DatabaseConfig::from_env().context("DATABASE_URL must be set")?;
    let pool = init_db_pool(&db_config)
        .await
        .context("failed to connect to the database")?;

    if db_config.run_migrations {
        run_migrations(&pool)
            .await
            .context("failed to apply migrations")?;
    }

    let app = init_router(init_app_state(pool));

    #[cfg(feature = "observability")]
    let app = match scholaris_observability::init_metrics() {
        Some(handle) => app.merge(scholaris_observability::metrics_app(handle)),
        None => app,
    };

    let server_config = ServerConfig::from_env();
    let address = server_config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;

    info!(%address, "Server listening");
    info!("Swagger UI at /swagger-ui, Scalar at /scalar");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("server error")?;

    Ok(())
}
