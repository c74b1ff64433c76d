use anyhow::{Context, Result};
use axum::Router;
use std::{io::ErrorKind, path::Path, sync::Arc};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use warren::{
    config::{AppConfig, Command},
    db,
    models::user::UserRoles,
    routes,
    state::AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // --- Parse config + command ---
    let (cfg, command) = AppConfig::from_env_and_args()?;

    tracing::info!("Starting warren with config: {:?}", cfg);

    // --- Ensure the database directory exists ---
    let db_path = cfg
        .database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .trim_start_matches("file:");
    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() && !db_path.contains(":memory:") {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating database directory {:?}", parent))?;
            tracing::info!("Created missing directory {:?}", parent);
        }
    }

    // --- Initialize SQLite connection ---
    let db = Arc::new(
        db::connect(&cfg.database_url, cfg.max_connections)
            .await
            .with_context(|| format!("connecting to {}", cfg.database_url))?,
    );

    match command {
        Command::Migrate => {
            db::run_migrations(&db).await?;
            tracing::info!("Database migration complete.");
            return Ok(()); // exit after migration
        }
        Command::CreateUser {
            username,
            fox,
            superuser,
        } => {
            let state = AppState::new(db.clone());
            let user = state
                .users
                .create_user(&username, UserRoles { superuser, fox })
                .await?;
            tracing::info!(
                user_id = user.id,
                fox = user.is_fox,
                superuser = user.is_superuser,
                "Created user `{}` with API token {}",
                user.username,
                user.api_token
            );
            return Ok(());
        }
        Command::Serve => {}
    }

    if cfg.auto_migrate {
        db::run_migrations(&db).await?;
    }

    // --- Build router ---
    let app: Router = routes::routes::app(AppState::new(db));

    // --- Start server ---
    let addr = cfg.addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err)
            if err.kind() == ErrorKind::PermissionDenied
                && matches!(cfg.host.as_str(), "0.0.0.0" | "::") =>
        {
            let fallback_addr = format!("127.0.0.1:{}", cfg.port);
            tracing::warn!(
                "Permission denied binding to {} ({}). Falling back to {}",
                addr,
                err,
                fallback_addr
            );
            TcpListener::bind(&fallback_addr).await?
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
