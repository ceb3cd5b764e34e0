use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ironlog::config::Config;
use ironlog::handlers::{backup, dashboard, health, routine, sessions, settings};
use ironlog::repositories::Repositories;
use ironlog::services::drafts::{DraftStore, SWEEP_PERIOD};
use ironlog::version::GIT_VERSION;
use ironlog::{db, migrations, routes};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ironlog=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let config = Config::from_env();

    tracing::info!("ironlog {} starting", GIT_VERSION);
    tracing::info!("Connecting to database: {}", config.database_url);

    let pool = db::create_pool(&config.database_url)?;
    migrations::run_migrations(&pool)?;

    let repos = Repositories::new(pool.clone());

    let health_state = health::HealthState { pool };
    let dashboard_state = dashboard::DashboardState {
        repos: repos.clone(),
    };
    let drafts = DraftStore::new();
    let sweeper = drafts.spawn_sweeper(SWEEP_PERIOD);
    let sessions_state = sessions::SessionsState {
        repos: repos.clone(),
        drafts,
    };
    let routine_state = routine::RoutineState {
        repos: repos.clone(),
    };
    let settings_state = settings::SettingsState {
        repos: repos.clone(),
    };
    let backup_state = backup::BackupState { repos };

    let app = routes::create_router(
        health_state,
        dashboard_state,
        sessions_state,
        routine_state,
        settings_state,
        backup_state,
    );

    let addr = config.server_addr();
    tracing::info!("Starting server at http://{}", addr);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    sweeper.abort();

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("Shutdown requested");
}
