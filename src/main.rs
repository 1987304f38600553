use std::sync::Arc;

use nug_web::{
    AppState, HandlebarsRenderer, RenderContext, RendererState, RepositoryState,
    StaticRepository,
    config::{AppConfig, Env},
    create_router,
};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Loads configuration and logging, then the theme (configuration, dataset,
/// templates), then serves.
#[tokio::main]
async fn main() {
    // 1. Configuration (fail-fast on missing production secrets).
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging. RUST_LOG wins; APP_LOG_LEVEL sets the fallback for this crate.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("nug_web={},tower_http=info", config.log_level).into()
    });

    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("{} starting in {:?} mode", config.name, config.env);

    // 3. Theme: configuration, demo dataset, templates. Loaded once, read-only afterwards.
    let theme_path = config.theme_path.clone();

    let theme_bytes = std::fs::read(theme_path.join("config/theme.json"))
        .expect("FATAL: failed to read config/theme.json under the theme root.");
    let theme: RenderContext = serde_json::from_slice(&theme_bytes)
        .expect("FATAL: config/theme.json must be a JSON object.");

    let repo = Arc::new(
        StaticRepository::load(theme_path.join("config/demo.json"))
            .expect("FATAL: failed to load config/demo.json under the theme root."),
    ) as RepositoryState;

    let renderer = Arc::new(
        HandlebarsRenderer::load(&theme_path).expect("FATAL: failed to register theme templates."),
    ) as RendererState;

    // 4. Router and server startup.
    let port = config.port;
    let name = config.name.clone();
    let log_level = config.log_level.clone();
    let app = create_router(AppState::new(config, repo, renderer, theme));

    let listener = TcpListener::bind(("0.0.0.0", port))
        .await
        .expect("FATAL: failed to bind the HTTP listener.");

    tracing::info!(
        "Launched {} serving {} on port {} with log level {}",
        name,
        theme_path.display(),
        port,
        log_level
    );

    axum::serve(listener, app)
        .await
        .expect("FATAL: HTTP server terminated unexpectedly.");
}
