use std::{env, path::PathBuf};

/// Fallback signing secret for local runs and tests. Never accepted in production.
const LOCAL_SECRET: &str = "super-secure-test-secret-value-local";

/// AppConfig
///
/// Holds the process configuration. Loaded once at startup and never mutated,
/// then pulled into handlers through `FromRef`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Controls log format and secret strictness.
    pub env: Env,
    // Application name, reported by the health check and used in startup logs.
    pub name: String,
    // Default log level when RUST_LOG is not set.
    pub log_level: String,
    // TCP port the HTTP server binds to.
    pub port: u16,
    // Secret used to sign and verify session tokens.
    pub jwt_secret: String,
    // Theme root: templates, static assets and the config/ directory.
    pub theme_path: PathBuf,
}

/// Env
///
/// Runtime context. `Local` favours readable logs and tolerates a fallback
/// secret; `Production` demands an explicit secret and emits JSON logs.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Env {
    pub fn as_str(&self) -> &'static str {
        match self {
            Env::Local => "local",
            Env::Production => "production",
        }
    }
}

impl Default for AppConfig {
    /// Non-panicking configuration for test state scaffolding.
    fn default() -> Self {
        Self {
            env: Env::Local,
            name: "nug".to_string(),
            log_level: "info".to_string(),
            port: 3000,
            jwt_secret: LOCAL_SECRET.to_string(),
            theme_path: PathBuf::from("theme"),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables.
    ///
    /// # Panics
    /// Panics when `APP_SECRET` is missing in production, or when `APP_PORT`
    /// is not a valid port number. The server must not start half-configured.
    pub fn load() -> Self {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        let jwt_secret = match env {
            Env::Production => {
                env::var("APP_SECRET").expect("FATAL: APP_SECRET must be set in production.")
            }
            Env::Local => env::var("APP_SECRET").unwrap_or_else(|_| LOCAL_SECRET.to_string()),
        };

        let port = match env::var("APP_PORT") {
            Ok(raw) => raw
                .parse()
                .expect("FATAL: APP_PORT must be a valid port number."),
            Err(_) => 3000,
        };

        Self {
            env,
            name: env::var("APP_NAME").unwrap_or_else(|_| "nug".to_string()),
            log_level: env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            port,
            jwt_secret,
            theme_path: env::var("THEME_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("theme")),
        }
    }
}
