use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub kitchen: KitchenConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub http_server: HttpServerConfig,
}

/// Deployment the server runs in; reported by `GET /`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Environment {
    Prod,
    #[default]
    Dev,
    Test,
    CiTest,
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Environment::Prod => "PROD",
            Environment::Dev => "DEV",
            Environment::Test => "TEST",
            Environment::CiTest => "CI_TEST",
        };
        f.write_str(name)
    }
}

/// Kitchen-specific configuration
#[derive(Debug, Clone, Deserialize)]
pub struct KitchenConfig {
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
    #[serde(default)]
    pub environment: Environment,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for KitchenConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            environment: Environment::default(),
            log_level: default_log_level(),
        }
    }
}

/// Schema and demo data
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_migrations_dir")]
    pub migrations_dir: PathBuf,
    /// Load the seed files at startup when the graph is empty
    #[serde(default)]
    pub auto_populate: bool,
    #[serde(default = "default_seed_dir")]
    pub seed_dir: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            migrations_dir: default_migrations_dir(),
            auto_populate: false,
            seed_dir: default_seed_dir(),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct HttpServerConfig {
    #[serde(default = "default_http_host")]
    pub host: String,
    #[serde(default = "default_http_port")]
    pub port: u16,
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: default_http_host(),
            port: default_http_port(),
            allowed_origins: default_allowed_origins(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("kitchen.db")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_migrations_dir() -> PathBuf {
    PathBuf::from("migrations")
}

fn default_seed_dir() -> PathBuf {
    PathBuf::from("seed")
}

fn default_http_host() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    3000
}

fn default_allowed_origins() -> Vec<String> {
    // Empty means any origin
    vec![]
}

const LOG_LEVELS: &[&str] = &["off", "error", "warn", "info", "debug", "trace"];

impl Config {
    /// Load configuration from file
    ///
    /// Loads environment variables from .env file (if present) before loading config.
    /// Looks for config file in this order:
    /// 1. Path specified in KITCHEN_CONFIG environment variable
    /// 2. ./config.toml in current directory
    ///
    /// The `PORT` environment variable overrides `http_server.port`.
    pub fn load() -> Result<Self> {
        let _ = dotenv::dotenv();

        let config_path = std::env::var("KITCHEN_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config.toml"));

        let config_str = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let mut config = Self::from_toml(&config_str)?;

        if let Ok(port) = std::env::var("PORT") {
            config.http_server.port = port
                .trim()
                .parse()
                .with_context(|| format!("PORT must be a valid port number, got '{}'", port))?;
        }

        config.validate()?;

        Ok(config)
    }

    /// Parse configuration text without touching the environment
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config.toml")
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.kitchen.db_path.as_os_str().is_empty() {
            anyhow::bail!("kitchen.db_path must not be empty");
        }

        let level = self.kitchen.log_level.to_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            anyhow::bail!(
                "kitchen.log_level must be one of {}, got '{}'",
                LOG_LEVELS.join(", "),
                self.kitchen.log_level
            );
        }

        if self.http_server.port == 0 {
            anyhow::bail!("http_server.port must be greater than 0");
        }

        Ok(())
    }

    /// Get database path
    pub fn db_path(&self) -> &Path {
        &self.kitchen.db_path
    }

    pub fn environment(&self) -> Environment {
        self.kitchen.environment
    }
}
