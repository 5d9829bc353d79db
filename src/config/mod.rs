use crate::utils::error::{AppError, Result};
use crate::utils::validation::{validate_range, validate_url, Validate};
use clap::Parser;
use std::env;
use std::path::{Path, PathBuf};

pub const DEFAULT_PORT: u16 = 8080;

const MONGO_SCHEMES: &[&str] = &["mongodb", "mongodb+srv"];

#[derive(Debug, Clone, Parser)]
#[command(name = "template-base")]
#[command(about = "REST backend that runs as an HTTP server or behind a Lambda function URL")]
pub struct CliArgs {
    #[arg(long, help = "Listen port, overrides the PORT environment variable")]
    pub port: Option<u16>,

    #[arg(long, help = "Environment file to load before startup (default: ./.env)")]
    pub env_file: Option<PathBuf>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

/// Loads `path`, or `.env` searched from the working directory upwards.
///
/// Variables already set in the process win. A missing file is not an error;
/// a file that cannot be parsed is.
pub fn load_env_file(path: Option<&Path>) -> Result<Option<PathBuf>> {
    let loaded = match path {
        Some(path) => dotenvy::from_path(path).map(|()| path.to_path_buf()),
        None => dotenvy::dotenv(),
    };

    match loaded {
        Ok(path) => Ok(Some(path)),
        Err(e) if e.not_found() => Ok(None),
        Err(e) => Err(AppError::ConfigError {
            message: format!("failed to load environment file: {}", e),
        }),
    }
}

/// Connection settings handed to the storage collaborator untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageConfig {
    pub uri: Option<String>,
    pub database: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    pub environment: Option<String>,
    pub storage: StorageConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            environment: None,
            storage: StorageConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let port = match non_empty("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|e| AppError::ConfigError {
                message: format!("PORT must be a port number, got '{}': {}", raw, e),
            })?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            port,
            environment: non_empty("ENV"),
            storage: StorageConfig {
                uri: non_empty("MONGO_URI"),
                database: non_empty("DB_NAME"),
            },
        })
    }

    pub fn with_port_override(mut self, port: Option<u16>) -> Self {
        if let Some(port) = port {
            self.port = port;
        }
        self
    }

    pub fn environment_label(&self) -> &str {
        self.environment.as_deref().unwrap_or("unset")
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validate_range("port", self.port, 1, u16::MAX)?;

        if let Some(uri) = &self.storage.uri {
            validate_url("mongo_uri", uri, MONGO_SCHEMES)?;
        }

        tracing::debug!("✅ Configuration validation passed");
        Ok(())
    }
}
