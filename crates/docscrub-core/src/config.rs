//! Configuration module
//!
//! Configuration is read from the environment (optionally seeded from a `.env`
//! file). Every setting has a default so the service starts with no
//! configuration at all, next to a `qpdf` binary on `PATH`.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

const SERVER_PORT: u16 = 1999;
const TOOL_TIMEOUT_SECS: u64 = 60;
const MAX_CONCURRENT_JOBS: usize = 4;
const MAX_UPLOAD_SIZE_MB: usize = 50;
const HTTP_CONCURRENCY_LIMIT: usize = 1024;

/// HTTP server settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    pub http_concurrency_limit: usize,
    pub log_format: String,
}

/// External tool and scratch storage settings
#[derive(Clone, Debug)]
pub struct ToolConfig {
    pub qpdf_path: String,
    pub tool_timeout_secs: u64,
    pub max_concurrent_jobs: usize,
    pub max_upload_size_bytes: usize,
    /// Directory temporary resources are created in. `None` means the OS temp dir.
    pub scratch_dir: Option<PathBuf>,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub base: BaseConfig,
    pub tool: ToolConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup. `from_env` passes the
    /// process environment; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let cors_origins: Vec<String> = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let max_upload_size_mb: usize =
            parse_number(&lookup, "MAX_UPLOAD_SIZE_MB", MAX_UPLOAD_SIZE_MB)?;
        let max_upload_size_bytes = max_upload_size_mb
            .checked_mul(1024 * 1024)
            .ok_or_else(|| anyhow::anyhow!("MAX_UPLOAD_SIZE_MB is too large"))?;

        let base = BaseConfig {
            server_port: parse_number(&lookup, "PORT", SERVER_PORT)?,
            cors_origins,
            environment,
            http_concurrency_limit: parse_number(
                &lookup,
                "HTTP_CONCURRENCY_LIMIT",
                HTTP_CONCURRENCY_LIMIT,
            )?,
            log_format: lookup("LOG_FORMAT")
                .unwrap_or_else(|| "text".to_string())
                .to_lowercase(),
        };

        let tool = ToolConfig {
            qpdf_path: lookup("QPDF_PATH").unwrap_or_else(|| "qpdf".to_string()),
            tool_timeout_secs: parse_number(&lookup, "TOOL_TIMEOUT_SECS", TOOL_TIMEOUT_SECS)?,
            max_concurrent_jobs: parse_number(&lookup, "MAX_CONCURRENT_JOBS", MAX_CONCURRENT_JOBS)?,
            max_upload_size_bytes,
            scratch_dir: lookup("SCRATCH_DIR")
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
        };

        let config = Config { base, tool };
        config.validate()?;
        Ok(config)
    }

    /// Configuration for tests: a specific tool binary and scratch directory,
    /// defaults for everything else.
    pub fn for_tests(qpdf_path: impl Into<String>, scratch_dir: impl Into<PathBuf>) -> Self {
        Config {
            base: BaseConfig {
                server_port: 0,
                cors_origins: vec!["*".to_string()],
                environment: "test".to_string(),
                http_concurrency_limit: HTTP_CONCURRENCY_LIMIT,
                log_format: "text".to_string(),
            },
            tool: ToolConfig {
                qpdf_path: qpdf_path.into(),
                tool_timeout_secs: 10,
                max_concurrent_jobs: MAX_CONCURRENT_JOBS,
                max_upload_size_bytes: MAX_UPLOAD_SIZE_MB * 1024 * 1024,
                scratch_dir: Some(scratch_dir.into()),
            },
        }
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.is_production() && self.base.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }
        if self.tool.qpdf_path.trim().is_empty() {
            return Err(anyhow::anyhow!("QPDF_PATH cannot be empty"));
        }
        if self.tool.tool_timeout_secs == 0 {
            return Err(anyhow::anyhow!("TOOL_TIMEOUT_SECS must be greater than 0"));
        }
        if self.tool.max_concurrent_jobs == 0 {
            return Err(anyhow::anyhow!("MAX_CONCURRENT_JOBS must be greater than 0"));
        }
        if self.tool.max_upload_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_UPLOAD_SIZE_MB must be greater than 0"));
        }
        if self.base.http_concurrency_limit == 0 {
            return Err(anyhow::anyhow!("HTTP_CONCURRENCY_LIMIT must be greater than 0"));
        }
        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.base.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn server_port(&self) -> u16 {
        self.base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.base.environment
    }

    pub fn http_concurrency_limit(&self) -> usize {
        self.base.http_concurrency_limit
    }

    pub fn log_format(&self) -> &str {
        &self.base.log_format
    }

    pub fn qpdf_path(&self) -> &str {
        &self.tool.qpdf_path
    }

    pub fn tool_timeout(&self) -> Duration {
        Duration::from_secs(self.tool.tool_timeout_secs)
    }

    pub fn max_concurrent_jobs(&self) -> usize {
        self.tool.max_concurrent_jobs
    }

    pub fn max_upload_size_bytes(&self) -> usize {
        self.tool.max_upload_size_bytes
    }

    pub fn scratch_dir(&self) -> PathBuf {
        self.tool
            .scratch_dir
            .clone()
            .unwrap_or_else(env::temp_dir)
    }
}

/// Unset means `default`; a value that does not parse is a configuration error.
fn parse_number<F, T>(lookup: &F, key: &str, default: T) -> Result<T, anyhow::Error>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("{} must be a valid number, got '{}'", key, raw)),
        None => Ok(default),
    }
}
