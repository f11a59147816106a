use std::env;
use std::fmt;
use std::path::PathBuf;
use validator::Validate;

const DEFAULT_DATABASE_URL: &str = "sqlite://tuneful.db";
const DEFAULT_UPLOAD_PATH: &str = "uploads";
const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:8080";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

#[derive(Debug, Clone, Validate)]
pub struct Config {
    #[validate(length(min = 1))]
    pub database_url: String,
    pub upload_path: PathBuf,
    #[validate(length(min = 1))]
    pub bind_address: String,
    #[validate(range(min = 1))]
    pub max_upload_bytes: usize,
}

#[derive(Debug)]
pub struct ConfigError(String);

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Configuration Error: {}", self.0)
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    /// Reads the configuration from the process environment, falling back to
    /// defaults for anything unset. Call `dotenv()` first to pick up `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let max_upload_bytes = match env::var("MAX_UPLOAD_BYTES") {
            Ok(raw) => raw
                .parse::<usize>()
                .map_err(|_| ConfigError(format!("MAX_UPLOAD_BYTES must be a byte count, got {:?}", raw)))?,
            Err(_) => DEFAULT_MAX_UPLOAD_BYTES,
        };

        let config = Config {
            database_url: env_or("DATABASE_URL", DEFAULT_DATABASE_URL),
            upload_path: PathBuf::from(env_or("UPLOAD_PATH", DEFAULT_UPLOAD_PATH)),
            bind_address: env_or("BIND_ADDRESS", DEFAULT_BIND_ADDRESS),
            max_upload_bytes,
        };
        config.check()?;
        Ok(config)
    }

    pub fn check(&self) -> Result<(), ConfigError> {
        self.validate().map_err(|err| ConfigError(err.to_string()))?;
        if self.upload_path.as_os_str().is_empty() {
            return Err(ConfigError("UPLOAD_PATH cannot be empty".to_string()));
        }
        Ok(())
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
