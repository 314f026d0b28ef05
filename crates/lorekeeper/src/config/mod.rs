use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use once_cell::sync::Lazy;

pub static DEFAULT_DATA_DIR: Lazy<PathBuf> = Lazy::new(|| {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("lorekeeper")
});

pub const DATABASE_FILE_NAME: &str = "lorekeeper.sqlite";

#[derive(Parser, Debug, Clone)]
#[command(name = "lorekeeper", version, about, long_about = None)]
pub struct Args {
    /// Address the HTTP API listens on
    #[arg(long, env = "LOREKEEPER_BIND_ADDRESS", default_value = "0.0.0.0:3000")]
    pub bind_address: String,

    /// Directory holding the SQLite database
    #[arg(long, env = "LOREKEEPER_DATA_DIR", default_value = DEFAULT_DATA_DIR.to_string_lossy().to_string())]
    pub data_dir: PathBuf,

    #[arg(long, env = "LOREKEEPER_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: Option<String>,

    #[arg(long, env = "GEMINI_MODEL", default_value = "gemini-2.5-flash")]
    pub gemini_model: String,

    #[arg(
        long,
        env = "GEMINI_BASE_URL",
        default_value = "https://generativelanguage.googleapis.com/v1beta"
    )]
    pub gemini_base_url: String,

    /// Timeout for a single generateContent call, in seconds
    #[arg(long, env = "LOREKEEPER_AI_TIMEOUT", default_value_t = 120)]
    pub ai_timeout_seconds: u64,
}

/// Validated runtime settings derived from [`Args`].
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub data_dir: PathBuf,
    pub log_level: String,
    pub gemini: GeminiConfig,
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl Config {
    pub fn from_args(args: Args) -> Result<Self> {
        let bind_address: SocketAddr = args
            .bind_address
            .parse()
            .with_context(|| format!("invalid bind address: {}", args.bind_address))?;
        if args.ai_timeout_seconds == 0 {
            bail!("ai timeout must be at least one second");
        }
        if args.gemini_model.trim().is_empty() {
            bail!("gemini model must not be empty");
        }
        let api_key = args
            .gemini_api_key
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());
        Ok(Self {
            bind_address,
            data_dir: args.data_dir,
            log_level: args.log_level,
            gemini: GeminiConfig {
                api_key,
                model: args.gemini_model.trim().to_string(),
                base_url: args.gemini_base_url.trim_end_matches('/').to_string(),
                timeout: Duration::from_secs(args.ai_timeout_seconds),
            },
        })
    }

    /// Creates the data directory if needed and returns the database path inside it.
    pub fn ensure_database_path(&self) -> Result<PathBuf> {
        if !self.data_dir.exists() {
            std::fs::create_dir_all(&self.data_dir)
                .with_context(|| format!("failed to create data directory {}", self.data_dir.display()))?;
        }
        Ok(self.data_dir.join(DATABASE_FILE_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> Args {
        let mut argv = vec!["lorekeeper"];
        argv.extend_from_slice(extra);
        Args::parse_from(argv)
    }

    #[test]
    fn test_defaults() {
        let args = parse(&["--data-dir", "/tmp/lorekeeper-test", "--gemini-api-key", "  key  "]);
        let config = Config::from_args(args).unwrap();
        assert_eq!(config.bind_address.port(), 3000);
        assert_eq!(config.gemini.model, "gemini-2.5-flash");
        assert_eq!(config.gemini.timeout, Duration::from_secs(120));
        assert_eq!(config.gemini.api_key.as_deref(), Some("key"));
        assert_eq!(
            config.gemini.base_url,
            "https://generativelanguage.googleapis.com/v1beta"
        );
    }

    #[test]
    fn test_blank_api_key_is_unset() {
        let args = parse(&["--gemini-api-key", "   "]);
        let config = Config::from_args(args).unwrap();
        assert!(config.gemini.api_key.is_none());
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(Config::from_args(parse(&["--bind-address", "not-an-address"])).is_err());
        assert!(Config::from_args(parse(&["--ai-timeout-seconds", "0"])).is_err());
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let args = parse(&["--gemini-base-url", "http://localhost:9999/v1beta/"]);
        let config = Config::from_args(args).unwrap();
        assert_eq!(config.gemini.base_url, "http://localhost:9999/v1beta");
    }

    #[test]
    fn test_database_path_created() {
        let dir = std::env::temp_dir().join(format!("lorekeeper-config-{}", std::process::id()));
        let args = parse(&["--data-dir", dir.to_str().unwrap()]);
        let config = Config::from_args(args).unwrap();
        let path = config.ensure_database_path().unwrap();
        assert!(dir.exists());
        assert_eq!(path, dir.join(DATABASE_FILE_NAME));
        let _ = std::fs::remove_dir_all(dir);
    }
}
