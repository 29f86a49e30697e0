use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::workflows::DEFAULT_STAGES;

/// Name of the configuration file looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "workshop-yard.toml";

/// Main configuration structure for the workshop yard board
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkshopYardConfig {
    /// Persistence store settings
    pub database: DatabaseConfig,
    /// Board refresh cache settings
    pub cache: CacheConfig,
    /// Ordered workflow stages
    pub workflow: WorkflowConfig,
    /// Retry policy for a busy store
    pub retry: RetryConfig,
    /// Logging settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// SQLite file path or `sqlite:` connection string
    pub path: String,
    /// How long a writer waits for the store lock before giving up
    pub busy_timeout_ms: u64,
    /// Maximum connections in pool
    pub max_connections: u32,
    /// Apply schema migrations on open
    pub auto_migrate: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Lifetime of a board snapshot; 0 disables caching
    pub ttl_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkflowConfig {
    /// Stage names in workflow order; the last one is terminal
    pub statuses: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetryConfig {
    /// Retries after the first busy failure
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Default log level when RUST_LOG is unset
    pub log_level: String,
    /// Emit JSON log lines instead of human-readable ones
    pub json_logs: bool,
}

impl Default for WorkshopYardConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                path: "workshop-yard.db".to_string(),
                busy_timeout_ms: 20_000,
                max_connections: 5,
                auto_migrate: true,
            },
            cache: CacheConfig { ttl_seconds: 15 },
            workflow: WorkflowConfig {
                statuses: DEFAULT_STAGES.iter().map(|s| s.to_string()).collect(),
            },
            retry: RetryConfig {
                max_retries: 3,
                base_delay_ms: 100,
                max_delay_ms: 2_000,
            },
            observability: ObservabilityConfig {
                log_level: "info".to_string(),
                json_logs: false,
            },
        }
    }
}

impl DatabaseConfig {
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Option<Duration> {
        (self.ttl_seconds > 0).then(|| Duration::from_secs(self.ttl_seconds))
    }
}

impl WorkshopYardConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration file (`explicit_path`, or workshop-yard.toml when present)
    /// 3. Environment variables (WORKSHOP_YARD__SECTION__KEY)
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        match explicit_path {
            Some(path) => {
                builder = builder.add_source(File::from(path.to_path_buf()).required(true));
            }
            None => {
                if Path::new(CONFIG_FILE_NAME).exists() {
                    builder = builder.add_source(File::from(PathBuf::from(CONFIG_FILE_NAME)));
                }
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("WORKSHOP_YARD")
                .prefix_separator("__")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("workflow.statuses")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_match_board_behaviour() {
        let config = WorkshopYardConfig::default();
        assert_eq!(config.cache.ttl(), Some(Duration::from_secs(15)));
        assert_eq!(config.database.busy_timeout(), Duration::from_secs(20));
        assert_eq!(config.workflow.statuses.len(), DEFAULT_STAGES.len());
        assert_eq!(config.workflow.statuses.last().map(String::as_str), Some("completed"));
    }

    #[test]
    fn test_zero_ttl_disables_cache() {
        let cache = CacheConfig { ttl_seconds: 0 };
        assert_eq!(cache.ttl(), None);
    }

    #[test]
    fn test_load_from_explicit_file_overrides_defaults() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("board.toml");
        std::fs::write(
            &path,
            r#"
[database]
path = "/srv/yard/orders.db"

[cache]
ttl_seconds = 30

[workflow]
statuses = ["queued", "working", "done"]
"#,
        )?;

        let config = WorkshopYardConfig::load(Some(&path))?;
        assert_eq!(config.database.path, "/srv/yard/orders.db");
        assert_eq!(config.database.busy_timeout_ms, 20_000);
        assert_eq!(config.cache.ttl_seconds, 30);
        assert_eq!(config.workflow.statuses, vec!["queued", "working", "done"]);
        Ok(())
    }

    #[test]
    fn test_save_and_reload_round_trip() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("saved.toml");

        let mut config = WorkshopYardConfig::default();
        config.retry.max_retries = 7;
        config.save_to_file(&path)?;

        let reloaded = WorkshopYardConfig::load(Some(&path))?;
        assert_eq!(reloaded.retry.max_retries, 7);
        assert_eq!(reloaded.workflow.statuses, config.workflow.statuses);
        Ok(())
    }

    #[test]
    fn test_environment_overrides_file() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("board.toml");
        std::fs::write(&path, "[observability]\nlog_level = \"warn\"\n")?;

        std::env::set_var("WORKSHOP_YARD__OBSERVABILITY__JSON_LOGS", "true");
        let config = WorkshopYardConfig::load(Some(&path));
        std::env::remove_var("WORKSHOP_YARD__OBSERVABILITY__JSON_LOGS");

        let config = config?;
        assert_eq!(config.observability.log_level, "warn");
        assert!(config.observability.json_logs);
        Ok(())
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let result = WorkshopYardConfig::load(Some(Path::new("/nonexistent/yard.toml")));
        assert!(result.is_err());
    }
}
