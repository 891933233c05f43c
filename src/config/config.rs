use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Leaderboard backend selector.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Hosted PostgREST-compatible table API
    #[default]
    Rest,
    /// Direct PostgreSQL connection
    Postgres,
    /// Process-local table, lost on exit
    Memory,
}

/// Leaderboard data-store configuration.
///
/// `url` and `key` are the only two options the hosted store needs:
/// - Rest: project endpoint and API key
/// - Postgres: connection string and password
#[derive(Debug, Deserialize, Clone)]
pub struct StoreSettings {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub backend: StoreBackend,
    #[serde(default = "default_table")]
    pub table: String,
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,
}

fn default_table() -> String {
    "leaderboard".to_string()
}

fn default_pool_size() -> usize {
    4
}

/// Chain access and the fixed scoring inputs of the tracked token.
#[derive(Debug, Deserialize, Clone)]
pub struct ChainSettings {
    pub rpc_url: String,
    pub token_address: String,
    /// Liquidity pool holding; never scored, never ranked
    pub pool_address: String,
    /// Block from which holding time is counted
    #[serde(default)]
    pub start_block: u64,
}

/// Leaderboard refresh cycle configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct RefreshSettings {
    #[serde(default = "default_refresh_interval")]
    pub interval_secs: u64,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            interval_secs: default_refresh_interval(),
            top_n: default_top_n(),
        }
    }
}

fn default_refresh_interval() -> u64 {
    6 * 60 * 60 // 6 hours
}

fn default_top_n() -> usize {
    10
}

/// Root application configuration.
///
/// Loaded from an optional `config.{yaml,toml}` file, overridden by
/// `HOLDSCORE__SECTION__KEY` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub store: StoreSettings,
    pub chain: ChainSettings,
    #[serde(default)]
    pub refresh: RefreshSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::with_name("config").required(false))
            .add_source(
                Environment::with_prefix("HOLDSCORE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Self::from_config(s)
    }

    pub fn from_config(config: Config) -> Result<Self, ConfigError> {
        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;

        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.store.backend != StoreBackend::Memory && self.store.url.trim().is_empty() {
            return Err(ConfigError::Message(
                "store.url is required for the rest and postgres backends".to_string(),
            ));
        }

        // Table name is interpolated into SQL and URLs
        let valid_table = !self.store.table.is_empty()
            && self
                .store
                .table
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
        if !valid_table {
            return Err(ConfigError::Message(format!(
                "store.table must be a plain lowercase identifier, got {:?}",
                self.store.table
            )));
        }

        if self.refresh.interval_secs == 0 {
            return Err(ConfigError::Message(
                "refresh.interval_secs must be positive".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn load(yaml: &str) -> Result<Settings, ConfigError> {
        let config = Config::builder()
            .add_source(File::from_str(yaml, FileFormat::Yaml))
            .build()?;
        Settings::from_config(config)
    }

    const CHAIN: &str = r#"
chain:
  rpc_url: "http://localhost:8545"
  token_address: "0x1111111111111111111111111111111111111111"
  pool_address: "0x2222222222222222222222222222222222222222"
  start_block: 100
"#;

    #[test]
    fn test_defaults_applied() {
        let yaml = format!(
            "store:\n  url: \"https://example.supabase.co\"\n  key: \"anon\"\n{}",
            CHAIN
        );
        let settings = load(&yaml).unwrap();

        assert_eq!(settings.store.backend, StoreBackend::Rest);
        assert_eq!(settings.store.table, "leaderboard");
        assert_eq!(settings.refresh.interval_secs, 21_600);
        assert_eq!(settings.refresh.top_n, 10);
        assert_eq!(settings.chain.start_block, 100);
    }

    #[test]
    fn test_rest_backend_requires_url() {
        let yaml = format!("store:\n  key: \"anon\"\n{}", CHAIN);
        assert!(load(&yaml).is_err());
    }

    #[test]
    fn test_memory_backend_without_url() {
        let yaml = format!("store:\n  backend: memory\n{}", CHAIN);
        let settings = load(&yaml).unwrap();
        assert_eq!(settings.store.backend, StoreBackend::Memory);
    }

    #[test]
    fn test_rejects_unsafe_table_name() {
        let yaml = format!(
            "store:\n  backend: memory\n  table: \"scores; drop table x\"\n{}",
            CHAIN
        );
        assert!(load(&yaml).is_err());
    }
}
