use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub engine: EngineConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: Option<u16>,
    pub unix_socket: Option<PathBuf>,
    #[serde(default = "default_num_threads")]
    pub num_threads: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    pub endpoint: String,
    pub api_key: String,
    #[serde(default = "default_engine_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_state_dir")]
    pub state_dir: PathBuf,
    #[serde(default = "default_policy_file")]
    pub policy_file: String,
    #[serde(default = "default_ignore_file")]
    pub ignore_file: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_initial_delay")]
    pub initial_delay_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AdminConfig {
    /// When unset the admin API accepts every request
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default = "default_console")]
    pub console: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            state_dir: default_state_dir(),
            policy_file: default_policy_file(),
            ignore_file: default_ignore_file(),
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            initial_delay_secs: default_initial_delay(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            console: default_console(),
        }
    }
}

// Default value functions
fn default_num_threads() -> usize {
    num_cpus::get()
}

fn default_engine_timeout() -> u64 {
    30
}

fn default_state_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_policy_file() -> String {
    "autoremove.json".to_string()
}

fn default_ignore_file() -> String {
    "autoremove_states.json".to_string()
}

fn default_initial_delay() -> u64 {
    5
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_console() -> bool {
    false
}

impl StorageConfig {
    pub fn policy_path(&self) -> PathBuf {
        self.state_dir.join(&self.policy_file)
    }

    pub fn ignore_path(&self) -> PathBuf {
        self.state_dir.join(&self.ignore_file)
    }
}

impl EngineConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl SchedulerConfig {
    pub fn initial_delay(&self) -> Duration {
        Duration::from_secs(self.initial_delay_secs)
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .context("Failed to parse config file")?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        // Validate server config
        if self.server.port.is_none() && self.server.unix_socket.is_none() {
            bail!("Either port or unix_socket must be specified in server config");
        }

        if let Some(port) = self.server.port {
            if port == 0 {
                bail!("Server port must be greater than 0");
            }
        }

        if self.server.num_threads == 0 {
            bail!("num_threads must be greater than 0");
        }

        // Validate engine config
        if self.engine.endpoint.is_empty() {
            bail!("engine endpoint must not be empty");
        }

        if !self.engine.endpoint.starts_with("http://") && !self.engine.endpoint.starts_with("https://") {
            bail!(
                "engine endpoint '{}' must start with http:// or https://",
                self.engine.endpoint
            );
        }

        if self.engine.api_key.is_empty() {
            bail!("engine api_key must not be empty");
        }

        if self.engine.timeout_secs == 0 {
            bail!("engine timeout_secs must be greater than 0");
        }

        // Validate storage config
        if self.storage.policy_file.is_empty() || self.storage.ignore_file.is_empty() {
            bail!("policy_file and ignore_file must not be empty");
        }

        if self.storage.policy_file == self.storage.ignore_file {
            bail!(
                "policy_file and ignore_file must differ (both are '{}')",
                self.storage.policy_file
            );
        }

        // Validate admin config
        if let Some(key) = &self.admin.api_key {
            if key.is_empty() {
                bail!("admin api_key must not be empty when set; remove it to disable authentication");
            }
        }

        // Validate logging config
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            bail!(
                "Invalid log level '{}'. Must be one of: trace, debug, info, warn, error",
                self.logging.level
            );
        }

        let valid_formats = ["json", "console"];
        if !valid_formats.contains(&self.logging.format.as_str()) {
            bail!(
                "Invalid log format '{}'. Must be one of: json, console",
                self.logging.format
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const MINIMAL: &str = r#"
        [server]
        port = 8113

        [engine]
        endpoint = "http://localhost:8112/api"
        api_key = "engine-key"
    "#;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = Config::from_toml(MINIMAL).unwrap();

        assert_eq!(config.server.port, Some(8113));
        assert!(config.server.num_threads > 0);
        assert_eq!(config.engine.timeout(), Duration::from_secs(30));
        assert_eq!(config.storage.policy_path(), PathBuf::from("./autoremove.json"));
        assert_eq!(config.storage.ignore_path(), PathBuf::from("./autoremove_states.json"));
        assert_eq!(config.scheduler.initial_delay(), Duration::from_secs(5));
        assert!(config.admin.api_key.is_none());
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_full_config() {
        let config = Config::from_toml(
            r#"
            [server]
            unix_socket = "/run/autoremove.sock"
            num_threads = 2

            [engine]
            endpoint = "https://engine.local/api"
            api_key = "k"
            timeout_secs = 10

            [storage]
            state_dir = "/var/lib/autoremove"

            [scheduler]
            initial_delay_secs = 0

            [admin]
            api_key = "admin-key"

            [logging]
            level = "debug"
            format = "console"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, None);
        assert_eq!(config.server.unix_socket, Some(PathBuf::from("/run/autoremove.sock")));
        assert_eq!(config.server.num_threads, 2);
        assert_eq!(config.storage.policy_path(), PathBuf::from("/var/lib/autoremove/autoremove.json"));
        assert_eq!(config.scheduler.initial_delay(), Duration::ZERO);
        assert_eq!(config.admin.api_key.as_deref(), Some("admin-key"));
        assert_eq!(config.logging.format, "console");
    }

    #[test]
    fn test_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, MINIMAL).unwrap();

        assert!(Config::from_file(&path).is_ok());
        assert!(Config::from_file(&temp_dir.path().join("missing.toml")).is_err());
    }

    #[test]
    fn test_requires_listener() {
        let err = Config::from_toml(
            r#"
            [server]
            [engine]
            endpoint = "http://localhost:8112"
            api_key = "k"
            "#,
        )
        .unwrap_err();

        assert!(err.to_string().contains("port or unix_socket"));
    }

    #[test]
    fn test_rejects_bad_engine_endpoint() {
        let err = Config::from_toml(
            r#"
            [server]
            port = 1
            [engine]
            endpoint = "localhost:8112"
            api_key = "k"
            "#,
        )
        .unwrap_err();

        assert!(err.to_string().contains("http://"));
    }

    #[test]
    fn test_rejects_same_document_paths() {
        let err = Config::from_toml(
            r#"
            [server]
            port = 1
            [engine]
            endpoint = "http://localhost:8112"
            api_key = "k"
            [storage]
            policy_file = "state.json"
            ignore_file = "state.json"
            "#,
        )
        .unwrap_err();

        assert!(err.to_string().contains("must differ"));
    }

    #[test]
    fn test_rejects_empty_admin_key() {
        let config = Config::from_toml(&format!("{}\n[admin]\napi_key = \"\"\n", MINIMAL));
        assert!(config.is_err());
    }

    #[test]
    fn test_rejects_bad_log_level() {
        let config = Config::from_toml(&format!("{}\n[logging]\nlevel = \"loud\"\n", MINIMAL));
        assert!(config.is_err());
    }
}
