//! Configuration management.

mod settings;

pub use settings::{
    AppConfig, AppSettings, DataSourceConfig, EngineConfig, LoggingConfig, SettingsError,
};

use config::{Config, ConfigError, Environment, File};
use std::path::Path;

/// Prefix of environment overrides, e.g. `STOCKSTATS__ENGINE__DEFAULT_MINUTES`.
pub const ENV_PREFIX: &str = "STOCKSTATS";

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

/// Load configuration from file and environment.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::from(path).required(true))
        .add_source(environment())
        .build()?;

    config.try_deserialize()
}

/// Load configuration from `path` if given, otherwise from defaults.
///
/// Environment overrides apply either way.
pub fn load_config_or_default(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => Config::builder()
            .add_source(environment())
            .build()?
            .try_deserialize(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn write_config(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "stockstats-config-{}-{}.toml",
            name,
            std::process::id()
        ));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_load_file() {
        let path = write_config(
            "full",
            r#"
[app]
name = "stats-desk"

[logging]
level = "debug"
format = "json"
file = "logs/stockstats.log"

[data_source]
base_url = "http://localhost:8080/evaluation-service"
token_env = "QUOTES_TOKEN"

[engine]
default_minutes = 15
bucket_count = 30
bucket_width_secs = 20
"#,
        );

        let config = load_config(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(config.app.name, "stats-desk");
        assert!(config.logging.is_json());
        assert_eq!(config.logging.file, Some(PathBuf::from("logs/stockstats.log")));
        assert_eq!(config.data_source.token_env, "QUOTES_TOKEN");
        // Unspecified keys keep their defaults.
        assert_eq!(config.data_source.request_timeout_ms, 10_000);
        assert_eq!(config.engine.default_minutes, 15);
        assert_eq!(config.engine.fetch_timeout_ms, 5_000);
        assert_eq!(config.engine.bucket_width_secs, Some(20));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(load_config(Path::new("/definitely/not/here.toml")).is_err());
    }

    #[test]
    fn test_defaults_without_file() {
        let config = load_config_or_default(None).unwrap();
        assert_eq!(config.engine, EngineConfig::default());
        assert_eq!(config.data_source.base_url, DataSourceConfig::default().base_url);
    }

    #[test]
    fn test_environment_override() {
        let path = write_config("env", "[app]\nname = \"from-file\"\n");

        std::env::set_var("STOCKSTATS__APP__ENVIRONMENT", "staging");
        let config = load_config(&path).unwrap();
        std::env::remove_var("STOCKSTATS__APP__ENVIRONMENT");
        fs::remove_file(&path).unwrap();

        assert_eq!(config.app.name, "from-file");
        assert_eq!(config.app.environment, "staging");
    }

    #[test]
    fn test_round_trips_through_toml() {
        let config = AppConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let back: AppConfig = toml::from_str(&text).unwrap();
        assert_eq!(back, config);
    }
}
