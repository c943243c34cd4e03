//! Validate configuration command.

use anyhow::Result;
use std::path::Path;
use stockstats_config::AppConfig;

pub async fn run(config: &AppConfig, config_path: Option<&Path>) -> Result<()> {
    match config_path {
        Some(path) => println!("Validating configuration: {}", path.display()),
        None => println!("Validating built-in defaults with environment overrides"),
    }

    if let Err(e) = config.validate() {
        println!("Configuration error: {}", e);
        return Err(e.into());
    }

    println!("Configuration is valid!");
    println!(
        "API token ({}): {}",
        config.data_source.token_env,
        if config.data_source.token().is_some() { "set" } else { "not set" }
    );
    println!();
    println!("{}", toml::to_string_pretty(config)?);

    Ok(())
}
