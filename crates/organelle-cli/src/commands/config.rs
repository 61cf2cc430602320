//! Show the effective configuration.

use anyhow::Result;
use colored::Colorize;

use crate::config::{find_config_file, Config};

pub fn run(config: &Config) -> Result<()> {
    let source = std::env::current_dir()
        .ok()
        .and_then(|cwd| find_config_file(&cwd))
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "built-in defaults".to_string());

    println!("{} {}", "Configuration from".white().bold(), source.cyan());
    println!("{}", "═".repeat(40).dimmed());
    print!("{}", config.to_toml()?);
    Ok(())
}
