//! Initialize a new Organelle project.

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};

use crate::config::{Config, CONFIG_FILE};

pub fn run(path: Option<String>) -> Result<()> {
    let base_path = match path {
        Some(p) => Path::new(&p).to_path_buf(),
        None => std::env::current_dir().context("Failed to read current directory")?,
    };

    println!("{} Initializing Organelle project...", "→".blue());
    match write_default_config(&base_path)? {
        Some(config_path) => println!("  {} Created {}", "✓".green(), config_path.display()),
        None => println!(
            "  {} {} already exists",
            "•".yellow(),
            base_path.join(CONFIG_FILE).display()
        ),
    }

    println!();
    println!("Next steps:");
    println!("  {} organelle inspect <snapshot>", "1.".blue());
    println!("  {} organelle transcode <snapshot> --to json", "2.".blue());

    Ok(())
}

/// Write a default organelle.toml into `base_path` unless one exists.
/// Returns the path written.
pub fn write_default_config(base_path: &Path) -> Result<Option<PathBuf>> {
    std::fs::create_dir_all(base_path)
        .with_context(|| format!("Failed to create {}", base_path.display()))?;

    let config_path = base_path.join(CONFIG_FILE);
    if config_path.exists() {
        return Ok(None);
    }
    Config::default().save(&config_path)?;
    Ok(Some(config_path))
}
