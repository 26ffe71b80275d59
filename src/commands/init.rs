use anyhow::{Context, Result};
use docprep::config::{Config, DEFAULT_CONFIG_FILE};
use std::path::PathBuf;

const HEADER: &str = "# docprep configuration\n#\n# Every section is optional; missing keys take the defaults below.\n\n";

/// Write a default configuration file into `path`
pub fn init_config(path: PathBuf) -> Result<()> {
    let config_path = path.join(DEFAULT_CONFIG_FILE);
    if config_path.exists() {
        anyhow::bail!("{} already exists", config_path.display());
    }

    std::fs::create_dir_all(&path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    let content = format!("{}{}", HEADER, Config::default().to_toml()?);
    std::fs::write(&config_path, content)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    println!("Created configuration file: {}", config_path.display());

    Ok(())
}
