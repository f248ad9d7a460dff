//! Write the default configuration file.

use zoomies_common::config::{config_file_path, AppConfig};

pub fn run(force: bool) -> anyhow::Result<()> {
    let path = config_file_path();
    if path.exists() && !force {
        println!("Config already exists: {}", path.display());
        println!("Use --force to overwrite it with defaults.");
        return Ok(());
    }

    let path = AppConfig::default().save()?;
    println!("Wrote default config: {}", path.display());
    Ok(())
}
