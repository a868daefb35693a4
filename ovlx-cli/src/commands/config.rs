//! Config command implementation - print or write configuration

use anyhow::Result;
use std::path::PathBuf;

use crate::config::Config;

pub fn execute(config: &Config, example: bool, output: Option<PathBuf>) -> Result<()> {
    if example {
        print!("{}", Config::example_toml()?);
        return Ok(());
    }

    match output {
        Some(path) => {
            config.save_to_file(&path)?;
            log::info!("Configuration written to {}", path.display());
        }
        None => {
            print!("{}", toml::to_string_pretty(config)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_effective_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ovlx.toml");
        let mut config = Config::default();
        config.sketch.w = 5;

        execute(&config, false, Some(path.clone())).unwrap();
        assert_eq!(Config::load_from_file(&path).unwrap(), config);
    }
}
