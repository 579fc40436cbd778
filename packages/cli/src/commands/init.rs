use crate::config::{default_config, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use folio_extensions::Registry;
use std::fs;
use std::path::Path;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &Path) -> Result<()> {
    let config_path = cwd.join(DEFAULT_CONFIG_NAME);

    if config_path.exists() && !args.force {
        println!("{} {} already exists", "⚠️".yellow(), DEFAULT_CONFIG_NAME.bright_white());
        println!("Use --force to overwrite");
        return Ok(());
    }

    let config = default_config(&Registry::new());
    fs::write(&config_path, serde_json::to_string_pretty(&config)?)?;
    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config;

    #[test]
    fn test_init_writes_loadable_config() {
        let dir = tempfile::tempdir().unwrap();

        init(InitArgs { force: false }, dir.path()).unwrap();
        let loaded = config::load(dir.path(), None).unwrap();

        assert_eq!(loaded.extensions().map(|names| names.len()), Some(Registry::new().len()));
    }

    #[test]
    fn test_init_keeps_existing_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_NAME);
        fs::write(&path, "{}").unwrap();

        init(InitArgs { force: false }, dir.path()).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "{}");

        init(InitArgs { force: true }, dir.path()).unwrap();
        assert_ne!(fs::read_to_string(&path).unwrap(), "{}");
    }
}
