mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;
use strictdown_config::{Config, Flavor};
use strictdown_engine::{Options, convert};

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    let config = apply_flags(config, &cli);
    config.validate()?;

    if cli.init_config {
        let path = cli.config.clone().unwrap_or_else(Config::config_path);
        config
            .save_to_path(&path)
            .with_context(|| format!("Failed to write config file at {}", path.display()))?;
        eprintln!("Wrote {}", path.display());
        return Ok(());
    }

    let reader: Box<dyn Read> = match &cli.input {
        Some(path) => Box::new(
            File::open(path).with_context(|| format!("Failed to open {}", path.display()))?,
        ),
        None => Box::new(io::stdin().lock()),
    };
    let writer: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
        )),
        None => Box::new(io::stdout().lock()),
    };

    let name = cli
        .input
        .as_deref()
        .map_or_else(|| "<stdin>".to_string(), |p| p.display().to_string());
    convert(reader, writer, &Options::from(&config))
        .with_context(|| format!("Failed to convert {name}"))?;
    log::info!("converted {name}");
    Ok(())
}

/// Explicit path first, then the default location, then built-in defaults.
fn load_config(path: Option<&Path>) -> Result<Config> {
    let loaded = match path {
        Some(path) => {
            let config = Config::load_from_path(path)?;
            if config.is_none() {
                log::warn!("config file {} not found, using defaults", path.display());
            }
            config
        }
        None => Config::load()?,
    };
    Ok(loaded.unwrap_or_default())
}

fn apply_flags(mut config: Config, cli: &Cli) -> Config {
    if cli.xhtml {
        config.flavor = Flavor::Xhtml;
    }
    if let Some(chunk_size) = cli.chunk_size {
        config.chunk_size = usize::try_from(chunk_size).unwrap_or(usize::MAX);
    }
    if let Some(max) = cli.max_tape_entries {
        config.max_tape_entries = usize::try_from(max).unwrap_or(usize::MAX);
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn flags_override_config() {
        let cli = Cli::parse_from([
            "strictdown",
            "in.md",
            "--xhtml",
            "--chunk-size",
            "16",
            "--max-tape-entries",
            "128",
        ]);
        let config = apply_flags(Config::default(), &cli);
        assert_eq!(config.flavor, Flavor::Xhtml);
        assert_eq!(config.chunk_size, 16);
        assert_eq!(config.max_tape_entries, 128);
        assert_eq!(
            Options::from(&config).flavor,
            strictdown_engine::Flavor::Xhtml
        );
    }

    #[test]
    fn tape_ceiling_below_minimum_is_rejected() {
        assert!(Cli::try_parse_from(["strictdown", "--max-tape-entries", "10"]).is_err());
        assert!(Cli::try_parse_from(["strictdown", "--chunk-size", "0"]).is_err());
    }

    #[test]
    fn missing_explicit_config_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = load_config(Some(&dir.path().join("missing.toml"))).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn explicit_config_is_loaded() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "flavor = \"xhtml\"\nchunk_size = 3\n").unwrap();
        let config = load_config(Some(&path)).unwrap();
        let options = Options::from(&config);
        assert_eq!(options.flavor, strictdown_engine::Flavor::Xhtml);
        assert_eq!(options.chunk_size, 3);
    }
}
