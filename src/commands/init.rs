//! Init command implementation

use crate::config::Config;
use crate::error::{Error, Result};
use std::path::PathBuf;
use tracing::info;

/// Write a default configuration file to `config_path`.
///
/// An existing file is only replaced when `force` is set.
pub fn cmd_init(config_path: PathBuf, force: bool) -> Result<Config> {
    if config_path.exists() && !force {
        return Err(Error::Config(format!(
            "Config already exists at {}. Use --force to overwrite.",
            config_path.display()
        )));
    }

    let config = Config {
        config_file: config_path,
        ..Config::default()
    };
    config.validate()?;
    config.save()?;
    info!("Created config at {:?}", config.config_file);

    Ok(config)
}

/// Print the post-init summary
pub fn print_init(config: &Config) {
    println!("✓ sermon-review initialized");
    println!("  Config: {}", config.config_file.display());
    println!("  Service: {}", config.api_base_url);
    println!("\nNext steps:");
    println!("  sermon-review status                 # Check the review service");
    println!("  sermon-review upload deck.pptx -n …  # Upload a presentation");
    println!("  sermon-review review <sermon-id>     # Review suggested edits");
}
