//! `mforge config` - show the resolved builder configuration.

use std::path::Path;

use anyhow::Result;
use console::style;

use minerforge_types::config::BuilderConfig;

/// Print where the config was looked up and the values in effect.
pub fn show_config(config: &BuilderConfig, config_path: &Path, json: bool) -> Result<()> {
    if json {
        let out = serde_json::json!({
            "config_path": config_path.display().to_string(),
            "config_exists": config_path.is_file(),
            "config": config,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    let source = if config_path.is_file() {
        style("loaded").green()
    } else {
        style("not found, using defaults").yellow()
    };

    println!();
    println!(
        "  {} {} ({})",
        style("Config:").bold(),
        style(config_path.display()).cyan(),
        source
    );
    println!();
    println!("{}", render_toml(config)?);
    println!(
        "  {} script {}",
        style("→").dim(),
        config.script_path().display()
    );
    println!(
        "  {} artifact {}",
        style("→").dim(),
        config.artifact_path().display()
    );
    println!();

    Ok(())
}

fn render_toml(config: &BuilderConfig) -> Result<String> {
    Ok(toml::to_string_pretty(config)?)
}
