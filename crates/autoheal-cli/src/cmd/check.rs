use autoheal_core::config::{Config, WarnLevel};
use std::path::Path;

pub fn run(config_path: &Path, json: bool) -> anyhow::Result<()> {
    let cfg = Config::load(config_path)?;
    let warnings = cfg.validate();
    let error_count = warnings
        .iter()
        .filter(|w| w.level == WarnLevel::Error)
        .count();

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "actions": cfg.actions.len(),
                "errors": error_count,
                "findings": warnings,
            }))?
        );
    } else {
        for w in &warnings {
            match w.level {
                WarnLevel::Error => eprintln!("error: {}", w.message),
                WarnLevel::Warning => eprintln!("warning: {}", w.message),
            }
        }
        if error_count == 0 {
            println!("config ok: {} action(s)", cfg.actions.len());
        }
    }

    if error_count > 0 {
        anyhow::bail!("config has {error_count} error(s)");
    }
    Ok(())
}
