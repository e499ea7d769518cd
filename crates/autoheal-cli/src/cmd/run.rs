use autoheal_core::config::Config;
use autoheal_core::executor::{ProcessExecutor, Remediator};
use autoheal_core::registry::ActionRegistry;
use autoheal_core::AutohealError;
use std::path::Path;

/// Run one mapped remediation directly — a smoke test for a config entry
/// without going through the webhook.
pub fn run(config_path: &Path, alert: &str, json: bool) -> anyhow::Result<()> {
    let cfg = Config::load(config_path)?;
    let registry = ActionRegistry::from_config(&cfg)?;
    let action = registry
        .lookup(alert)
        .ok_or_else(|| AutohealError::NoActionMapped(alert.to_string()))?;

    let executor = ProcessExecutor::new(cfg.capture.max_output_bytes);
    let started_at = chrono::Utc::now().to_rfc3339();
    let runtime = tokio::runtime::Runtime::new()?;
    let result = runtime.block_on(executor.execute(action))?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "alert": alert,
                "command": action.command,
                "started_at": started_at,
                "exit_code": result.exit_code,
                "timed_out": result.timed_out,
                "duration_ms": result.duration_ms,
                "stdout": result.stdout,
                "stderr": result.stderr,
            }))?
        );
    } else {
        if !result.stdout.is_empty() {
            print!("{}", result.stdout);
        }
        if !result.stderr.is_empty() {
            eprint!("{}", result.stderr);
        }
        println!(
            "{} finished in {}ms (exit: {})",
            alert,
            result.duration_ms,
            result
                .exit_code
                .map_or_else(|| "killed".to_string(), |c| c.to_string())
        );
    }

    if result.timed_out {
        anyhow::bail!("remediation for '{alert}' timed out");
    }
    if result.exit_code != Some(0) {
        anyhow::bail!("remediation for '{alert}' failed");
    }
    Ok(())
}
