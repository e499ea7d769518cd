use autoheal_core::config::Config;
use std::path::Path;

/// Config findings are reported inside build_state: warnings are logged,
/// error-level findings abort startup.
pub fn run(config_path: &Path, bind: Option<String>) -> anyhow::Result<()> {
    let cfg = Config::load(config_path)?;
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(autoheal_server::serve(cfg, bind))
}
