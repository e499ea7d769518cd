use crate::error::{AutohealError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// ServerConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String {
    "0.0.0.0:5001".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

// ---------------------------------------------------------------------------
// CaptureConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Per-stream ceiling on captured remediation output, in bytes.
    /// Output past the ceiling is dropped and a truncation marker appended.
    #[serde(default = "default_max_output_bytes")]
    pub max_output_bytes: usize,
}

fn default_max_output_bytes() -> usize {
    64 * 1024
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            max_output_bytes: default_max_output_bytes(),
        }
    }
}

// ---------------------------------------------------------------------------
// ActionConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionConfig {
    /// Alert name this action remediates (Alertmanager `labels.alertname`).
    pub alert: String,
    /// Command as argv. Never passed through a shell.
    pub command: Vec<String>,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_timeout_seconds() -> u64 {
    60
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub actions: Vec<ActionConfig>,
}

fn default_version() -> u32 {
    1
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(AutohealError::ConfigNotFound(path.display().to_string()));
        }
        let data = std::fs::read_to_string(path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    /// Check the action table. Error-level findings make the registry refuse
    /// to load; warning-level findings (executable not on PATH) are advisory
    /// because the validating host may not be the serving host.
    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        let mut seen = HashSet::new();

        for action in &self.actions {
            if action.alert.trim().is_empty() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: "action with an empty alert name".to_string(),
                });
                continue;
            }

            if !seen.insert(action.alert.as_str()) {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("duplicate action for alert '{}'", action.alert),
                });
            }

            if action.command.is_empty() || action.command[0].trim().is_empty() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("action '{}' has an empty command", action.alert),
                });
            } else if which::which(&action.command[0]).is_err() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!(
                        "action '{}': executable '{}' not found on PATH",
                        action.alert, action.command[0]
                    ),
                });
            }

            if action.timeout_seconds == 0 {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("action '{}' has timeout_seconds: 0", action.alert),
                });
            }
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn action(alert: &str, command: &[&str], timeout: u64) -> ActionConfig {
        ActionConfig {
            alert: alert.to_string(),
            command: command.iter().map(|s| s.to_string()).collect(),
            timeout_seconds: timeout,
        }
    }

    #[test]
    fn config_yaml_roundtrip() {
        let cfg = Config {
            version: 1,
            server: ServerConfig::default(),
            capture: CaptureConfig::default(),
            actions: vec![action("NginxDown", &["systemctl", "restart", "nginx"], 30)],
        };
        let yaml = serde_yaml::to_string(&cfg).unwrap();
        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.actions.len(), 1);
        assert_eq!(parsed.actions[0].alert, "NginxDown");
        assert_eq!(parsed.actions[0].timeout_seconds, 30);
    }

    #[test]
    fn defaults_applied_when_fields_omitted() {
        let yaml = "actions:\n  - alert: MySQLDown\n    command: [\"true\"]\n";
        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.version, 1);
        assert_eq!(cfg.server.bind, "0.0.0.0:5001");
        assert_eq!(cfg.capture.max_output_bytes, 64 * 1024);
        assert_eq!(cfg.actions[0].timeout_seconds, 60);
    }

    #[test]
    fn empty_config_has_no_actions() {
        let cfg: Config = serde_yaml::from_str("version: 1\n").unwrap();
        assert!(cfg.actions.is_empty());
        assert!(cfg.validate().is_empty());
    }

    #[test]
    fn validate_duplicate_alert_is_error() {
        let cfg = Config {
            version: 1,
            server: ServerConfig::default(),
            capture: CaptureConfig::default(),
            actions: vec![
                action("NginxDown", &["true"], 30),
                action("NginxDown", &["false"], 30),
            ],
        };
        let warnings = cfg.validate();
        assert!(warnings
            .iter()
            .any(|w| w.level == WarnLevel::Error && w.message.contains("duplicate")));
    }

    #[test]
    fn validate_empty_command_is_error() {
        let cfg = Config {
            version: 1,
            server: ServerConfig::default(),
            capture: CaptureConfig::default(),
            actions: vec![action("NginxDown", &[], 30)],
        };
        let warnings = cfg.validate();
        assert!(warnings
            .iter()
            .any(|w| w.level == WarnLevel::Error && w.message.contains("empty command")));
    }

    #[test]
    fn validate_zero_timeout_is_error() {
        let cfg = Config {
            version: 1,
            server: ServerConfig::default(),
            capture: CaptureConfig::default(),
            actions: vec![action("NginxDown", &["true"], 0)],
        };
        let warnings = cfg.validate();
        assert!(warnings
            .iter()
            .any(|w| w.level == WarnLevel::Error && w.message.contains("timeout_seconds: 0")));
    }

    #[test]
    fn validate_missing_executable_is_warning_only() {
        let cfg = Config {
            version: 1,
            server: ServerConfig::default(),
            capture: CaptureConfig::default(),
            actions: vec![action("NginxDown", &["__no_such_binary_xyz__"], 30)],
        };
        let warnings = cfg.validate();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].level, WarnLevel::Warning);
        assert!(warnings[0].message.contains("not found on PATH"));
    }

    #[test]
    fn load_missing_file_fails() {
        let err = Config::load(Path::new("/nonexistent/autoheal.yaml")).unwrap_err();
        assert!(matches!(err, AutohealError::ConfigNotFound(_)));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("autoheal.yaml");
        std::fs::write(
            &path,
            "actions:\n  - alert: DiskFull\n    command: [\"df\", \"-h\"]\n",
        )
        .unwrap();
        let cfg = Config::load(&path).unwrap();
        assert_eq!(cfg.actions[0].alert, "DiskFull");
        assert_eq!(cfg.actions[0].command, vec!["df", "-h"]);
    }
}
