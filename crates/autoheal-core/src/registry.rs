use crate::config::{Config, ConfigWarning, WarnLevel};
use crate::error::{AutohealError, Result};
use std::collections::HashMap;
use std::time::Duration;

// ---------------------------------------------------------------------------
// ActionDescriptor
// ---------------------------------------------------------------------------

/// A remediation action resolved from config. Immutable after load.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionDescriptor {
    pub alert_name: String,
    /// argv: command[0] is the executable, the rest are arguments.
    /// Alert-derived strings are never interpolated into this.
    pub command: Vec<String>,
    pub timeout: Duration,
}

// ---------------------------------------------------------------------------
// ActionRegistry
// ---------------------------------------------------------------------------

/// Read-only mapping from alert name to remediation action, built once at
/// startup. There is no runtime reload.
#[derive(Debug, Default)]
pub struct ActionRegistry {
    actions: HashMap<String, ActionDescriptor>,
}

impl ActionRegistry {
    /// Build the registry, failing fast on any error-level config finding
    /// (duplicate alert, empty command, zero timeout).
    pub fn from_config(cfg: &Config) -> Result<Self> {
        Self::from_validated(cfg, &cfg.validate())
    }

    /// Build from findings the caller already collected, so a caller that
    /// logs them does not have to validate the config a second time.
    pub fn from_validated(cfg: &Config, findings: &[ConfigWarning]) -> Result<Self> {
        if let Some(e) = findings.iter().find(|w| w.level == WarnLevel::Error) {
            return Err(AutohealError::ConfigInvalid(e.message.clone()));
        }

        let mut actions = HashMap::with_capacity(cfg.actions.len());
        for a in &cfg.actions {
            actions.insert(
                a.alert.clone(),
                ActionDescriptor {
                    alert_name: a.alert.clone(),
                    command: a.command.clone(),
                    timeout: Duration::from_secs(a.timeout_seconds),
                },
            );
        }
        Ok(Self { actions })
    }

    pub fn lookup(&self, alert_name: &str) -> Option<&ActionDescriptor> {
        self.actions.get(alert_name)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
