use crate::executor::{ExecutionResult, ProcessExecutor, Remediator};
use crate::parser::AlertEvent;
use crate::registry::ActionRegistry;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

// ---------------------------------------------------------------------------
// Classification / AlertOutcome / BatchResult
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Success,
    ExecutionFailed,
    Timeout,
    NoActionMapped,
}

/// Per-alert record of what happened when attempting remediation. One is
/// produced for every parsed event, in input order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertOutcome {
    pub alert_name: String,
    pub matched: bool,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub classification: Classification,
    pub error: Option<String>,
    pub duration_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallStatus {
    AllOk,
    PartialFailure,
    MalformedInput,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResult {
    pub outcomes: Vec<AlertOutcome>,
    pub overall_status: OverallStatus,
}

// ---------------------------------------------------------------------------
// ActionLocks
// ---------------------------------------------------------------------------

/// Per-action-key locks. Two overlapping requests naming the same alert would
/// otherwise run the same remediation concurrently; most remediation scripts
/// are not written for that.
#[derive(Debug, Default)]
pub struct ActionLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl ActionLocks {
    async fn for_action(&self, alert_name: &str) -> Arc<Mutex<()>> {
        let mut map = self.locks.lock().await;
        map.entry(alert_name.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

// ---------------------------------------------------------------------------
// dispatch
// ---------------------------------------------------------------------------

/// Process a batch of events sequentially in input order, producing exactly
/// one outcome per event. Per-alert failures are converted to outcomes here;
/// nothing a single alert does can abort its siblings.
pub async fn dispatch<E: Remediator>(
    events: &[AlertEvent],
    registry: &ActionRegistry,
    executor: &E,
    locks: &ActionLocks,
) -> BatchResult {
    let mut outcomes = Vec::with_capacity(events.len());
    for event in events {
        outcomes.push(run_one(event, registry, executor, locks).await);
    }

    let all_ok = outcomes.iter().all(|o| {
        matches!(
            o.classification,
            Classification::Success | Classification::NoActionMapped
        )
    });
    BatchResult {
        outcomes,
        overall_status: if all_ok {
            OverallStatus::AllOk
        } else {
            OverallStatus::PartialFailure
        },
    }
}

async fn run_one<E: Remediator>(
    event: &AlertEvent,
    registry: &ActionRegistry,
    executor: &E,
    locks: &ActionLocks,
) -> AlertOutcome {
    let Some(action) = registry.lookup(&event.alert_name) else {
        warn!(alert = %event.alert_name, "no action mapped for alert");
        return AlertOutcome {
            alert_name: event.alert_name.clone(),
            matched: false,
            exit_code: None,
            stdout: String::new(),
            stderr: String::new(),
            classification: Classification::NoActionMapped,
            error: None,
            duration_ms: 0,
        };
    };

    // Serialize concurrent runs of the same action across requests.
    let lock = locks.for_action(&event.alert_name).await;
    let _guard = lock.lock().await;

    info!(alert = %event.alert_name, command = ?action.command, "running remediation");
    match executor.execute(action).await {
        Ok(result) => {
            let classification = classify(&result);
            if !result.stdout.is_empty() {
                info!(alert = %event.alert_name, stdout = %result.stdout.trim_end());
            }
            if !result.stderr.is_empty() {
                warn!(alert = %event.alert_name, stderr = %result.stderr.trim_end());
            }
            info!(
                alert = %event.alert_name,
                ?classification,
                exit_code = ?result.exit_code,
                duration_ms = result.duration_ms,
                "remediation finished"
            );
            AlertOutcome {
                alert_name: event.alert_name.clone(),
                matched: true,
                exit_code: result.exit_code,
                stdout: result.stdout,
                stderr: result.stderr,
                classification,
                error: None,
                duration_ms: result.duration_ms,
            }
        }
        Err(e) => {
            warn!(alert = %event.alert_name, error = %e, "remediation could not run");
            AlertOutcome {
                alert_name: event.alert_name.clone(),
                matched: true,
                exit_code: None,
                stdout: String::new(),
                stderr: String::new(),
                classification: Classification::ExecutionFailed,
                error: Some(e.to_string()),
                duration_ms: 0,
            }
        }
    }
}

fn classify(result: &ExecutionResult) -> Classification {
    if result.timed_out {
        Classification::Timeout
    } else if result.exit_code == Some(0) {
        Classification::Success
    } else {
        Classification::ExecutionFailed
    }
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// Registry + executor + per-action locks, bundled for the HTTP layer. One
/// value lives for the process lifetime; each request gets its own `run`.
#[derive(Debug)]
pub struct Dispatcher {
    registry: ActionRegistry,
    executor: ProcessExecutor,
    locks: ActionLocks,
}

impl Dispatcher {
    pub fn new(registry: ActionRegistry, executor: ProcessExecutor) -> Self {
        Self {
            registry,
            executor,
            locks: ActionLocks::default(),
        }
    }

    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    pub async fn run(&self, events: &[AlertEvent]) -> BatchResult {
        dispatch(events, &self.registry, &self.executor, &self.locks).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
