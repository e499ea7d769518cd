use crate::error::{AutohealError, Result};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// AlertEvent / ParsedBatch
// ---------------------------------------------------------------------------

/// One alert from the inbound batch. Built fresh per request, never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertEvent {
    pub alert_name: String,
    pub labels: BTreeMap<String, String>,
}

/// Result of parsing one webhook payload: the usable events plus a note for
/// every entry that had to be skipped.
#[derive(Debug, Default)]
pub struct ParsedBatch {
    pub events: Vec<AlertEvent>,
    pub skipped: Vec<String>,
}

// ---------------------------------------------------------------------------
// parse
// ---------------------------------------------------------------------------

/// Decode an Alertmanager-style webhook body.
///
/// Structural failures (not JSON, or JSON that is not an object) are
/// request-level errors. Everything below that degrades gracefully: a missing
/// or non-array `alerts` field yields an empty batch, and a malformed entry
/// is skipped without aborting its siblings.
pub fn parse(raw: &[u8]) -> Result<ParsedBatch> {
    let value: serde_json::Value = serde_json::from_slice(raw)
        .map_err(|e| AutohealError::MalformedPayload(e.to_string()))?;

    let obj = value
        .as_object()
        .ok_or_else(|| AutohealError::MalformedPayload("top-level value is not an object".into()))?;

    let mut batch = ParsedBatch::default();

    let Some(alerts) = obj.get("alerts").and_then(|v| v.as_array()) else {
        return Ok(batch);
    };

    for (index, entry) in alerts.iter().enumerate() {
        let Some(labels) = entry.get("labels").and_then(|v| v.as_object()) else {
            batch
                .skipped
                .push(format!("alert at index {index} has no labels object"));
            continue;
        };
        let Some(alert_name) = labels.get("alertname").and_then(|v| v.as_str()) else {
            batch
                .skipped
                .push(format!("alert at index {index} has no alertname label"));
            continue;
        };

        // Keep only string-valued labels; anything else is not a label.
        let labels: BTreeMap<String, String> = labels
            .iter()
            .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
            .collect();

        batch.events.push(AlertEvent {
            alert_name: alert_name.to_string(),
            labels,
        });
    }

    Ok(batch)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_batch_in_order() {
        let body = serde_json::json!({
            "alerts": [
                {"labels": {"alertname": "NginxDown", "severity": "critical"}},
                {"labels": {"alertname": "MySQLDown"}},
            ]
        });
        let batch = parse(body.to_string().as_bytes()).unwrap();
        assert_eq!(batch.events.len(), 2);
        assert!(batch.skipped.is_empty());
        assert_eq!(batch.events[0].alert_name, "NginxDown");
        assert_eq!(batch.events[0].labels["severity"], "critical");
        assert_eq!(batch.events[1].alert_name, "MySQLDown");
    }

    #[test]
    fn missing_alerts_key_yields_empty_batch() {
        let batch = parse(br#"{"status": "firing"}"#).unwrap();
        assert!(batch.events.is_empty());
        assert!(batch.skipped.is_empty());
    }

    #[test]
    fn non_array_alerts_yields_empty_batch() {
        let batch = parse(br#"{"alerts": "oops"}"#).unwrap();
        assert!(batch.events.is_empty());
    }

    #[test]
    fn invalid_json_is_malformed() {
        let err = parse(b"not json at all").unwrap_err();
        assert!(matches!(err, AutohealError::MalformedPayload(_)));
    }

    #[test]
    fn non_object_top_level_is_malformed() {
        let err = parse(b"[1, 2, 3]").unwrap_err();
        assert!(matches!(err, AutohealError::MalformedPayload(_)));
    }

    #[test]
    fn malformed_entry_is_skipped_siblings_survive() {
        let body = serde_json::json!({
            "alerts": [
                {"labels": {"alertname": "First"}},
                {"annotations": {"summary": "no labels here"}},
                {"labels": {"severity": "warning"}},
                {"labels": {"alertname": "Last"}},
            ]
        });
        let batch = parse(body.to_string().as_bytes()).unwrap();
        assert_eq!(batch.events.len(), 2);
        assert_eq!(batch.events[0].alert_name, "First");
        assert_eq!(batch.events[1].alert_name, "Last");
        assert_eq!(batch.skipped.len(), 2);
        assert!(batch.skipped[0].contains("index 1"));
        assert!(batch.skipped[1].contains("index 2"));
    }

    #[test]
    fn non_string_alertname_is_skipped() {
        let body = serde_json::json!({"alerts": [{"labels": {"alertname": 42}}]});
        let batch = parse(body.to_string().as_bytes()).unwrap();
        assert!(batch.events.is_empty());
        assert_eq!(batch.skipped.len(), 1);
    }

    #[test]
    fn non_string_label_values_are_dropped() {
        let body = serde_json::json!({
            "alerts": [{"labels": {"alertname": "X", "count": 3, "env": "prod"}}]
        });
        let batch = parse(body.to_string().as_bytes()).unwrap();
        let event = &batch.events[0];
        assert_eq!(event.labels.len(), 2);
        assert_eq!(event.labels["env"], "prod");
        assert!(!event.labels.contains_key("count"));
    }
}
