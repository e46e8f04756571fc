use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::RegistryError;

/// A trigger and the content it expands to.
///
/// Identity is the trigger string. `shortcut` is accepted as an input alias
/// for `trigger` so records written by older tooling still load.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExpansionRecord {
    #[serde(alias = "shortcut")]
    pub trigger: String,
    #[serde(default)]
    pub content: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl ExpansionRecord {
    pub fn new(trigger: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            trigger: trigger.into(),
            content: content.into(),
            enabled: true,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// Canonical trigger form: trimmed, non-empty, starting with `prefix`.
pub fn canonical_trigger(raw: &str, prefix: char) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.starts_with(prefix) {
        Some(trimmed.to_string())
    } else {
        Some(format!("{prefix}{trimmed}"))
    }
}

fn scalar_to_string(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Normalize one loosely-typed persisted entry. Returns `None` for anything
/// that is not an object or has no usable trigger.
pub fn normalize_value(value: &Value, prefix: char) -> Option<ExpansionRecord> {
    let obj = value.as_object()?;
    let raw_trigger = obj
        .get("trigger")
        .filter(|v| !v.is_null())
        .or_else(|| obj.get("shortcut"))
        .map(scalar_to_string)
        .unwrap_or_default();
    let trigger = canonical_trigger(&raw_trigger, prefix)?;
    let content = obj.get("content").map(scalar_to_string).unwrap_or_default();
    let enabled = !matches!(obj.get("enabled"), Some(Value::Bool(false)));
    Some(ExpansionRecord {
        trigger,
        content,
        enabled,
    })
}

/// Normalize a sequence of loosely-typed entries, silently dropping malformed ones.
pub fn normalize_values(values: &[Value], prefix: char) -> Vec<ExpansionRecord> {
    let normalized: Vec<ExpansionRecord> = values
        .iter()
        .filter_map(|v| normalize_value(v, prefix))
        .collect();
    let dropped = values.len() - normalized.len();
    if dropped > 0 {
        tracing::debug!(target: "registry", dropped, kept = normalized.len(), "malformed_records_dropped");
    }
    normalized
}

/// Normalize typed records: canonical trigger, drop empty triggers.
pub fn normalize_records(records: Vec<ExpansionRecord>, prefix: char) -> Vec<ExpansionRecord> {
    records
        .into_iter()
        .filter_map(|r| {
            let trigger = canonical_trigger(&r.trigger, prefix)?;
            Some(ExpansionRecord { trigger, ..r })
        })
        .collect()
}

/// Parse an import payload. The payload must be a JSON array; entries inside
/// it that fail normalization are dropped.
pub fn import_records(payload: &str, prefix: char) -> Result<Vec<ExpansionRecord>, RegistryError> {
    let parsed: Value = serde_json::from_str(payload)?;
    let Value::Array(items) = parsed else {
        return Err(RegistryError::InvalidPayload(
            "expected an array of records".to_string(),
        ));
    };
    Ok(normalize_values(&items, prefix))
}

/// Pretty JSON array suitable for `import_records`.
pub fn export_records(records: &[ExpansionRecord]) -> Result<String, RegistryError> {
    Ok(serde_json::to_string_pretty(records)?)
}
