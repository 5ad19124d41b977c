//! Equality keys for report deduplication.
//!
//! Two reports are "the same error" when these fields match:
//! - app, apiKey, context
//! - errorClass, errorMessage, groupingHash
//! - metaData, handledState, stacktrace, user
//!
//! Breadcrumbs, device data and anything else that varies in real time are
//! left out of the projection, so they never influence the key.
//!
//! The projection is rendered as canonical JSON: object keys are sorted at
//! every depth, array order is kept, absent fields are omitted and an explicit
//! `null` is written out. Numbers are compared by value, so `1` and `1.0`
//! render the same. The text is then fingerprinted with ahash so most
//! comparisons are a single integer check.

use crate::domain::report::{ErrorReport, HandledState, StackFrame};
use ahash::AHasher;
use serde::Serialize;
use serde_json::{Number, Value};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Error returned when a report cannot be projected onto an equality key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    /// One of the compared fields failed to serialize
    Serialize(String),
}

impl fmt::Display for KeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyError::Serialize(msg) => {
                write!(f, "failed to serialize report for comparison: {}", msg)
            }
        }
    }
}

impl std::error::Error for KeyError {}

impl From<serde_json::Error> for KeyError {
    fn from(e: serde_json::Error) -> Self {
        KeyError::Serialize(e.to_string())
    }
}

/// The subset of a report that participates in equality.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct KeyFields<'a, M> {
    #[serde(skip_serializing_if = "Option::is_none")]
    app: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_class: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_message: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    grouping_hash: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    meta_data: Option<&'a M>,
    #[serde(skip_serializing_if = "Option::is_none")]
    handled_state: Option<&'a HandledState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stacktrace: Option<&'a [StackFrame]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<&'a Value>,
}

impl<'a, M> KeyFields<'a, M> {
    fn project(report: &'a ErrorReport<M>) -> Self {
        Self {
            app: report.app.as_ref(),
            api_key: report.api_key.as_deref(),
            context: report.context.as_ref(),
            error_class: report.error_class.as_deref(),
            error_message: report.error_message.as_deref(),
            grouping_hash: report.grouping_hash.as_deref(),
            meta_data: report.meta_data.as_ref(),
            handled_state: report.handled_state.as_ref(),
            stacktrace: report.stacktrace.as_deref(),
            user: report.user.as_ref(),
        }
    }
}

/// Canonical identity of a report for duplicate counting.
///
/// Cheap to clone: the canonical text is shared.
#[derive(Debug, Clone)]
pub struct EqualityKey {
    fingerprint: u64,
    canonical: Arc<str>,
}

impl EqualityKey {
    /// Derive the key for a report.
    ///
    /// # Errors
    /// Returns `KeyError::Serialize` if the metadata (or any other compared
    /// field) refuses to serialize, e.g. a map with non-string keys.
    pub fn extract<M: Serialize>(report: &ErrorReport<M>) -> Result<Self, KeyError> {
        let projected = serde_json::to_value(KeyFields::project(report))?;
        let mut canonical = String::new();
        write_canonical(&projected, &mut canonical)?;
        Ok(Self::from_canonical(canonical))
    }

    /// Build a key from text that is already canonical.
    pub fn from_canonical(canonical: impl Into<Arc<str>>) -> Self {
        let canonical = canonical.into();
        let mut hasher = AHasher::default();
        canonical.hash(&mut hasher);

        Self {
            fingerprint: hasher.finish(),
            canonical,
        }
    }

    /// The canonical JSON text.
    pub fn as_str(&self) -> &str {
        &self.canonical
    }

    /// The 64-bit fingerprint of the canonical text.
    pub fn fingerprint(&self) -> u64 {
        self.fingerprint
    }
}

impl PartialEq for EqualityKey {
    fn eq(&self, other: &Self) -> bool {
        self.fingerprint == other.fingerprint && self.canonical == other.canonical
    }
}

impl Eq for EqualityKey {}

impl Hash for EqualityKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.fingerprint.hash(state);
    }
}

impl fmt::Display for EqualityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.fingerprint)
    }
}

/// Write `value` as JSON with object keys sorted at every level.
///
/// Sorting here instead of relying on `serde_json::Map` ordering keeps keys
/// stable even when `preserve_order` is enabled elsewhere in the build.
fn write_canonical(value: &Value, out: &mut String) -> Result<(), KeyError> {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => write_number(n, out),
        Value::String(s) => out.push_str(&serde_json::to_string(s)?),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out)?;
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_unstable_by(|a, b| a.0.cmp(b.0));

            out.push('{');
            for (i, (key, item)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&serde_json::to_string(key)?);
                out.push(':');
                write_canonical(item, out)?;
            }
            out.push('}');
        }
    }
    Ok(())
}

/// Integral floats within the exactly-representable range are written as
/// integers; `-0.0` becomes `0`.
fn write_number(n: &Number, out: &mut String) {
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;

    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() <= MAX_EXACT => {
            out.push_str(&(f as i64).to_string())
        }
        _ => out.push_str(&n.to_string()),
    }
}
