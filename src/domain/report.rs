//! Error report model.
//!
//! An `ErrorReport` is what the host client is about to deliver. The throttle
//! only reads it (to derive an equality key) and, when the report must be
//! dropped, flips its `ignored` flag through [`ErrorReport::ignore`].
//!
//! Field names follow the wire payload (camelCase) so reports can be built
//! straight from the host's JSON.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Severity attached to a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// How the error reached the client: caught by application code or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandledState {
    /// Whether the error escaped application code
    pub unhandled: bool,
    /// Severity assigned by the client
    pub severity: Severity,
    /// Why the severity was chosen (`{"type": "unhandledException"}` etc.)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity_reason: Option<Value>,
    /// Fields the client sent that have no typed slot; still compared
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl HandledState {
    /// State for an error the application reported itself.
    pub fn handled() -> Self {
        Self {
            unhandled: false,
            severity: Severity::Warning,
            severity_reason: None,
            extra: Map::new(),
        }
    }

    /// State for an error caught by a global handler.
    pub fn unhandled() -> Self {
        Self {
            unhandled: true,
            severity: Severity::Error,
            severity_reason: None,
            extra: Map::new(),
        }
    }
}

/// A single stack frame.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackFrame {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub in_project: Option<bool>,
    /// Surrounding source lines keyed by line number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<Value>,
    /// Any other frame fields (`source`, `lineText`...), kept for comparison
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StackFrame {
    /// Create a frame pointing at `file:line` inside `method`.
    pub fn new(file: impl Into<String>, method: impl Into<String>, line_number: u32) -> Self {
        Self {
            file: Some(file.into()),
            method: Some(method.into()),
            line_number: Some(line_number),
            ..Self::default()
        }
    }
}

/// A breadcrumb leading up to the error. Never part of report equality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Breadcrumb {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// ISO-8601 timestamp as recorded by the client
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_data: Option<Value>,
}

impl Breadcrumb {
    pub fn new(
        name: impl Into<String>,
        kind: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            timestamp: timestamp.into(),
            meta_data: None,
        }
    }
}

/// An outbound error report.
///
/// `M` is the metadata payload. It defaults to free-form JSON but hosts may
/// plug in their own `Serialize` types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport<M = Value> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grouping_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_data: Option<M>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handled_state: Option<HandledState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stacktrace: Option<Vec<StackFrame>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub breadcrumbs: Vec<Breadcrumb>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device: Option<Value>,
    #[serde(skip)]
    ignored: bool,
}

impl<M> Default for ErrorReport<M> {
    fn default() -> Self {
        Self {
            app: None,
            api_key: None,
            context: None,
            error_class: None,
            error_message: None,
            grouping_hash: None,
            meta_data: None,
            handled_state: None,
            stacktrace: None,
            user: None,
            breadcrumbs: Vec::new(),
            device: None,
            ignored: false,
        }
    }
}

impl<M> ErrorReport<M> {
    /// Create a report for an error class and message.
    pub fn new(error_class: impl Into<String>, error_message: impl Into<String>) -> Self {
        Self {
            error_class: Some(error_class.into()),
            error_message: Some(error_message.into()),
            ..Self::default()
        }
    }

    /// Set the API key.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the context.
    pub fn with_context(mut self, context: impl Into<Value>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Set the grouping hash.
    pub fn with_grouping_hash(mut self, grouping_hash: impl Into<String>) -> Self {
        self.grouping_hash = Some(grouping_hash.into());
        self
    }

    /// Attach metadata.
    pub fn with_meta_data(mut self, meta_data: M) -> Self {
        self.meta_data = Some(meta_data);
        self
    }

    /// Set the handled state.
    pub fn with_handled_state(mut self, handled_state: HandledState) -> Self {
        self.handled_state = Some(handled_state);
        self
    }

    /// Set the stack trace.
    pub fn with_stacktrace(mut self, frames: Vec<StackFrame>) -> Self {
        self.stacktrace = Some(frames);
        self
    }

    /// Set the affected user.
    pub fn with_user(mut self, user: impl Into<Value>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Set the app descriptor.
    pub fn with_app(mut self, app: impl Into<Value>) -> Self {
        self.app = Some(app.into());
        self
    }

    /// Set the device descriptor.
    pub fn with_device(mut self, device: impl Into<Value>) -> Self {
        self.device = Some(device.into());
        self
    }

    /// Append a breadcrumb.
    pub fn with_breadcrumb(mut self, breadcrumb: Breadcrumb) -> Self {
        self.breadcrumbs.push(breadcrumb);
        self
    }

    /// Mark the report so the host does not deliver it.
    pub fn ignore(&mut self) {
        self.ignored = true;
    }

    /// Whether a hook has asked for this report to be dropped.
    pub fn is_ignored(&self) -> bool {
        self.ignored
    }
}
