//! Structured dispatch errors
//!
//! Per-extension failures never abort a broadcast. They are values that
//! occupy the failing extension's result slot and carry clear, actionable
//! information for the caller.

use serde::{Deserialize, Serialize};

/// Standard error codes (machine-readable)
pub mod codes {
    pub const MISSING_CAPABILITY: &str = "MISSING_CAPABILITY";
    pub const ASYNC_CAPABILITY: &str = "ASYNC_CAPABILITY";
    pub const UNDEFINED_FIELD: &str = "UNDEFINED_FIELD";
    pub const TYPE_ERROR: &str = "TYPE_ERROR";
    pub const CIRCULAR_REF: &str = "CIRCULAR_REF";
    pub const INTERNAL: &str = "INTERNAL";
}

/// Severity level of an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Dispatch continued with a degraded result slot
    Warning,
    /// The requested operation failed for this extension
    Error,
    /// The point cannot dispatch at all
    Fatal,
}

/// Structured error carried inside a `Value::Error` slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlexusError {
    /// Machine-readable error code
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Suggestion for fixing the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,

    /// Point namespace where the error occurred
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point: Option<String>,

    /// Extension id involved, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,

    /// Severity level
    pub severity: Severity,
}

impl PlexusError {
    /// Create a new error
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            suggestion: None,
            point: None,
            extension: None,
            severity: Severity::Error,
        }
    }

    /// Builder: add suggestion
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Builder: set the point namespace
    pub fn at_point(mut self, point: impl Into<String>) -> Self {
        self.point = Some(point.into());
        self
    }

    /// Builder: set the extension id
    pub fn for_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = Some(extension.into());
        self
    }

    /// Builder: set severity
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    // ========== Common Error Constructors ==========

    pub fn missing_capability(extension: &str, method: &str) -> Self {
        Self::new(
            codes::MISSING_CAPABILITY,
            format!("extension '{}' has no capability '{}'", extension, method),
        )
        .with_suggestion("Check the method name against the extension's registered capabilities")
        .for_extension(extension)
        .with_severity(Severity::Warning)
    }

    pub fn async_capability(extension: &str, method: &str) -> Self {
        Self::new(
            codes::ASYNC_CAPABILITY,
            format!(
                "capability '{}' on extension '{}' is async; use an async dispatch entry point",
                method, extension
            ),
        )
        .with_suggestion("Call exec_async or invoke_async instead")
        .for_extension(extension)
    }

    pub fn undefined_field(name: &str) -> Self {
        Self::new(codes::UNDEFINED_FIELD, format!("Undefined field: {}", name))
    }

    pub fn type_error(expected: &str, got: &str) -> Self {
        Self::new(codes::TYPE_ERROR, format!("Expected {}, got {}", expected, got))
    }

    pub fn circular_ref(point: &str, extension: &str) -> Self {
        Self::new(
            codes::CIRCULAR_REF,
            format!(
                "Circular references detected for extension point '{}' and extension '{}'",
                point, extension
            ),
        )
        .with_suggestion("Remove the circular before/after anchor")
        .at_point(point)
        .for_extension(extension)
        .with_severity(Severity::Fatal)
    }

    pub fn internal(details: impl Into<String>) -> Self {
        Self::new(codes::INTERNAL, format!("Internal error: {}", details.into()))
            .with_severity(Severity::Fatal)
    }
}

impl std::fmt::Display for PlexusError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, " (suggestion: {})", suggestion)?;
        }
        Ok(())
    }
}

impl std::error::Error for PlexusError {}
