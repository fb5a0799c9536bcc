//! Diagnostic entry data structures

use std::error::Error;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::PantryError;

/// How serious a diagnostic entry is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "INFO"),
            Severity::Warning => write!(f, "WARN"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// A single diagnostic log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticEntry {
    /// When the entry was recorded (UTC)
    pub timestamp: DateTime<Utc>,

    pub severity: Severity,

    /// Backup run or restore session the entry belongs to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_id: Option<Uuid>,

    /// Where it happened (e.g. "backup.clients.upload")
    pub context: String,

    /// Error kind, when the entry was built from an error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    pub message: String,

    /// Underlying causes, outermost first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub causes: Vec<String>,
}

impl DiagnosticEntry {
    fn new(
        severity: Severity,
        run_id: Option<Uuid>,
        context: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            severity,
            run_id,
            context: context.into(),
            kind: None,
            message: message.into(),
            causes: Vec::new(),
        }
    }

    /// Informational entry
    pub fn info(run_id: Option<Uuid>, context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Info, run_id, context, message)
    }

    /// Warning entry
    pub fn warning(
        run_id: Option<Uuid>,
        context: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(Severity::Warning, run_id, context, message)
    }

    /// Error entry built from a `PantryError`, capturing its source chain
    pub fn from_error(run_id: Option<Uuid>, context: impl Into<String>, error: &PantryError) -> Self {
        let mut entry = Self::new(Severity::Error, run_id, context, error.to_string());
        entry.kind = Some(error.kind().to_string());

        let mut source = error.source();
        while let Some(cause) = source {
            entry.causes.push(cause.to_string());
            source = cause.source();
        }
        entry
    }

    /// Format the entry for human-readable output
    pub fn format_human_readable(&self) -> String {
        let mut output = format!(
            "[{}] {} {}: {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            self.severity,
            self.context,
            self.message
        );

        if let Some(kind) = &self.kind {
            output.push_str(&format!(" ({})", kind));
        }

        for cause in &self.causes {
            output.push_str(&format!("\n  caused by: {}", cause));
        }

        output
    }
}
