//! Error types for the generation and diagnostics pipelines.
//!
//! Per-file and per-tool errors ([`ValidationError`], [`SynthesisError`],
//! [`ToolError`]) are turned into recorded results by the orchestrator and the
//! check runner. Only the setup errors ([`GenerateError`], [`ReportError`])
//! ever reach the command line.

use serde::Serialize;
use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// A single field-level problem found while normalizing a spec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    /// Path of the offending field, e.g. `inputs[2].options`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub message: String,
}

impl Issue {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: Some(field.into()),
            message: message.into(),
        }
    }

    /// An issue that concerns the document as a whole.
    pub fn document(message: impl Into<String>) -> Self {
        Self {
            field: None,
            message: message.into(),
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(field) => write!(f, "{}: {}", field, self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// A spec failed normalization. Carries every issue that was detected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} validation issue(s){}", .issues.len(), first_issue(.issues))]
pub struct ValidationError {
    pub issues: Vec<Issue>,
}

fn first_issue(issues: &[Issue]) -> String {
    issues
        .first()
        .map(|issue| format!(", first: {}", issue))
        .unwrap_or_default()
}

/// Synthesis could not proceed for a spec that bypassed normalization.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SynthesisError {
    #[error("spec has no input fields")]
    NoInputs,
    #[error("slug `{0}` does not yield a component name")]
    EmptyComponentName(String),
    #[error("select field `{field}` has no options")]
    EmptyOptions { field: String },
}

impl SynthesisError {
    /// The same failure expressed as a manifest issue.
    pub fn to_issue(&self) -> Issue {
        match self {
            SynthesisError::NoInputs => Issue::new("inputs", self.to_string()),
            SynthesisError::EmptyComponentName(_) => Issue::new("slug", self.to_string()),
            SynthesisError::EmptyOptions { field } => {
                Issue::new(format!("inputs.{}", field), self.to_string())
            }
        }
    }
}

/// An external tool could not be run to completion.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("{stream} exceeded the {limit} byte output limit")]
    OutputLimit { stream: &'static str, limit: usize },
    #[error("failed while waiting for `{program}`: {source}")]
    Wait {
        program: String,
        #[source]
        source: io::Error,
    },
}

/// Setup failure of the generation run.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("spec directory {} does not exist", .0.display())]
    SpecsDirMissing(PathBuf),
    #[error("failed to list {}: {source}", .path.display())]
    ListDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to serialize manifest: {0}")]
    Manifest(#[from] serde_json::Error),
}

/// Failure to render or persist the diagnostics report.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to render report template: {0}")]
    Template(#[from] tera::Error),
    #[error("failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_message_mentions_first_issue() {
        let err = ValidationError {
            issues: vec![
                Issue::new("title", "title is required"),
                Issue::new("inputs", "at least one input is required"),
            ],
        };
        assert_eq!(
            err.to_string(),
            "2 validation issue(s), first: title: title is required"
        );
    }

    #[test]
    fn test_synthesis_error_as_issue() {
        let issue = SynthesisError::EmptyOptions {
            field: "Plazo".to_string(),
        }
        .to_issue();
        assert_eq!(issue.field.as_deref(), Some("inputs.Plazo"));
        assert!(issue.message.contains("no options"));
    }
}
