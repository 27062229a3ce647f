//! Unified diagnostics from heterogeneous tool output.
//!
//! Tools report problems in two shapes: a structured payload (ESLint's JSON
//! formatter) or free text lines (`tsc`, bundlers). Both are turned into the
//! same [`Diagnostic`] record, selected by a [`ParseStrategy`], so the report
//! never needs to know which tool produced what.
//!
//! Parsing never fails. When a structured payload cannot be read the line
//! parser takes over and the result is marked [`ParseMode::Degraded`].

pub mod lines;
pub mod structured;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::tools::ToolOutput;

/// Code used when a tool does not name the rule that fired.
pub const UNKNOWN_CODE: &str = "unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    /// Map a numeric severity (ESLint: 1 = warn, 2 = error).
    pub fn from_level(level: i64) -> Self {
        if level >= 2 {
            Severity::Error
        } else {
            Severity::Warning
        }
    }

    /// Map a textual severity; anything but "warning"/"warn" is an error.
    pub fn from_word(word: &str) -> Self {
        match word.to_ascii_lowercase().as_str() {
            "warning" | "warn" => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// One finding, whatever tool reported it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[non_exhaustive]
pub struct Diagnostic {
    pub file: String,
    pub line: Option<u32>,
    pub column: Option<u32>,
    /// Rule id or compiler code; never empty.
    pub code: String,
    pub severity: Severity,
    pub message: String,
    /// Name of the tool that reported it.
    pub tool: String,
}

impl Diagnostic {
    pub(crate) fn new(
        tool: &str,
        file: &str,
        line: Option<u32>,
        column: Option<u32>,
        code: Option<&str>,
        severity: Severity,
        message: &str,
    ) -> Self {
        let code = code
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(UNKNOWN_CODE);
        Self {
            file: file.to_string(),
            line,
            column,
            code: code.to_string(),
            severity,
            message: message.trim().to_string(),
            tool: tool.to_string(),
        }
    }
}

/// How a tool's output is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParseStrategy {
    /// ESLint `-f json` payload on stdout
    EslintJson,
    /// `file(line,col): error CODE: message` style lines
    #[default]
    Lines,
    /// Exit status only
    None,
}

impl fmt::Display for ParseStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseStrategy::EslintJson => write!(f, "eslint-json"),
            ParseStrategy::Lines => write!(f, "lines"),
            ParseStrategy::None => write!(f, "none"),
        }
    }
}

/// Which path the parser actually took.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum ParseMode {
    Structured,
    Lines,
    /// The structured payload was unreadable; diagnostics are matched lines.
    Degraded { reason: String },
    Skipped,
}

impl ParseMode {
    pub fn label(&self) -> &'static str {
        match self {
            ParseMode::Structured => "structured",
            ParseMode::Lines => "lines",
            ParseMode::Degraded { .. } => "degraded",
            ParseMode::Skipped => "skipped",
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            ParseMode::Degraded { reason } => Some(reason),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Parsed {
    pub diagnostics: Vec<Diagnostic>,
    pub mode: ParseMode,
}

/// Turn one tool's captured output into diagnostics.
///
/// `base` is the tool's working directory; file paths under it are reported
/// relative to it.
pub fn parse(tool: &str, strategy: ParseStrategy, output: &ToolOutput, base: Option<&Path>) -> Parsed {
    match strategy {
        ParseStrategy::None => Parsed {
            diagnostics: Vec::new(),
            mode: ParseMode::Skipped,
        },
        ParseStrategy::Lines => Parsed {
            diagnostics: lines::parse_lines(tool, output, base),
            mode: ParseMode::Lines,
        },
        ParseStrategy::EslintJson => match structured::parse_eslint(tool, &output.stdout, base) {
            Ok(diagnostics) => Parsed {
                diagnostics,
                mode: ParseMode::Structured,
            },
            Err(reason) => Parsed {
                diagnostics: lines::parse_lines(tool, output, base),
                mode: ParseMode::Degraded { reason },
            },
        },
    }
}

/// `file` relative to `base` when it lies under it, with `/` separators.
pub(crate) fn display_path(file: &str, base: Option<&Path>) -> String {
    let file = file.trim();
    let relative = base
        .and_then(|base| Path::new(file).strip_prefix(base).ok())
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.to_string());
    relative.replace('\\', "/")
}
