//! Calculator spec documents.
//!
//! A spec is a YAML or JSON document describing one calculator: its title,
//! inputs and outputs. [`normalize`] turns the document text into a
//! [`CalculatorSpec`] or a [`ValidationError`] listing every problem found.
//! [`SkipPolicy`] decides which files in a spec directory are not specs at
//! all (housekeeping documents, schemas, drafts).

pub mod model;
pub mod normalize;
pub mod raw;

use glob::{MatchOptions, Pattern, PatternError};
use std::path::Path;

pub use model::{CalculatorSpec, FieldKind, InputField, OutputField, SelectOption};
pub use normalize::{normalize, slugify, NormalizeSettings};

pub use crate::error::{Issue, ValidationError};

/// Document syntax, chosen from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecFormat {
    Yaml,
    Json,
}

impl SpecFormat {
    /// `None` for files that are not spec documents.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "yaml" | "yml" => Some(SpecFormat::Yaml),
            "json" => Some(SpecFormat::Json),
            _ => None,
        }
    }
}

/// File-name patterns excluded from generation before any parsing happens.
#[derive(Debug, Clone, Default)]
pub struct SkipPolicy {
    patterns: Vec<Pattern>,
}

impl SkipPolicy {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, PatternError> {
        let patterns = patterns
            .iter()
            .map(|p| Pattern::new(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    /// Matches against the file name only, case-insensitively.
    pub fn is_skipped(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return true;
        };
        let options = MatchOptions {
            case_sensitive: false,
            require_literal_separator: true,
            require_literal_leading_dot: false,
        };
        self.patterns
            .iter()
            .any(|p| p.matches_with(name, options))
    }
}
