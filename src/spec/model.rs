//! Normalized calculator spec types.
//!
//! Values of these types only come out of [`super::normalize`] (or tests), so
//! every invariant listed on a type has already been checked.

use serde::Serialize;

/// A validated calculator description.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalculatorSpec {
    /// Lower-case, dash-separated name; drives the artifact file name.
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub lang: String,
    /// Never empty.
    pub inputs: Vec<InputField>,
    /// Names are unique.
    pub outputs: Vec<OutputField>,
    pub steps: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputField {
    /// Human label as written by the spec author.
    pub name: String,
    pub kind: FieldKind,
    pub unit: Option<String>,
    pub help: Option<String>,
}

/// The closed set of input types, each with the data it needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldKind {
    Number {
        min: Option<f64>,
        max: Option<f64>,
        step: Option<f64>,
        default: f64,
    },
    Select {
        /// Never empty.
        options: Vec<SelectOption>,
        /// One of the option values.
        default: String,
    },
    Text {
        default: String,
        placeholder: Option<String>,
    },
    Boolean {
        default: bool,
    },
}

impl FieldKind {
    /// Name used in documents and messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Number { .. } => "number",
            FieldKind::Select { .. } => "select",
            FieldKind::Text { .. } => "text",
            FieldKind::Boolean { .. } => "boolean",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputField {
    /// Key looked up in the object returned by the formulas module.
    pub name: String,
    pub label: String,
    pub unit: Option<String>,
    /// Decimal places, 0..=10.
    pub precision: Option<u8>,
}
