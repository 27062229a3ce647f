//! Loose document shapes deserialized before validation.
//!
//! Every field is optional and `type` stays a string, so a document with
//! several problems still deserializes and all of them can be reported at once.
//! Unknown keys (page metadata and the like) are ignored.

use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawSpec {
    pub slug: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(alias = "locale")]
    pub lang: Option<String>,
    pub inputs: Option<Vec<RawInput>>,
    pub outputs: Option<Vec<RawOutput>>,
    #[serde(alias = "explanation")]
    pub steps: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawInput {
    pub name: Option<String>,
    pub label: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub unit: Option<String>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub step: Option<f64>,
    pub default: Option<RawScalar>,
    pub options: Option<Vec<RawOption>>,
    pub placeholder: Option<String>,
    pub help: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawOutput {
    pub name: Option<String>,
    pub label: Option<String>,
    pub unit: Option<String>,
    pub precision: Option<i64>,
}

/// A scalar as written in the document.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawScalar {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl RawScalar {
    /// Textual form used for option values and text defaults.
    pub fn to_text(&self) -> String {
        match self {
            RawScalar::Bool(b) => b.to_string(),
            RawScalar::Number(n) => format_number(*n),
            RawScalar::Text(s) => s.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawOption {
    Scalar(RawScalar),
    Pair {
        label: Option<String>,
        value: RawScalar,
    },
}

/// Render a number without a trailing `.0` for integral values.
pub fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(3.0), "3");
        assert_eq!(format_number(-12.0), "-12");
        assert_eq!(format_number(0.25), "0.25");
    }

    #[test]
    fn test_options_accept_literals_and_pairs() {
        let options: Vec<RawOption> =
            serde_yaml::from_str("[12, \"mensual\", {label: Anual, value: 1}]").unwrap();
        assert_eq!(options[0], RawOption::Scalar(RawScalar::Number(12.0)));
        assert_eq!(
            options[1],
            RawOption::Scalar(RawScalar::Text("mensual".to_string()))
        );
        assert_eq!(
            options[2],
            RawOption::Pair {
                label: Some("Anual".to_string()),
                value: RawScalar::Number(1.0)
            }
        );
    }
}
