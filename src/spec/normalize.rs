//! Validation and defaulting of calculator documents.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

use super::model::{CalculatorSpec, FieldKind, InputField, OutputField, SelectOption};
use super::raw::{format_number, RawInput, RawOption, RawOutput, RawScalar, RawSpec};
use super::SpecFormat;
use crate::error::{Issue, ValidationError};

static LANG_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z]{2,3}(-[A-Za-z0-9]{2,8})*$").expect("valid regex"));

const MAX_PRECISION: i64 = 10;

/// Settings that fill in what a document leaves out.
#[derive(Debug, Clone)]
pub struct NormalizeSettings {
    pub default_locale: String,
}

impl Default for NormalizeSettings {
    fn default() -> Self {
        Self {
            default_locale: "es".to_string(),
        }
    }
}

/// Parse and validate one spec document.
///
/// All detectable issues are collected before failing.
pub fn normalize(
    source: &str,
    format: SpecFormat,
    settings: &NormalizeSettings,
) -> Result<CalculatorSpec, ValidationError> {
    let raw = parse_raw(source, format).map_err(|issue| ValidationError {
        issues: vec![issue],
    })?;

    let mut issues = Vec::new();

    let title = non_blank(raw.title);
    if title.is_none() {
        issues.push(Issue::new("title", "title is required"));
    }

    let slug_source = non_blank(raw.slug.clone()).or_else(|| title.clone());
    let slug = slug_source.as_deref().map(slugify).unwrap_or_default();
    if slug.is_empty() && slug_source.is_some() {
        let field = if raw.slug.is_some() { "slug" } else { "title" };
        issues.push(Issue::new(
            field,
            "does not contain any letters or digits to build a file name from",
        ));
    }

    let lang = non_blank(raw.lang).unwrap_or_else(|| settings.default_locale.clone());
    if !LANG_PATTERN.is_match(&lang) {
        issues.push(Issue::new(
            "lang",
            format!("`{}` is not a valid locale tag", lang),
        ));
    }

    let raw_inputs = raw.inputs.unwrap_or_default();
    if raw_inputs.is_empty() {
        issues.push(Issue::new("inputs", "at least one input field is required"));
    }
    let mut input_names = HashSet::new();
    let mut inputs = Vec::new();
    for (i, raw_input) in raw_inputs.into_iter().enumerate() {
        let Some(input) = normalize_input(i, raw_input, &mut issues) else {
            continue;
        };
        // Names key the values object handed to the formulas module.
        if !input_names.insert(input.name.clone()) {
            issues.push(Issue::new(
                format!("inputs[{}].name", i),
                format!("duplicate input name `{}`", input.name),
            ));
            continue;
        }
        inputs.push(input);
    }

    let outputs = normalize_outputs(raw.outputs.unwrap_or_default(), &mut issues);

    let steps = raw
        .steps
        .unwrap_or_default()
        .into_iter()
        .filter_map(|s| non_blank(Some(s)))
        .collect();

    if !issues.is_empty() {
        return Err(ValidationError { issues });
    }

    Ok(CalculatorSpec {
        slug,
        // `title` is present whenever no issue was recorded.
        title: title.unwrap_or_default(),
        description: non_blank(raw.description),
        lang,
        inputs,
        outputs,
        steps,
    })
}

fn parse_raw(source: &str, format: SpecFormat) -> Result<RawSpec, Issue> {
    if source.trim().is_empty() {
        return Err(Issue::document("document is empty"));
    }
    match format {
        SpecFormat::Json => serde_json::from_str(source)
            .map_err(|e| Issue::document(format!("invalid JSON: {}", e))),
        SpecFormat::Yaml => serde_yaml::from_str(source)
            .map_err(|e| Issue::document(format!("invalid YAML: {}", e))),
    }
}

fn normalize_input(index: usize, raw: RawInput, issues: &mut Vec<Issue>) -> Option<InputField> {
    let path = |key: &str| format!("inputs[{}].{}", index, key);

    let name = non_blank(raw.name).or_else(|| non_blank(raw.label));
    if name.is_none() {
        issues.push(Issue::new(path("name"), "name is required"));
    }

    let kind = match non_blank(raw.kind) {
        None => {
            issues.push(Issue::new(path("type"), "type is required"));
            None
        }
        Some(kind) => match kind.to_ascii_lowercase().as_str() {
            "number" | "numeric" => number_kind(
                raw.min,
                raw.max,
                raw.step,
                raw.default.as_ref(),
                &path,
                issues,
            ),
            "select" | "selectable" | "option" | "options" => {
                select_kind(raw.options, raw.default.as_ref(), &path, issues)
            }
            "text" | "string" | "free-text" => Some(FieldKind::Text {
                default: raw.default.as_ref().map(RawScalar::to_text).unwrap_or_default(),
                placeholder: non_blank(raw.placeholder),
            }),
            "boolean" | "bool" | "checkbox" => match raw.default {
                None => Some(FieldKind::Boolean { default: false }),
                Some(RawScalar::Bool(b)) => Some(FieldKind::Boolean { default: b }),
                Some(other) => {
                    issues.push(Issue::new(
                        path("default"),
                        format!("`{}` is not a boolean", other.to_text()),
                    ));
                    None
                }
            },
            other => {
                issues.push(Issue::new(
                    path("type"),
                    format!(
                        "unsupported type `{}` (expected number, select, text or boolean)",
                        other
                    ),
                ));
                None
            }
        },
    };

    Some(InputField {
        name: name?,
        kind: kind?,
        unit: non_blank(raw.unit),
        help: non_blank(raw.help),
    })
}

fn number_kind(
    min: Option<f64>,
    max: Option<f64>,
    step: Option<f64>,
    default: Option<&RawScalar>,
    path: &dyn Fn(&str) -> String,
    issues: &mut Vec<Issue>,
) -> Option<FieldKind> {
    let before = issues.len();

    for (key, value) in [("min", min), ("max", max), ("step", step)] {
        if matches!(value, Some(v) if !v.is_finite()) {
            issues.push(Issue::new(path(key), "must be a finite number"));
        }
    }
    if let (Some(lo), Some(hi)) = (min, max) {
        if lo > hi {
            issues.push(Issue::new(
                path("min"),
                format!(
                    "min ({}) is greater than max ({})",
                    format_number(lo),
                    format_number(hi)
                ),
            ));
        }
    }
    if matches!(step, Some(s) if s <= 0.0) {
        issues.push(Issue::new(path("step"), "step must be greater than zero"));
    }

    let default = match default {
        None => clamp_zero(min, max),
        Some(RawScalar::Number(n)) if n.is_finite() => {
            let below = matches!(min, Some(lo) if *n < lo);
            let above = matches!(max, Some(hi) if *n > hi);
            if below || above {
                issues.push(Issue::new(
                    path("default"),
                    format!("default {} is outside the allowed range", format_number(*n)),
                ));
            }
            *n
        }
        Some(other) => {
            issues.push(Issue::new(
                path("default"),
                format!("`{}` is not a number", other.to_text()),
            ));
            0.0
        }
    };

    (issues.len() == before).then_some(FieldKind::Number {
        min,
        max,
        step,
        default,
    })
}

/// `0` pulled into `[min, max]`.
fn clamp_zero(min: Option<f64>, max: Option<f64>) -> f64 {
    match (min, max) {
        (Some(lo), _) if lo > 0.0 => lo,
        (_, Some(hi)) if hi < 0.0 => hi,
        _ => 0.0,
    }
}

fn select_kind(
    options: Option<Vec<RawOption>>,
    default: Option<&RawScalar>,
    path: &dyn Fn(&str) -> String,
    issues: &mut Vec<Issue>,
) -> Option<FieldKind> {
    let options: Vec<SelectOption> = options
        .unwrap_or_default()
        .into_iter()
        .map(|option| match option {
            RawOption::Scalar(value) => {
                let value = value.to_text();
                SelectOption {
                    label: value.clone(),
                    value,
                }
            }
            RawOption::Pair { label, value } => {
                let value = value.to_text();
                SelectOption {
                    label: non_blank(label).unwrap_or_else(|| value.clone()),
                    value,
                }
            }
        })
        .collect();

    let Some(first) = options.first() else {
        issues.push(Issue::new(
            path("options"),
            "a select field needs at least one option",
        ));
        return None;
    };

    let default = match default {
        None => first.value.clone(),
        Some(value) => {
            let value = value.to_text();
            if !options.iter().any(|o| o.value == value) {
                issues.push(Issue::new(
                    path("default"),
                    format!("default `{}` is not one of the option values", value),
                ));
                return None;
            }
            value
        }
    };

    Some(FieldKind::Select { options, default })
}

fn normalize_outputs(raw: Vec<RawOutput>, issues: &mut Vec<Issue>) -> Vec<OutputField> {
    let mut seen = HashSet::new();
    let mut outputs = Vec::new();

    for (i, output) in raw.into_iter().enumerate() {
        let Some(name) = non_blank(output.name) else {
            issues.push(Issue::new(format!("outputs[{}].name", i), "name is required"));
            continue;
        };
        if !seen.insert(name.clone()) {
            issues.push(Issue::new(
                format!("outputs[{}].name", i),
                format!("duplicate output name `{}`", name),
            ));
            continue;
        }
        let precision = match output.precision {
            None => None,
            Some(p) if (0..=MAX_PRECISION).contains(&p) => Some(p as u8),
            Some(p) => {
                issues.push(Issue::new(
                    format!("outputs[{}].precision", i),
                    format!("precision {} is outside 0..={}", p, MAX_PRECISION),
                ));
                continue;
            }
        };
        outputs.push(OutputField {
            label: non_blank(output.label).unwrap_or_else(|| name.clone()),
            name,
            unit: non_blank(output.unit),
            precision,
        });
    }

    outputs
}

/// Lower-case ASCII alphanumerics joined by single dashes.
///
/// Common Latin accents are folded first (`Cálculo de Año` -> `calculo-de-ano`).
pub fn slugify(text: &str) -> String {
    let mut slug = String::new();
    let mut pending_dash = false;

    for c in text.chars() {
        let folded = fold_accent(c);
        for c in folded.chars() {
            if c.is_ascii_alphanumeric() {
                if pending_dash && !slug.is_empty() {
                    slug.push('-');
                }
                pending_dash = false;
                slug.push(c.to_ascii_lowercase());
            } else {
                pending_dash = true;
            }
        }
    }

    slug
}

fn fold_accent(c: char) -> String {
    let folded = match c {
        'á' | 'à' | 'â' | 'ä' | 'ã' => "a",
        'Á' | 'À' | 'Â' | 'Ä' | 'Ã' => "A",
        'é' | 'è' | 'ê' | 'ë' => "e",
        'É' | 'È' | 'Ê' | 'Ë' => "E",
        'í' | 'ì' | 'î' | 'ï' => "i",
        'Í' | 'Ì' | 'Î' | 'Ï' => "I",
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' => "o",
        'Ó' | 'Ò' | 'Ô' | 'Ö' | 'Õ' => "O",
        'ú' | 'ù' | 'û' | 'ü' => "u",
        'Ú' | 'Ù' | 'Û' | 'Ü' => "U",
        'ñ' => "n",
        'Ñ' => "N",
        'ç' => "c",
        'Ç' => "C",
        _ => return c.to_string(),
    };
    folded.to_string()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(source: &str) -> Result<CalculatorSpec, ValidationError> {
        normalize(source, SpecFormat::Yaml, &NormalizeSettings::default())
    }

    fn fields(err: &ValidationError) -> Vec<String> {
        err.issues
            .iter()
            .map(|i| i.field.clone().unwrap_or_default())
            .collect()
    }

    #[test]
    fn test_minimal_spec_gets_defaults() {
        let spec = yaml(
            r#"
title: Mortgage Calc
inputs:
  - name: Loan Amount
    type: numeric
  - name: Term
    type: select
    options: [15, 30]
outputs:
  - name: Monthly Payment
"#,
        )
        .unwrap();

        assert_eq!(spec.slug, "mortgage-calc");
        assert_eq!(spec.lang, "es");
        assert_eq!(
            spec.inputs[0].kind,
            FieldKind::Number {
                min: None,
                max: None,
                step: None,
                default: 0.0
            }
        );
        match &spec.inputs[1].kind {
            FieldKind::Select { options, default } => {
                assert_eq!(options.len(), 2);
                assert_eq!(default, "15");
            }
            other => panic!("unexpected kind {:?}", other),
        }
        assert_eq!(spec.outputs[0].label, "Monthly Payment");
    }

    #[test]
    fn test_json_document() {
        let spec = normalize(
            r#"{"title": "IVA", "lang": "es-MX", "inputs": [{"name": "Base", "type": "number", "min": 0}]}"#,
            SpecFormat::Json,
            &NormalizeSettings::default(),
        )
        .unwrap();
        assert_eq!(spec.slug, "iva");
        assert_eq!(spec.lang, "es-MX");
    }

    #[test]
    fn test_collects_all_issues() {
        let err = yaml(
            r#"
lang: "not a locale"
inputs:
  - name: Rate
    type: number
    min: 10
    max: 1
  - name: Plan
    type: select
  - type: slider
outputs:
  - name: Total
  - name: Total
"#,
        )
        .unwrap_err();

        let fields = fields(&err);
        assert!(fields.contains(&"title".to_string()));
        assert!(fields.contains(&"lang".to_string()));
        assert!(fields.contains(&"inputs[0].min".to_string()));
        assert!(fields.contains(&"inputs[1].options".to_string()));
        assert!(fields.contains(&"inputs[2].name".to_string()));
        assert!(fields.contains(&"inputs[2].type".to_string()));
        assert!(fields.contains(&"outputs[1].name".to_string()));
    }

    #[test]
    fn test_duplicate_input_names() {
        let err = yaml(
            "title: T\ninputs:\n  - {name: Tasa, type: number}\n  - {name: Tasa, type: number}\n",
        )
        .unwrap_err();
        assert_eq!(fields(&err), vec!["inputs[1].name".to_string()]);
    }

    #[test]
    fn test_similar_labels_are_allowed() {
        let spec = yaml(
            "title: T\ninputs:\n  - {name: Tasa %, type: number}\n  - {name: Tasa-%, type: number}\n",
        )
        .unwrap();
        assert_eq!(spec.inputs.len(), 2);
    }

    #[test]
    fn test_requires_an_input() {
        let err = yaml("title: Empty\ninputs: []\n").unwrap_err();
        assert_eq!(fields(&err), vec!["inputs".to_string()]);
    }

    #[test]
    fn test_unparseable_document_is_one_issue() {
        let err = yaml("title: [unclosed").unwrap_err();
        assert_eq!(err.issues.len(), 1);
        assert!(err.issues[0].field.is_none());
        assert!(err.issues[0].message.starts_with("invalid YAML"));
    }

    #[test]
    fn test_numeric_default_clamped_into_bounds() {
        let spec = yaml("title: T\ninputs:\n  - {name: Años, type: number, min: 1, max: 40}\n").unwrap();
        match spec.inputs[0].kind {
            FieldKind::Number { default, .. } => assert_eq!(default, 1.0),
            _ => panic!("expected number"),
        }
    }

    #[test]
    fn test_select_default_must_be_an_option() {
        let err = yaml(
            "title: T\ninputs:\n  - {name: Plan, type: select, options: [a, b], default: c}\n",
        )
        .unwrap_err();
        assert_eq!(fields(&err), vec!["inputs[0].default".to_string()]);
    }

    #[test]
    fn test_slug_without_letters() {
        let err = yaml("title: \"%%%\"\ninputs:\n  - {name: A, type: text}\n").unwrap_err();
        assert_eq!(fields(&err), vec!["title".to_string()]);
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Mortgage Calc"), "mortgage-calc");
        assert_eq!(slugify("  Cálculo de Año -- 2024 "), "calculo-de-ano-2024");
        assert_eq!(slugify("IVA_Reducido"), "iva-reducido");
        assert_eq!(slugify("%%"), "");
    }
}
