//! JSX fragments, one pure function per field variant.
//!
//! Each function returns the fragment's lines with indentation relative to the
//! fragment itself; the caller decides where the block sits. Labels, values and
//! units are always separate elements, and a unit element only exists when the
//! field has a unit.

use super::literal::{jsx_attr, jsx_text, number, quote};
use crate::ident::Identifier;
use crate::spec::{FieldKind, InputField, OutputField, SelectOption};

/// Initial `useState` argument for a field.
pub fn initial_value(kind: &FieldKind) -> String {
    match kind {
        FieldKind::Number { default, .. } => number(*default),
        FieldKind::Select { default, .. } => quote(default),
        FieldKind::Text { default, .. } => quote(default),
        FieldKind::Boolean { default } => default.to_string(),
    }
}

/// The control for one input, dispatched on its kind.
pub fn input_fragment(field: &InputField, id: &Identifier, dom_id: &str) -> Vec<String> {
    let mut lines = vec!["<div className=\"calc-field\">".to_string()];

    let control = match &field.kind {
        FieldKind::Number {
            min, max, step, ..
        } => number_control(id, dom_id, *min, *max, *step),
        FieldKind::Select { options, .. } => select_control(id, dom_id, options),
        FieldKind::Text { placeholder, .. } => text_control(id, dom_id, placeholder.as_deref()),
        FieldKind::Boolean { .. } => boolean_control(id, dom_id),
    };

    // Checkboxes read better with the label after the box.
    let label = format!(
        "<label {}>{}</label>",
        jsx_attr("htmlFor", dom_id),
        jsx_text(&field.name)
    );
    let label_first = !matches!(field.kind, FieldKind::Boolean { .. });
    if label_first {
        lines.push(indent(&label));
    }
    lines.extend(control.iter().map(|l| indent(l)));
    if !label_first {
        lines.push(indent(&label));
    }

    if let Some(unit) = &field.unit {
        lines.push(indent(&unit_span(unit)));
    }
    if let Some(help) = &field.help {
        lines.push(indent(&format!("<p className=\"calc-help\">{}</p>", jsx_text(help))));
    }

    lines.push("</div>".to_string());
    lines
}

fn number_control(
    id: &Identifier,
    dom_id: &str,
    min: Option<f64>,
    max: Option<f64>,
    step: Option<f64>,
) -> Vec<String> {
    let mut lines = vec![
        "<input".to_string(),
        indent(&jsx_attr("id", dom_id)),
        indent("type=\"number\""),
        indent("inputMode=\"decimal\""),
        indent(&format!("value={{{}}}", id.name)),
    ];
    for (attr, value) in [("min", min), ("max", max), ("step", step)] {
        if let Some(value) = value {
            lines.push(indent(&format!("{}={{{}}}", attr, number(value))));
        }
    }
    lines.push(indent(&format!(
        "onChange={{(e) => {}(e.target.value === \"\" ? \"\" : Number(e.target.value))}}",
        id.setter
    )));
    lines.push("/>".to_string());
    lines
}

fn select_control(id: &Identifier, dom_id: &str, options: &[SelectOption]) -> Vec<String> {
    let mut lines = vec![
        "<select".to_string(),
        indent(&jsx_attr("id", dom_id)),
        indent(&format!("value={{{}}}", id.name)),
        indent(&format!("onChange={{(e) => {}(e.target.value)}}", id.setter)),
        ">".to_string(),
    ];
    for option in options {
        lines.push(indent(&format!(
            "<option {}>{}</option>",
            jsx_attr("value", &option.value),
            jsx_text(&option.label)
        )));
    }
    lines.push("</select>".to_string());
    lines
}

fn text_control(id: &Identifier, dom_id: &str, placeholder: Option<&str>) -> Vec<String> {
    let mut lines = vec![
        "<input".to_string(),
        indent(&jsx_attr("id", dom_id)),
        indent("type=\"text\""),
        indent(&format!("value={{{}}}", id.name)),
    ];
    if let Some(placeholder) = placeholder {
        lines.push(indent(&jsx_attr("placeholder", placeholder)));
    }
    lines.push(indent(&format!(
        "onChange={{(e) => {}(e.target.value)}}",
        id.setter
    )));
    lines.push("/>".to_string());
    lines
}

fn boolean_control(id: &Identifier, dom_id: &str) -> Vec<String> {
    vec![
        "<input".to_string(),
        indent(&jsx_attr("id", dom_id)),
        indent("type=\"checkbox\""),
        indent(&format!("checked={{{}}}", id.name)),
        indent(&format!(
            "onChange={{(e) => {}(e.target.checked)}}",
            id.setter
        )),
        "/>".to_string(),
    ]
}

/// The display row for one computed value.
pub fn output_fragment(output: &OutputField) -> Vec<String> {
    let precision = output
        .precision
        .map(|p| format!(", {}", p))
        .unwrap_or_default();

    let mut lines = vec![
        "<div className=\"calc-output\">".to_string(),
        indent(&format!(
            "<span className=\"calc-output-label\">{}</span>",
            jsx_text(&output.label)
        )),
        indent(&format!(
            "<output className=\"calc-output-value\">{{formatValue(results[{}]{})}}</output>",
            quote(&output.name),
            precision
        )),
    ];
    if let Some(unit) = &output.unit {
        lines.push(indent(&unit_span(unit)));
    }
    lines.push("</div>".to_string());
    lines
}

/// Ordered list of explanatory steps, or nothing.
pub fn steps_fragment(steps: &[String]) -> Vec<String> {
    if steps.is_empty() {
        return Vec::new();
    }
    let mut lines = vec!["<ol className=\"calc-steps\">".to_string()];
    lines.extend(
        steps
            .iter()
            .map(|step| indent(&format!("<li>{}</li>", jsx_text(step)))),
    );
    lines.push("</ol>".to_string());
    lines
}

fn unit_span(unit: &str) -> String {
    format!("<span className=\"calc-unit\">{}</span>", jsx_text(unit))
}

pub(crate) fn indent(line: &str) -> String {
    format!("  {}", line)
}
