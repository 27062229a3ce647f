//! Component synthesis: calculator spec in, `.jsx` module text out.
//!
//! The generated module is a React function component with one piece of
//! state per input, a call into the site's formulas module for the results,
//! and two action handlers (save to `localStorage`, export as a text
//! document). The output is a pure function of the spec and the
//! [`SynthOptions`]: no timestamps, no environment lookups, so regenerating an
//! unchanged spec reproduces the same bytes.

pub mod fragments;
pub mod literal;

use crate::error::SynthesisError;
use crate::ident::{self, Identifier, IdentifierSet};
use crate::spec::{CalculatorSpec, FieldKind};
use literal::{jsx_attr, jsx_text, quote};

/// Extension of generated artifacts.
pub const ARTIFACT_EXTENSION: &str = "jsx";

/// Names the generated module declares itself; input identifiers must avoid them.
const COMPONENT_LOCALS: &[&str] = &[
    "useState",
    "compute",
    "URL",
    "Blob",
    "localStorage",
    "formatValue",
    "STORAGE_KEY",
    "EXPORT_NAME",
    "TITLE",
    "FIELDS",
    "OUTPUTS",
    "values",
    "results",
    "handleSave",
    "handleExport",
    "lines",
    "blob",
    "url",
    "link",
    "field",
    "output",
    "error",
    "e",
];

#[derive(Debug, Clone)]
pub struct SynthOptions {
    /// Module path prefix the `compute` import is resolved against.
    pub formulas_import: String,
    /// Spec file name recorded in the header comment.
    pub source_name: Option<String>,
}

impl Default for SynthOptions {
    fn default() -> Self {
        Self {
            formulas_import: "../formulas".to_string(),
            source_name: None,
        }
    }
}

/// File name of the artifact generated for `spec`.
pub fn artifact_file_name(spec: &CalculatorSpec) -> String {
    format!("{}.{}", spec.slug, ARTIFACT_EXTENSION)
}

/// PascalCase component name derived from the slug.
pub fn component_name(slug: &str) -> Option<String> {
    let mut name: String = slug
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect();

    if name.is_empty() {
        return None;
    }
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert_str(0, "Calc");
    }
    if ident::is_reserved(&name) || COMPONENT_LOCALS.contains(&name.as_str()) {
        name.push_str("Calculator");
    }
    Some(name)
}

/// Identifiers for every input of `spec`, in field order.
pub fn identifiers(spec: &CalculatorSpec, component: &str) -> Vec<Identifier> {
    let mut set = IdentifierSet::with_reserved(
        COMPONENT_LOCALS
            .iter()
            .map(|s| s.to_string())
            .chain(std::iter::once(component.to_string())),
    );
    spec.inputs.iter().map(|f| set.issue(&f.name)).collect()
}

/// Generate the component module for `spec`.
pub fn synthesize(spec: &CalculatorSpec, options: &SynthOptions) -> Result<String, SynthesisError> {
    if spec.inputs.is_empty() {
        return Err(SynthesisError::NoInputs);
    }
    for field in &spec.inputs {
        if let FieldKind::Select { options, .. } = &field.kind {
            if options.is_empty() {
                return Err(SynthesisError::EmptyOptions {
                    field: field.name.clone(),
                });
            }
        }
    }
    let component = component_name(&spec.slug)
        .ok_or_else(|| SynthesisError::EmptyComponentName(spec.slug.clone()))?;
    let ids = identifiers(spec, &component);

    let mut out = Emitter::default();
    emit_header(&mut out, spec, options);
    emit_constants(&mut out, spec);
    emit_format_helper(&mut out);

    out.line(&format!("export default function {}() {{", component));
    out.push();
    emit_state(&mut out, spec, &ids);
    emit_handlers(&mut out);
    emit_markup(&mut out, spec, &ids);
    out.pop();
    out.line("}");

    Ok(out.finish())
}

fn emit_header(out: &mut Emitter, spec: &CalculatorSpec, options: &SynthOptions) {
    match &options.source_name {
        Some(source) => out.line(&format!(
            "// Generated by calcforge from {}. Do not edit by hand.",
            quote(source)
        )),
        None => out.line("// Generated by calcforge. Do not edit by hand."),
    }
    out.line("import { useState } from \"react\";");
    let module = format!(
        "{}/{}",
        options.formulas_import.trim_end_matches('/'),
        spec.slug
    );
    out.line(&format!("import {{ compute }} from {};", quote(&module)));
    out.blank();
}

fn emit_constants(out: &mut Emitter, spec: &CalculatorSpec) {
    out.line(&format!(
        "const STORAGE_KEY = {};",
        quote(&format!("calcforge:{}", spec.slug))
    ));
    out.line(&format!(
        "const EXPORT_NAME = {};",
        quote(&format!("{}.txt", spec.slug))
    ));
    out.line(&format!("const TITLE = {};", quote(&spec.title)));
    out.blank();

    out.line("const FIELDS = [");
    out.push();
    for field in &spec.inputs {
        out.line(&format!(
            "{{ key: {}, unit: {} }},",
            quote(&field.name),
            optional(field.unit.as_deref())
        ));
    }
    out.pop();
    out.line("];");
    out.blank();

    out.line("const OUTPUTS = [");
    out.push();
    for output in &spec.outputs {
        let precision = output
            .precision
            .map(|p| p.to_string())
            .unwrap_or_else(|| "undefined".to_string());
        out.line(&format!(
            "{{ key: {}, label: {}, unit: {}, precision: {} }},",
            quote(&output.name),
            quote(&output.label),
            optional(output.unit.as_deref()),
            precision
        ));
    }
    out.pop();
    out.line("];");
    out.blank();
}

fn emit_format_helper(out: &mut Emitter) {
    out.raw(
        r#"function formatValue(value, precision) {
  if (typeof value === "number" && Number.isFinite(value)) {
    return precision === undefined ? String(value) : value.toFixed(precision);
  }
  return value === undefined || value === null ? "" : String(value);
}
"#,
    );
    out.blank();
}

fn emit_state(out: &mut Emitter, spec: &CalculatorSpec, ids: &[Identifier]) {
    for (field, id) in spec.inputs.iter().zip(ids) {
        out.line(&format!(
            "const [{}, {}] = useState({});",
            id.name,
            id.setter,
            fragments::initial_value(&field.kind)
        ));
    }
    out.blank();

    out.line("const values = {");
    out.push();
    for (field, id) in spec.inputs.iter().zip(ids) {
        out.line(&format!("{}: {},", quote(&field.name), id.name));
    }
    out.pop();
    out.line("};");
    out.line("const results = compute(values) ?? {};");
    out.blank();
}

fn emit_handlers(out: &mut Emitter) {
    for line in HANDLERS.lines() {
        out.line(line);
    }
    out.blank();
}

const HANDLERS: &str = r#"const handleSave = () => {
  try {
    window.localStorage.setItem(STORAGE_KEY, JSON.stringify(values));
  } catch (error) {
    console.error(error);
  }
};

const handleExport = () => {
  const lines = [TITLE, ""];
  for (const field of FIELDS) {
    lines.push([field.key, String(values[field.key]), field.unit].filter(Boolean).join(" "));
  }
  lines.push("");
  for (const output of OUTPUTS) {
    lines.push(
      [output.label, formatValue(results[output.key], output.precision), output.unit]
        .filter(Boolean)
        .join(" ")
    );
  }
  const blob = new Blob([lines.join("\n")], { type: "text/plain;charset=utf-8" });
  const url = URL.createObjectURL(blob);
  const link = document.createElement("a");
  link.href = url;
  link.download = EXPORT_NAME;
  link.click();
  URL.revokeObjectURL(url);
};"#;

fn emit_markup(out: &mut Emitter, spec: &CalculatorSpec, ids: &[Identifier]) {
    out.line("return (");
    out.push();
    out.line(&format!("<section className=\"calc\" {}>", jsx_attr("lang", &spec.lang)));
    out.push();
    out.line(&format!("<h2 className=\"calc-title\">{}</h2>", jsx_text(&spec.title)));
    if let Some(description) = &spec.description {
        out.line(&format!(
            "<p className=\"calc-description\">{}</p>",
            jsx_text(description)
        ));
    }

    out.line("<form className=\"calc-inputs\" onSubmit={(e) => e.preventDefault()}>");
    out.push();
    for (field, id) in spec.inputs.iter().zip(ids) {
        let dom_id = format!("calc-{}-{}", spec.slug, id.name);
        out.block(&fragments::input_fragment(field, id, &dom_id));
    }
    out.pop();
    out.line("</form>");

    if !spec.outputs.is_empty() {
        out.line("<div className=\"calc-outputs\" aria-live=\"polite\">");
        out.push();
        for output in &spec.outputs {
            out.block(&fragments::output_fragment(output));
        }
        out.pop();
        out.line("</div>");
    }

    out.block(&fragments::steps_fragment(&spec.steps));

    out.line("<div className=\"calc-actions\">");
    out.push();
    out.line("<button type=\"button\" onClick={handleSave}>Guardar</button>");
    out.line("<button type=\"button\" onClick={handleExport}>Exportar</button>");
    out.pop();
    out.line("</div>");

    out.pop();
    out.line("</section>");
    out.pop();
    out.line(");");
}

fn optional(value: Option<&str>) -> String {
    value.map(quote).unwrap_or_else(|| "null".to_string())
}

/// Indentation-aware line buffer.
#[derive(Default)]
struct Emitter {
    buf: String,
    depth: usize,
}

impl Emitter {
    fn line(&mut self, line: &str) {
        if line.is_empty() {
            self.buf.push('\n');
            return;
        }
        for _ in 0..self.depth {
            self.buf.push_str("  ");
        }
        self.buf.push_str(line);
        self.buf.push('\n');
    }

    fn block(&mut self, lines: &[String]) {
        for line in lines {
            self.line(line);
        }
    }

    /// Pre-formatted text at column zero.
    fn raw(&mut self, text: &str) {
        self.buf.push_str(text);
    }

    fn blank(&mut self) {
        if !self.buf.ends_with("\n\n") {
            self.buf.push('\n');
        }
    }

    fn push(&mut self) {
        self.depth += 1;
    }

    fn pop(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    fn finish(self) -> String {
        let mut text = self.buf;
        while text.ends_with("\n\n") {
            text.pop();
        }
        text
    }
}
