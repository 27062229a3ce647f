//! JSON and HTML renderings of an [`AggregateReport`].

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tera::Tera;

use super::{AggregateReport, Ranked, ToolSummary, Totals};
use crate::error::ReportError;

pub const JSON_FILE: &str = "diagnostics.json";
pub const HTML_FILE: &str = "diagnostics.html";

const REPORT_HTML: &str = include_str!("../../templates/report/report.html");

/// JSON document: the report plus its rankings.
#[derive(Serialize)]
struct Document<'a> {
    generated_at: &'a str,
    #[serde(flatten)]
    report: &'a AggregateReport,
    top_files: Vec<Ranked>,
    top_rules: Vec<Ranked>,
}

pub fn to_json(report: &AggregateReport, top: usize, generated_at: &str) -> Result<String, ReportError> {
    let document = Document {
        generated_at,
        report,
        top_files: report.top_files(top),
        top_rules: report.top_rules(top),
    };
    Ok(serde_json::to_string_pretty(&document)?)
}

#[derive(Serialize)]
struct HtmlPage<'a> {
    generated_at: &'a str,
    totals: &'a Totals,
    tools: Vec<ToolRow<'a>>,
    top_files: Vec<Ranked>,
    top_rules: Vec<Ranked>,
    files: Vec<FileSection<'a>>,
}

#[derive(Serialize)]
struct ToolRow<'a> {
    summary: &'a ToolSummary,
    status: String,
}

#[derive(Serialize)]
struct FileSection<'a> {
    file: &'a str,
    errors: usize,
    warnings: usize,
    rows: Vec<DiagnosticRow<'a>>,
}

#[derive(Serialize)]
struct DiagnosticRow<'a> {
    location: String,
    severity: String,
    code: &'a str,
    message: &'a str,
    tool: &'a str,
}

/// Render the HTML page. Every value is escaped by the template engine.
pub fn to_html(report: &AggregateReport, top: usize, generated_at: &str) -> Result<String, ReportError> {
    let mut tera = Tera::default();
    tera.add_raw_template("report.html", REPORT_HTML)?;

    // Sections are built as a list: template maps do not keep insertion order.
    let files = report
        .by_file
        .iter()
        .map(|(file, entry)| FileSection {
            file,
            errors: entry.counts.errors,
            warnings: entry.counts.warnings,
            rows: entry
                .diagnostics
                .iter()
                .map(|d| DiagnosticRow {
                    location: match (d.line, d.column) {
                        (Some(line), Some(column)) => format!("{}:{}", line, column),
                        (Some(line), None) => line.to_string(),
                        _ => String::new(),
                    },
                    severity: d.severity.to_string(),
                    code: &d.code,
                    message: &d.message,
                    tool: &d.tool,
                })
                .collect(),
        })
        .collect();

    let page = HtmlPage {
        generated_at,
        totals: &report.totals,
        tools: report
            .tools
            .iter()
            .map(|summary| ToolRow {
                summary,
                status: summary.status(),
            })
            .collect(),
        top_files: report.top_files(top),
        top_rules: report.top_rules(top),
        files,
    };

    let context = tera::Context::from_serialize(&page)?;
    Ok(tera.render("report.html", &context)?)
}

/// Paths of the files written by [`write`].
#[derive(Debug, Clone)]
pub struct ReportPaths {
    pub json: PathBuf,
    pub html: PathBuf,
}

/// Write both renderings into `dir`, creating it if needed.
pub fn write(report: &AggregateReport, dir: &Path, top: usize, generated_at: &str) -> Result<ReportPaths, ReportError> {
    fs::create_dir_all(dir).map_err(|source| ReportError::Write {
        path: dir.to_path_buf(),
        source,
    })?;

    let paths = ReportPaths {
        json: dir.join(JSON_FILE),
        html: dir.join(HTML_FILE),
    };
    let json = to_json(report, top, generated_at)?;
    let html = to_html(report, top, generated_at)?;

    for (path, content) in [(&paths.json, json), (&paths.html, html)] {
        fs::write(path, content).map_err(|source| ReportError::Write {
            path: path.clone(),
            source,
        })?;
    }

    Ok(paths)
}
