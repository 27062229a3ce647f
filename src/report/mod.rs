//! Aggregation of diagnostics into one report.
//!
//! [`AggregateReport`] is always rebuilt from scratch from the diagnostics of
//! one check run. Maps keep discovery order; rankings are derived from them
//! with [`top_n`] when the report is rendered.

pub mod render;

use indexmap::IndexMap;
use serde::Serialize;

use crate::diagnostics::{Diagnostic, Severity};
use crate::output::Output;
use crate::tools::ToolRun;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counts {
    pub errors: usize,
    pub warnings: usize,
}

impl Counts {
    fn record(&mut self, severity: Severity) {
        match severity {
            Severity::Error => self.errors += 1,
            Severity::Warning => self.warnings += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.errors + self.warnings
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    /// Distinct files with at least one diagnostic
    pub files: usize,
    pub errors: usize,
    pub warnings: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FileEntry {
    #[serde(flatten)]
    pub counts: Counts,
    pub diagnostics: Vec<Diagnostic>,
}

/// Outcome of one tool in a check run.
#[derive(Debug, Clone, Serialize)]
pub struct ToolSummary {
    pub name: String,
    pub command: String,
    pub exit_code: Option<i32>,
    pub duration_ms: u64,
    pub errors: usize,
    pub warnings: usize,
    /// `structured`, `lines`, `degraded` or `skipped`
    pub parse_mode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degraded_reason: Option<String>,
    /// Why the tool could not be run; no diagnostics are recorded then
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fault: Option<String>,
}

impl ToolSummary {
    /// Short status for tables: `ok`, `exit N`, `signal` or `fault`.
    pub fn status(&self) -> String {
        if self.fault.is_some() {
            return "fault".to_string();
        }
        match self.exit_code {
            Some(0) => "ok".to_string(),
            Some(code) => format!("exit {}", code),
            None => "signal".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AggregateReport {
    pub totals: Totals,
    pub by_rule: IndexMap<String, Counts>,
    pub by_file: IndexMap<String, FileEntry>,
    pub tools: Vec<ToolSummary>,
}

/// One line of a ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ranked {
    pub name: String,
    pub errors: usize,
    pub warnings: usize,
    pub total: usize,
}

impl AggregateReport {
    pub fn build(diagnostics: Vec<Diagnostic>, tools: Vec<ToolSummary>) -> Self {
        let mut report = Self {
            tools,
            ..Self::default()
        };

        for diagnostic in diagnostics {
            match diagnostic.severity {
                Severity::Error => report.totals.errors += 1,
                Severity::Warning => report.totals.warnings += 1,
            }
            report
                .by_rule
                .entry(diagnostic.code.clone())
                .or_default()
                .record(diagnostic.severity);

            let entry = report.by_file.entry(diagnostic.file.clone()).or_default();
            entry.counts.record(diagnostic.severity);
            entry.diagnostics.push(diagnostic);
        }
        report.totals.files = report.by_file.len();

        report
    }

    pub fn from_runs(runs: Vec<ToolRun>) -> Self {
        let mut diagnostics = Vec::new();
        let mut tools = Vec::with_capacity(runs.len());
        for run in runs {
            diagnostics.extend(run.diagnostics);
            tools.push(run.summary);
        }
        Self::build(diagnostics, tools)
    }

    pub fn top_files(&self, n: usize) -> Vec<Ranked> {
        top_n(&self.by_file, n, |entry| entry.counts.total())
            .into_iter()
            .map(|(name, entry)| ranked(name, &entry.counts))
            .collect()
    }

    pub fn top_rules(&self, n: usize) -> Vec<Ranked> {
        top_n(&self.by_rule, n, Counts::total)
            .into_iter()
            .map(|(name, counts)| ranked(name, counts))
            .collect()
    }

    /// Console summary: totals, per-tool status and top offenders.
    pub fn print_summary(&self, out: &Output, top: usize) {
        out.heading("Diagnostics");
        for tool in &self.tools {
            let line = format!(
                "{:<12} {:<8} {} errors, {} warnings ({} ms)",
                tool.name,
                tool.status(),
                tool.errors,
                tool.warnings,
                tool.duration_ms
            );
            match &tool.fault {
                Some(fault) => out.error(&format!("{}: {}", line, fault)),
                None => out.detail(&line),
            }
        }

        out.counter("files", self.totals.files);
        out.counter("errors", self.totals.errors);
        out.counter("warnings", self.totals.warnings);

        let files = self.top_files(top);
        if !files.is_empty() {
            out.heading("Top files");
            for entry in files {
                out.detail(&format!("{:>5}  {}", entry.total, entry.name));
            }
        }
        let rules = self.top_rules(top);
        if !rules.is_empty() {
            out.heading("Top rules");
            for entry in rules {
                out.detail(&format!("{:>5}  {}", entry.total, entry.name));
            }
        }
    }
}

fn ranked(name: &str, counts: &Counts) -> Ranked {
    Ranked {
        name: name.to_string(),
        errors: counts.errors,
        warnings: counts.warnings,
        total: counts.total(),
    }
}

/// The `n` entries with the highest count, highest first.
///
/// Ties keep discovery order. Entries with a zero count are left out.
pub fn top_n<'a, V, F>(map: &'a IndexMap<String, V>, n: usize, count: F) -> Vec<(&'a str, &'a V)>
where
    F: Fn(&V) -> usize,
{
    let mut entries: Vec<(&str, &V)> = map
        .iter()
        .filter(|(_, value)| count(*value) > 0)
        .map(|(key, value)| (key.as_str(), value))
        .collect();
    entries.sort_by(|a, b| count(b.1).cmp(&count(a.1)));
    entries.truncate(n);
    entries
}
