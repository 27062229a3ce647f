//! Line-oriented compiler output.
//!
//! Recognized shapes:
//!
//! ```text
//! src/a.tsx(12,5): error TS2322: Type 'string' is not assignable to type 'number'.
//! src/a.ts:12:5 - error TS2304: Cannot find name 'x'.
//! src/a.js:12:5: warning Unexpected console statement
//! ```
//!
//! Lines that match none of them are ignored.

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

use super::{display_path, Diagnostic, Severity};
use crate::tools::ToolOutput;

static DIAGNOSTIC_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<file>[^\s(][^(]*?)(?:\((?P<line>\d+),(?P<col>\d+)\)|:(?P<line2>\d+):(?P<col2>\d+))\s*[:-]?\s*(?P<sev>(?i:error|warning))\b\s*(?:(?P<code>[A-Z]+\d+)\s*)?:?\s*(?P<msg>.+)$",
    )
    .expect("valid regex")
});

static ANSI_ESCAPE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\x1b\[[0-9;]*[A-Za-z]").expect("valid regex"));

/// Diagnostics from both streams, stdout first.
pub fn parse_lines(tool: &str, output: &ToolOutput, base: Option<&Path>) -> Vec<Diagnostic> {
    output
        .stdout
        .lines()
        .chain(output.stderr.lines())
        .filter_map(|line| parse_line(tool, line, base))
        .collect()
}

/// Parse a single line, if it is a diagnostic.
pub fn parse_line(tool: &str, line: &str, base: Option<&Path>) -> Option<Diagnostic> {
    let line = ANSI_ESCAPE.replace_all(line.trim_end(), "");
    let caps = DIAGNOSTIC_LINE.captures(line.trim_start())?;

    let number = |a: &str, b: &str| {
        caps.name(a)
            .or_else(|| caps.name(b))
            .and_then(|m| m.as_str().parse::<u32>().ok())
    };
    let file = display_path(&caps["file"], base);

    Some(Diagnostic::new(
        tool,
        &file,
        number("line", "line2"),
        number("col", "col2"),
        caps.name("code").map(|m| m.as_str()),
        Severity::from_word(&caps["sev"]),
        &caps["msg"],
    ))
}
