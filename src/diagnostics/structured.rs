//! ESLint JSON formatter output.

use serde::Deserialize;
use std::path::Path;

use super::{display_path, Diagnostic, Severity};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileResult {
    file_path: String,
    #[serde(default)]
    messages: Vec<Message>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Message {
    rule_id: Option<String>,
    #[serde(default)]
    severity: i64,
    message: String,
    line: Option<u32>,
    column: Option<u32>,
    #[serde(default)]
    fatal: bool,
}

/// Parse ESLint's `-f json` payload.
///
/// The payload is looked for first as the whole output, then between the
/// first `[` and the last `]`, since `npx` and some plugins print notices
/// around it. The error is a human-readable reason used for the degraded mode.
pub fn parse_eslint(tool: &str, stdout: &str, base: Option<&Path>) -> Result<Vec<Diagnostic>, String> {
    let results = locate_payload(stdout)?;

    let mut diagnostics = Vec::new();
    for result in results {
        let file = display_path(&result.file_path, base);
        for message in result.messages {
            let severity = if message.fatal {
                Severity::Error
            } else {
                Severity::from_level(message.severity)
            };
            diagnostics.push(Diagnostic::new(
                tool,
                &file,
                message.line,
                message.column,
                message.rule_id.as_deref(),
                severity,
                &message.message,
            ));
        }
    }
    Ok(diagnostics)
}

fn locate_payload(stdout: &str) -> Result<Vec<FileResult>, String> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return Err("no JSON payload in output".to_string());
    }

    let whole_err = match serde_json::from_str::<Vec<FileResult>>(trimmed) {
        Ok(results) => return Ok(results),
        Err(e) => e,
    };

    if let (Some(start), Some(end)) = (trimmed.find('['), trimmed.rfind(']')) {
        if start < end {
            if let Ok(results) = serde_json::from_str::<Vec<FileResult>>(&trimmed[start..=end]) {
                return Ok(results);
            }
        }
    }

    Err(format!("unreadable JSON payload: {}", whole_err))
}
