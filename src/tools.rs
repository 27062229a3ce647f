//! Running external analysis tools.
//!
//! A tool is an arbitrary program (linter, type-checker, bundler). It runs
//! with a fixed environment that disables colour, telemetry and interactive
//! prompts, with stdin closed and both output streams captured up to a cap.
//! A non-zero exit status is data, not an error.

use std::io::{self, Read};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use crate::diagnostics::{self, Diagnostic, Severity};
use crate::error::ToolError;
use crate::output::Output;
use crate::report::ToolSummary;

pub use crate::config::ToolConfig as ToolSpec;

/// Environment applied to every tool.
pub const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("CI", "1"),
    ("NO_COLOR", "1"),
    ("FORCE_COLOR", "0"),
    ("NEXT_TELEMETRY_DISABLED", "1"),
    ("ASTRO_TELEMETRY_DISABLED", "1"),
    ("NPM_CONFIG_UPDATE_NOTIFIER", "false"),
    ("NPM_CONFIG_FUND", "false"),
    ("NPM_CONFIG_AUDIT", "false"),
];

#[derive(Debug, Clone, Copy)]
pub struct InvokeSettings {
    /// Cap for each of stdout and stderr
    pub max_output_bytes: usize,
}

#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub duration: Duration,
}

impl ToolOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Something that can run a tool and capture its output.
pub trait Invoker {
    fn invoke(&self, tool: &ToolSpec) -> Result<ToolOutput, ToolError>;
}

/// Runs tools as child processes.
pub struct ProcessInvoker {
    pub settings: InvokeSettings,
}

impl Invoker for ProcessInvoker {
    fn invoke(&self, tool: &ToolSpec) -> Result<ToolOutput, ToolError> {
        invoke(tool, &self.settings)
    }
}

/// Run one tool to completion.
pub fn invoke(tool: &ToolSpec, settings: &InvokeSettings) -> Result<ToolOutput, ToolError> {
    let mut cmd = Command::new(&tool.program);
    cmd.args(&tool.args)
        .envs(ENV_OVERRIDES.iter().copied())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if let Some(cwd) = &tool.cwd {
        cmd.current_dir(cwd);
    }

    let started = Instant::now();
    let mut child = cmd.spawn().map_err(|source| ToolError::Spawn {
        program: tool.program.clone(),
        source,
    })?;

    let limit = settings.max_output_bytes;
    let (tx, rx) = mpsc::channel();
    if let Some(stdout) = child.stdout.take() {
        spawn_reader("stdout", stdout, limit, tx.clone());
    }
    if let Some(stderr) = child.stderr.take() {
        spawn_reader("stderr", stderr, limit, tx.clone());
    }
    drop(tx);

    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    for (stream, read) in rx {
        let bytes = match read {
            Ok(bytes) => bytes,
            Err(source) => {
                kill(&mut child);
                return Err(ToolError::Wait {
                    program: tool.program.clone(),
                    source,
                });
            }
        };
        if bytes.len() > limit {
            kill(&mut child);
            return Err(ToolError::OutputLimit { stream, limit });
        }
        match stream {
            "stdout" => stdout = bytes,
            _ => stderr = bytes,
        }
    }

    let status = child.wait().map_err(|source| ToolError::Wait {
        program: tool.program.clone(),
        source,
    })?;

    Ok(ToolOutput {
        exit_code: status.code(),
        stdout: String::from_utf8_lossy(&stdout).into_owned(),
        stderr: String::from_utf8_lossy(&stderr).into_owned(),
        duration: started.elapsed(),
    })
}

/// Read at most `limit + 1` bytes so an overflow is detectable without
/// buffering the rest.
fn spawn_reader<R>(
    stream: &'static str,
    reader: R,
    limit: usize,
    tx: mpsc::Sender<(&'static str, io::Result<Vec<u8>>)>,
) where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let mut buf = Vec::new();
        let read = reader
            .take(limit as u64 + 1)
            .read_to_end(&mut buf)
            .map(|_| buf);
        let _ = tx.send((stream, read));
    });
}

fn kill(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

/// Result of running one tool through the parser.
#[derive(Debug, Clone)]
pub struct ToolRun {
    pub diagnostics: Vec<Diagnostic>,
    pub summary: ToolSummary,
}

/// Run a tool and parse its output. Faults become part of the summary.
pub fn run_tool(tool: &ToolSpec, invoker: &dyn Invoker, out: &Output) -> ToolRun {
    out.step(&format!("Running {} ({})", tool.name, command_line(tool)));

    match invoker.invoke(tool) {
        Ok(output) => {
            let base = working_dir(tool);
            let parsed = diagnostics::parse(&tool.name, tool.parse, &output, base.as_deref());
            let errors = parsed
                .diagnostics
                .iter()
                .filter(|d| d.severity == Severity::Error)
                .count();
            let warnings = parsed.diagnostics.len() - errors;

            if let Some(reason) = parsed.mode.reason() {
                out.warn(&format!(
                    "{}: structured output unreadable, matched lines instead ({})",
                    tool.name, reason
                ));
            }
            if output.success() && parsed.diagnostics.is_empty() {
                out.success(&format!("{} passed", tool.name));
            } else {
                out.warn(&format!(
                    "{} finished with exit code {} ({} errors, {} warnings)",
                    tool.name,
                    output
                        .exit_code
                        .map_or_else(|| "none".to_string(), |c| c.to_string()),
                    errors,
                    warnings
                ));
            }

            ToolRun {
                summary: ToolSummary {
                    name: tool.name.clone(),
                    command: command_line(tool),
                    exit_code: output.exit_code,
                    duration_ms: output.duration.as_millis() as u64,
                    errors,
                    warnings,
                    parse_mode: parsed.mode.label().to_string(),
                    degraded_reason: parsed.mode.reason().map(str::to_string),
                    fault: None,
                },
                diagnostics: parsed.diagnostics,
            }
        }
        Err(e) => {
            out.error(&format!("{} could not be run: {}", tool.name, e));
            ToolRun {
                summary: ToolSummary {
                    name: tool.name.clone(),
                    command: command_line(tool),
                    exit_code: None,
                    duration_ms: 0,
                    errors: 0,
                    warnings: 0,
                    parse_mode: "skipped".to_string(),
                    degraded_reason: None,
                    fault: Some(e.to_string()),
                },
                diagnostics: Vec::new(),
            }
        }
    }
}

/// Run tools one after another.
pub fn run_tools(tools: &[ToolSpec], invoker: &dyn Invoker, out: &Output) -> Vec<ToolRun> {
    tools.iter().map(|tool| run_tool(tool, invoker, out)).collect()
}

/// Absolute directory the tool runs in.
fn working_dir(tool: &ToolSpec) -> Option<PathBuf> {
    let current = std::env::current_dir().ok()?;
    Some(match &tool.cwd {
        Some(cwd) => current.join(cwd),
        None => current,
    })
}

pub fn command_line(tool: &ToolSpec) -> String {
    std::iter::once(tool.program.as_str())
        .chain(tool.args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}
