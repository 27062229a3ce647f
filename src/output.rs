//! Console output for calcforge.
//!
//! Every component reports progress through an [`Output`] instead of printing
//! directly, so the same run can be shown to a person, piped as JSON events,
//! or silenced:
//! - Human: colored, symbol-prefixed lines
//! - Json: one JSON event per line
//! - Quiet: errors only
//!
//! Colors are only used when stdout is a TTY and `NO_COLOR` is unset. Tests
//! inject their own writer with [`Output::with_writer`].

use colored::{Color, Colorize};
use serde_json::json;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// Output mode selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable colored output
    Human,
    /// JSON-formatted structured events
    Json,
    /// Silent mode - only errors
    Quiet,
}

#[derive(Clone)]
pub struct Output {
    mode: OutputMode,
    writer: Arc<Mutex<Box<dyn Write + Send>>>,
    is_tty: bool,
}

impl Output {
    /// Create a new Output writing to stdout
    pub fn new(mode: OutputMode) -> Self {
        let is_tty = atty::is(atty::Stream::Stdout) && std::env::var("NO_COLOR").is_err();
        Self {
            mode,
            writer: Arc::new(Mutex::new(Box::new(io::stdout()))),
            is_tty,
        }
    }

    /// Create an Output with a custom writer (for testing)
    pub fn with_writer(mode: OutputMode, writer: Box<dyn Write + Send>) -> Self {
        Self {
            mode,
            writer: Arc::new(Mutex::new(writer)),
            is_tty: false,
        }
    }

    /// "→ {msg}" in cyan
    pub fn step(&self, msg: &str) {
        self.symbol_line("step", "→", Color::Cyan, msg);
    }

    /// "✓ {msg}" in green
    pub fn success(&self, msg: &str) {
        self.symbol_line("success", "✓", Color::Green, msg);
    }

    /// "⚠ {msg}" in yellow
    pub fn warn(&self, msg: &str) {
        self.symbol_line("warning", "⚠", Color::Yellow, msg);
    }

    /// "✗ {msg}" in red. Errors are written in every mode.
    pub fn error(&self, msg: &str) {
        match self.mode {
            OutputMode::Quiet => self.write_line(&format!("✗ {}", msg)),
            _ => self.symbol_line("error", "✗", Color::Red, msg),
        }
    }

    /// Plain info text (no prefix)
    pub fn info(&self, msg: &str) {
        match self.mode {
            OutputMode::Human => self.write_line(msg),
            OutputMode::Json => self.write_json("info", msg),
            OutputMode::Quiet => {}
        }
    }

    /// Indented subordinate text
    pub fn detail(&self, msg: &str) {
        match self.mode {
            OutputMode::Human => {
                let line = if self.is_tty {
                    msg.dimmed().to_string()
                } else {
                    msg.to_string()
                };
                self.write_line(&format!("  {}", line));
            }
            OutputMode::Json => self.write_json("detail", msg),
            OutputMode::Quiet => {}
        }
    }

    /// A `key: value` counter line, e.g. `generated: 3`.
    ///
    /// In JSON mode the value is emitted as a number under `count`.
    pub fn counter(&self, key: &str, value: usize) {
        match self.mode {
            OutputMode::Human => {
                let key = if self.is_tty {
                    key.bold().to_string()
                } else {
                    key.to_string()
                };
                self.write_line(&format!("{}: {}", key, value));
            }
            OutputMode::Json => {
                self.json(&json!({ "level": "counter", "msg": key, "count": value }));
            }
            OutputMode::Quiet => {}
        }
    }

    /// Section heading
    pub fn heading(&self, msg: &str) {
        match self.mode {
            OutputMode::Human => {
                let line = if self.is_tty {
                    msg.bold().to_string()
                } else {
                    msg.to_string()
                };
                self.write_line(&format!("\n{}", line));
            }
            OutputMode::Json => self.write_json("heading", msg),
            OutputMode::Quiet => {}
        }
    }

    /// Raw JSON event, written in every mode except Quiet
    pub fn json(&self, value: &serde_json::Value) {
        if self.mode == OutputMode::Quiet {
            return;
        }
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", value);
        }
    }

    /// Human mode on a terminal: progress indicators may be drawn.
    pub fn is_interactive(&self) -> bool {
        self.mode == OutputMode::Human && self.is_tty
    }

    fn symbol_line(&self, level: &str, symbol: &str, color: Color, msg: &str) {
        match self.mode {
            OutputMode::Human => {
                let prefix = if self.is_tty {
                    symbol.color(color).to_string()
                } else {
                    symbol.to_string()
                };
                self.write_line(&format!("{} {}", prefix, msg));
            }
            OutputMode::Json => self.write_json(level, msg),
            OutputMode::Quiet => {}
        }
    }

    fn write_line(&self, line: &str) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", line);
        }
    }

    fn write_json(&self, level: &str, msg: &str) {
        self.json(&json!({ "level": level, "msg": msg }));
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::new(OutputMode::Human)
    }
}

/// Shared in-memory writer for capturing [`Output`] in tests.
#[derive(Clone, Default)]
pub struct CaptureBuffer {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl CaptureBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an [`Output`] that writes into this buffer.
    pub fn output(&self, mode: OutputMode) -> Output {
        Output::with_writer(mode, Box::new(self.clone()))
    }

    pub fn contents(&self) -> String {
        let data = self.buffer.lock().map(|b| b.clone()).unwrap_or_default();
        String::from_utf8_lossy(&data).into_owned()
    }
}

impl Write for CaptureBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.buffer.lock() {
            Ok(mut b) => b.write(buf),
            Err(_) => Err(io::Error::other("capture buffer poisoned")),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_human_mode_output() {
        let capture = CaptureBuffer::new();
        let output = capture.output(OutputMode::Human);

        output.step("Starting");
        output.success("Done");
        output.warn("Careful");
        output.error("Broken");
        output.detail("indented");
        output.counter("generated", 3);

        let result = capture.contents();
        assert!(result.contains("→ Starting"));
        assert!(result.contains("✓ Done"));
        assert!(result.contains("⚠ Careful"));
        assert!(result.contains("✗ Broken"));
        assert!(result.contains("  indented"));
        assert!(result.contains("generated: 3"));
    }

    #[test]
    fn test_json_mode_output() {
        let capture = CaptureBuffer::new();
        let output = capture.output(OutputMode::Json);

        output.success("Done");
        output.counter("failed", 1);

        let result = capture.contents();
        let lines: Vec<&str> = result.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["level"], "success");
        assert_eq!(first["msg"], "Done");

        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["level"], "counter");
        assert_eq!(second["count"], 1);
    }

    #[test]
    fn test_quiet_mode_only_errors() {
        let capture = CaptureBuffer::new();
        let output = capture.output(OutputMode::Quiet);

        output.step("Starting");
        output.success("Done");
        output.error("Broken");

        assert_eq!(capture.contents(), "✗ Broken\n");
    }

    #[test]
    fn test_captured_output_is_not_interactive() {
        let capture = CaptureBuffer::new();
        assert!(!capture.output(OutputMode::Human).is_interactive());
    }
}
