//! `calcforge check`

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use calcforge::config::Config;
use calcforge::error::ToolError;
use calcforge::output::Output;
use calcforge::report::{render, AggregateReport};
use calcforge::tools::{self, InvokeSettings, Invoker, ProcessInvoker, ToolOutput, ToolSpec};

pub fn cmd_check(config: &Config, tool_names: &[String], out: &Output) -> Result<AggregateReport> {
    let selected = config.diagnostics.select_tools(tool_names)?;
    if selected.is_empty() {
        out.warn("No tools are enabled; enable one in diagnostics.tools or pass --tool");
    }

    let invoker = ProcessInvoker {
        settings: InvokeSettings {
            max_output_bytes: config.diagnostics.max_output_bytes,
        },
    };
    let runs = if out.is_interactive() {
        tools::run_tools(&selected, &SpinnerInvoker { inner: &invoker }, out)
    } else {
        tools::run_tools(&selected, &invoker, out)
    };
    let report = AggregateReport::from_runs(runs);

    let top = config.diagnostics.top;
    let paths = render::write(
        &report,
        &config.diagnostics.report_dir,
        top,
        &calcforge::utc_now_iso(),
    )
    .context("Failed to write diagnostics report")?;

    report.print_summary(out, top);
    out.success(&format!(
        "Report written to {} and {}",
        paths.json.display(),
        paths.html.display()
    ));
    Ok(report)
}

/// Shows a spinner on the terminal while a tool runs.
struct SpinnerInvoker<'a> {
    inner: &'a dyn Invoker,
}

impl Invoker for SpinnerInvoker<'_> {
    fn invoke(&self, tool: &ToolSpec) -> Result<ToolOutput, ToolError> {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg} ({elapsed})") {
            pb.set_style(style);
        }
        pb.set_message(format!("{} running", tool.name));
        pb.enable_steady_tick(Duration::from_millis(120));

        let result = self.inner.invoke(tool);
        pb.finish_and_clear();
        result
    }
}
