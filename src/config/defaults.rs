//! Default values for configuration fields.

use std::path::PathBuf;

use super::ToolConfig;
use crate::diagnostics::ParseStrategy;

/// Macro to generate default functions for serde attributes
macro_rules! default_fn {
    ($name:ident, $type:ty, $value:expr) => {
        pub(crate) fn $name() -> $type {
            $value
        }
    };
}

// =========================================================================
// GENERATION
// =========================================================================

default_fn!(default_specs_dir, PathBuf, PathBuf::from("content/calculators"));
default_fn!(
    default_out_dir,
    PathBuf,
    PathBuf::from("src/components/calculators/generated")
);
default_fn!(default_locale, String, "es".to_string());
default_fn!(default_jobs, usize, 4);
default_fn!(default_formulas_import, String, "../formulas".to_string());
default_fn!(
    default_skip,
    Vec<String>,
    vec![
        "_*".to_string(),
        ".*".to_string(),
        "README*".to_string(),
        "manifest*".to_string(),
        "*.schema.*".to_string(),
    ]
);

// =========================================================================
// DIAGNOSTICS
// =========================================================================

default_fn!(default_report_dir, PathBuf, PathBuf::from("reports/diagnostics"));
default_fn!(default_max_output_bytes, usize, 10 * 1024 * 1024); // 10 MiB per stream
default_fn!(default_top, usize, 10);
default_fn!(default_true, bool, true);
default_fn!(default_parse, ParseStrategy, ParseStrategy::Lines);

/// The fixer, linter, type-checker and bundler of a typical Node site.
pub(crate) fn default_tools() -> Vec<ToolConfig> {
    fn tool(name: &str, program: &str, args: &[&str], parse: ParseStrategy, enabled: bool) -> ToolConfig {
        ToolConfig {
            name: name.to_string(),
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
            parse,
            enabled,
            cwd: None,
        }
    }

    vec![
        tool("fix", "npx", &["eslint", "--fix", "."], ParseStrategy::None, false),
        tool("lint", "npx", &["eslint", "-f", "json", "."], ParseStrategy::EslintJson, true),
        tool(
            "typecheck",
            "npx",
            &["tsc", "--noEmit", "--pretty", "false"],
            ParseStrategy::Lines,
            true,
        ),
        tool("build", "npm", &["run", "build"], ParseStrategy::Lines, false),
    ]
}
