//! Configuration for calcforge projects.
//!
//! The project config lives in `.calcforge/config.md`: YAML frontmatter
//! between `---` delimiters, followed by free-form notes. A missing file means
//! built-in defaults. Command-line flags are applied on top with
//! [`Config::apply`].

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::diagnostics::ParseStrategy;
use crate::spec::{NormalizeSettings, SkipPolicy};

pub mod defaults;

use defaults::*;


/// Default location of the project config.
pub const CONFIG_PATH: &str = ".calcforge/config.md";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GenerationConfig {
    /// Directory holding calculator spec documents
    #[serde(default = "default_specs_dir")]
    pub specs_dir: PathBuf,
    /// Directory generated components are written to
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,
    /// Locale used when a spec has no `lang`
    #[serde(default = "default_locale")]
    pub default_locale: String,
    /// File-name globs that are never treated as specs
    #[serde(default = "default_skip")]
    pub skip: Vec<String>,
    /// Maximum number of specs processed at once
    #[serde(default = "default_jobs")]
    pub jobs: usize,
    /// Import prefix of the formulas modules, relative to `out_dir`
    #[serde(default = "default_formulas_import")]
    pub formulas_import: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            specs_dir: default_specs_dir(),
            out_dir: default_out_dir(),
            default_locale: default_locale(),
            skip: default_skip(),
            jobs: default_jobs(),
            formulas_import: default_formulas_import(),
        }
    }
}

impl GenerationConfig {
    pub fn normalize_settings(&self) -> NormalizeSettings {
        NormalizeSettings {
            default_locale: self.default_locale.clone(),
        }
    }

    pub fn skip_policy(&self) -> Result<SkipPolicy> {
        SkipPolicy::new(&self.skip).context("Invalid pattern in generation.skip")
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DiagnosticsConfig {
    /// Directory the JSON and HTML reports are written to
    #[serde(default = "default_report_dir")]
    pub report_dir: PathBuf,
    /// Per-stream cap on captured tool output
    #[serde(default = "default_max_output_bytes")]
    pub max_output_bytes: usize,
    /// Length of the top-offender rankings
    #[serde(default = "default_top")]
    pub top: usize,
    #[serde(default = "default_tools")]
    pub tools: Vec<ToolConfig>,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            report_dir: default_report_dir(),
            max_output_bytes: default_max_output_bytes(),
            top: default_top(),
            tools: default_tools(),
        }
    }
}

impl DiagnosticsConfig {
    /// Tools to run: the named ones if any are given, otherwise the enabled ones.
    pub fn select_tools(&self, names: &[String]) -> Result<Vec<ToolConfig>> {
        if names.is_empty() {
            return Ok(self.tools.iter().filter(|t| t.enabled).cloned().collect());
        }
        names
            .iter()
            .map(|name| {
                self.tools
                    .iter()
                    .find(|t| &t.name == name)
                    .cloned()
                    .with_context(|| {
                        let known: Vec<&str> = self.tools.iter().map(|t| t.name.as_str()).collect();
                        format!("Unknown tool '{}'. Configured tools: {}", name, known.join(", "))
                    })
            })
            .collect()
    }
}

/// One external analysis command.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ToolConfig {
    pub name: String,
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
    /// How the tool's output is turned into diagnostics
    #[serde(default = "default_parse")]
    pub parse: ParseStrategy,
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Working directory; the current directory when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<PathBuf>,
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub specs_dir: Option<PathBuf>,
    pub out_dir: Option<PathBuf>,
    pub jobs: Option<usize>,
    pub report_dir: Option<PathBuf>,
    pub top: Option<usize>,
}

impl Config {
    /// Load from `path`, or defaults when the file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        Self::parse(&content).with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let (frontmatter, _body) = split_frontmatter(content);
        let frontmatter = frontmatter.context("Failed to extract frontmatter from config")?;

        let config: Config = if frontmatter.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(&frontmatter).context("Failed to parse config frontmatter")?
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.generation.jobs == 0 {
            anyhow::bail!("generation.jobs must be greater than 0");
        }
        self.generation.skip_policy()?;

        if self.diagnostics.max_output_bytes == 0 {
            anyhow::bail!("diagnostics.max_output_bytes must be greater than 0");
        }

        let mut names = HashSet::new();
        for tool in &self.diagnostics.tools {
            if tool.name.trim().is_empty() {
                anyhow::bail!("diagnostics.tools: every tool needs a name");
            }
            if tool.program.trim().is_empty() {
                anyhow::bail!("diagnostics.tools.{}: program must not be empty", tool.name);
            }
            if !names.insert(tool.name.as_str()) {
                anyhow::bail!("diagnostics.tools: duplicate tool name '{}'", tool.name);
            }
        }
        Ok(())
    }

    /// Apply command-line overrides.
    pub fn apply(&mut self, overrides: &Overrides) -> Result<()> {
        if let Some(dir) = &overrides.specs_dir {
            self.generation.specs_dir = dir.clone();
        }
        if let Some(dir) = &overrides.out_dir {
            self.generation.out_dir = dir.clone();
        }
        if let Some(jobs) = overrides.jobs {
            self.generation.jobs = jobs;
        }
        if let Some(dir) = &overrides.report_dir {
            self.diagnostics.report_dir = dir.clone();
        }
        if let Some(top) = overrides.top {
            self.diagnostics.top = top;
        }
        self.validate()
    }

    /// The config rendered as a `config.md` document.
    pub fn to_markdown(&self) -> Result<String> {
        let yaml = serde_yaml::to_string(self).context("Failed to serialize config")?;
        Ok(format!(
            "---\n{}---\n\n# calcforge config\n\nGeneration reads specs from `generation.specs_dir` and writes\ncomponents to `generation.out_dir`. `calcforge check` runs the enabled\n`diagnostics.tools`.\n",
            yaml
        ))
    }
}

/// Split content into YAML frontmatter and body.
///
/// Returns `None` for the frontmatter when the content does not start with
/// `---` or the closing delimiter is missing.
pub fn split_frontmatter(content: &str) -> (Option<String>, &str) {
    let content = content.trim();

    if !content.starts_with("---") {
        return (None, content);
    }

    let rest = &content[3..];
    if let Some(end) = rest.find("\n---") {
        let frontmatter = rest[..end].to_string();
        let body = rest[end + 4..].trim_start();
        (Some(frontmatter), body)
    } else {
        (None, content)
    }
}
