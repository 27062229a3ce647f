//! # calcforge - calculator components and site diagnostics
//!
//! calcforge turns declarative calculator specs into React components and
//! collects the diagnostics of a site's analysis tools into one report.
//!
//! ## Overview
//!
//! Specs are YAML or JSON documents describing a calculator's inputs and
//! outputs. Generation validates each one and writes a `.jsx` component that
//! imports its formulas from a separate module. Checking runs the configured
//! tools (linter, type-checker, bundler), parses their output and writes a
//! JSON and an HTML report.
//!
//! ## Modules
//!
//! - [`spec`] - Spec documents, validation and normalization
//! - [`ident`] - Labels to unique JavaScript identifiers
//! - [`synth`] - Component source generation
//! - [`generate`] - Batch generation over a spec directory
//! - [`tools`] - Running external tools with bounded output
//! - [`diagnostics`] - Parsing tool output into diagnostics
//! - [`report`] - Aggregation and report rendering
//! - [`config`] - Configuration management for calcforge projects
//!
//! ## Example
//!
//! ```no_run
//! use calcforge::spec::{normalize, NormalizeSettings, SpecFormat};
//! use calcforge::synth::{synthesize, SynthOptions};
//!
//! let text = std::fs::read_to_string("content/calculators/hipoteca.yaml").unwrap();
//! let spec = normalize(&text, SpecFormat::Yaml, &NormalizeSettings::default()).unwrap();
//! let component = synthesize(&spec, &SynthOptions::default()).unwrap();
//! println!("{}", component);
//! ```

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod generate;
pub mod ident;
pub mod output;
pub mod report;
pub mod spec;
pub mod synth;
pub mod tools;

/// Current UTC time as an RFC 3339 string with second precision.
pub fn utc_now_iso() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}
