//! Batch generation of calculator components.
//!
//! Every spec file in the spec directory is normalized and synthesized
//! independently on a small worker pool. A failing spec is recorded in the
//! summary and the manifest; it never stops the batch.

use anyhow::Result;
use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;

use crate::config::GenerationConfig;
use crate::error::{GenerateError, Issue};
use crate::output::Output;
use crate::spec::{normalize, NormalizeSettings, SkipPolicy, SpecFormat};
use crate::synth::{self, SynthOptions};

pub const MANIFEST_FILE: &str = "generation-manifest.json";

#[derive(Debug, Clone)]
pub struct GenerateSettings {
    pub specs_dir: PathBuf,
    pub out_dir: PathBuf,
    pub jobs: usize,
    pub skip: SkipPolicy,
    pub normalize: NormalizeSettings,
    pub formulas_import: String,
    /// Synthesize and report without touching the output directory
    pub dry_run: bool,
}

impl GenerateSettings {
    pub fn from_config(config: &GenerationConfig, dry_run: bool) -> Result<Self> {
        Ok(Self {
            specs_dir: config.specs_dir.clone(),
            out_dir: config.out_dir.clone(),
            jobs: config.jobs,
            skip: config.skip_policy()?,
            normalize: config.normalize_settings(),
            formulas_import: config.formulas_import.clone(),
            dry_run,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Outcome {
    Generated {
        artifact: PathBuf,
        /// The artifact on disk already had this content
        unchanged: bool,
    },
    Failed {
        issues: Vec<Issue>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationResult {
    pub spec: PathBuf,
    #[serde(flatten)]
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Default)]
pub struct GenerationSummary {
    pub generated: usize,
    pub unchanged: usize,
    pub failed: usize,
    /// One result per spec file, in listing order
    pub results: Vec<GenerationResult>,
    /// Written manifest, `None` on dry runs
    pub manifest: Option<PathBuf>,
}

#[derive(Serialize)]
struct Manifest<'a> {
    generated_at: String,
    generated: usize,
    failed: usize,
    artifacts: IndexMap<String, String>,
    failures: IndexMap<String, &'a [Issue]>,
}

/// A synthesized component not yet written.
struct Artifact {
    file_name: String,
    code: String,
}

pub struct Generator<'a> {
    settings: GenerateSettings,
    out: &'a Output,
}

impl<'a> Generator<'a> {
    pub fn new(settings: GenerateSettings, out: &'a Output) -> Self {
        Self { settings, out }
    }

    pub fn run(&self) -> Result<GenerationSummary, GenerateError> {
        let files = self.list_specs()?;
        self.out.step(&format!(
            "Generating {} spec(s) from {}",
            files.len(),
            self.settings.specs_dir.display()
        ));

        if !self.settings.dry_run {
            fs::create_dir_all(&self.settings.out_dir).map_err(|source| GenerateError::Write {
                path: self.settings.out_dir.clone(),
                source,
            })?;
        }

        let prepared = self.prepare_all(&files);

        let mut summary = GenerationSummary::default();
        let mut claimed: HashMap<String, PathBuf> = HashMap::new();
        for (path, prepared) in files.iter().zip(prepared) {
            let outcome = match prepared {
                Ok(artifact) => match claimed.get(&artifact.file_name) {
                    Some(owner) => Outcome::Failed {
                        issues: vec![Issue::new(
                            "slug",
                            format!(
                                "resolves to {} which is already generated from {}",
                                artifact.file_name,
                                display_name(owner)
                            ),
                        )],
                    },
                    None => {
                        claimed.insert(artifact.file_name.clone(), path.clone());
                        self.emit(&artifact)
                    }
                },
                Err(issues) => Outcome::Failed { issues },
            };

            match &outcome {
                Outcome::Generated { artifact, unchanged } => {
                    summary.generated += 1;
                    if *unchanged {
                        summary.unchanged += 1;
                        self.out.detail(&format!("{} (unchanged)", artifact.display()));
                    } else {
                        self.out.success(&format!("{} -> {}", display_name(path), artifact.display()));
                    }
                }
                Outcome::Failed { issues } => {
                    summary.failed += 1;
                    self.out.error(&format!("{} failed", display_name(path)));
                    for issue in issues {
                        self.out.detail(&issue.to_string());
                    }
                }
            }

            summary.results.push(GenerationResult {
                spec: path.clone(),
                outcome,
            });
        }

        if !self.settings.dry_run {
            summary.manifest = Some(self.write_manifest(&summary)?);
        }

        self.out.counter("generated", summary.generated);
        self.out.counter("unchanged", summary.unchanged);
        self.out.counter("failed", summary.failed);

        Ok(summary)
    }

    /// Spec files sorted by name, skip patterns applied.
    fn list_specs(&self) -> Result<Vec<PathBuf>, GenerateError> {
        let dir = &self.settings.specs_dir;
        if !dir.is_dir() {
            return Err(GenerateError::SpecsDirMissing(dir.clone()));
        }

        let list_err = |source| GenerateError::ListDir {
            path: dir.clone(),
            source,
        };
        let mut files = Vec::new();
        for entry in fs::read_dir(dir).map_err(list_err)? {
            let path = entry.map_err(list_err)?.path();
            if !path.is_file() || SpecFormat::from_path(&path).is_none() {
                continue;
            }
            if self.settings.skip.is_skipped(&path) {
                continue;
            }
            files.push(path);
        }
        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(files)
    }

    /// Normalize and synthesize every file on `jobs` workers.
    ///
    /// Results come back in the order of `files`.
    fn prepare_all(&self, files: &[PathBuf]) -> Vec<Result<Artifact, Vec<Issue>>> {
        let mut slots: Vec<Option<Result<Artifact, Vec<Issue>>>> = files.iter().map(|_| None).collect();
        let workers = self.settings.jobs.max(1).min(files.len());
        let next = AtomicUsize::new(0);
        let settings = &self.settings;

        thread::scope(|scope| {
            let (tx, rx) = mpsc::channel();
            for _ in 0..workers {
                let tx = tx.clone();
                let next = &next;
                scope.spawn(move || loop {
                    let index = next.fetch_add(1, Ordering::Relaxed);
                    let Some(path) = files.get(index) else {
                        break;
                    };
                    if tx.send((index, prepare(path, settings))).is_err() {
                        break;
                    }
                });
            }
            drop(tx);

            for (index, prepared) in rx {
                slots[index] = Some(prepared);
            }
        });

        slots
            .into_iter()
            .map(|slot| slot.unwrap_or_else(|| Err(vec![Issue::document("spec was not processed")])))
            .collect()
    }

    fn emit(&self, artifact: &Artifact) -> Outcome {
        let target = self.settings.out_dir.join(&artifact.file_name);
        let unchanged = fs::read(&target)
            .map(|existing| existing == artifact.code.as_bytes())
            .unwrap_or(false);

        if !unchanged && !self.settings.dry_run {
            if let Err(e) = fs::write(&target, &artifact.code) {
                return Outcome::Failed {
                    issues: vec![Issue::document(format!(
                        "failed to write {}: {}",
                        target.display(),
                        e
                    ))],
                };
            }
        }

        Outcome::Generated {
            artifact: target,
            unchanged,
        }
    }

    fn write_manifest(&self, summary: &GenerationSummary) -> Result<PathBuf, GenerateError> {
        let mut manifest = Manifest {
            generated_at: crate::utc_now_iso(),
            generated: summary.generated,
            failed: summary.failed,
            artifacts: IndexMap::new(),
            failures: IndexMap::new(),
        };
        for result in &summary.results {
            let spec = display_name(&result.spec);
            match &result.outcome {
                Outcome::Generated { artifact, .. } => {
                    manifest.artifacts.insert(spec, display_name(artifact));
                }
                Outcome::Failed { issues } => {
                    manifest.failures.insert(spec, issues);
                }
            }
        }

        let path = self.settings.out_dir.join(MANIFEST_FILE);
        let json = serde_json::to_string_pretty(&manifest)?;
        fs::write(&path, json + "\n").map_err(|source| GenerateError::Write {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

/// Read, normalize and synthesize one spec file.
fn prepare(path: &Path, settings: &GenerateSettings) -> Result<Artifact, Vec<Issue>> {
    let format = SpecFormat::from_path(path)
        .ok_or_else(|| vec![Issue::document("unsupported file extension")])?;
    let source = fs::read_to_string(path)
        .map_err(|e| vec![Issue::document(format!("failed to read spec: {}", e))])?;

    let spec = normalize(&source, format, &settings.normalize).map_err(|e| e.issues)?;

    let options = SynthOptions {
        formulas_import: settings.formulas_import.clone(),
        source_name: Some(display_name(path)),
    };
    let code = synth::synthesize(&spec, &options).map_err(|e| vec![e.to_issue()])?;

    Ok(Artifact {
        file_name: synth::artifact_file_name(&spec),
        code,
    })
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::{CaptureBuffer, OutputMode};
    use tempfile::TempDir;

    const MORTGAGE: &str = r#"
title: Mortgage Calc
inputs:
  - name: Loan Amount
    type: number
    min: 0
  - name: Rate
    type: number
    step: 0.01
outputs:
  - name: payment
    label: Monthly payment
    precision: 2
"#;

    fn settings(tmp: &TempDir) -> GenerateSettings {
        let specs_dir = tmp.path().join("specs");
        fs::create_dir_all(&specs_dir).unwrap();
        GenerateSettings {
            specs_dir,
            out_dir: tmp.path().join("out"),
            jobs: 4,
            skip: SkipPolicy::new(&["_*", "README*"]).unwrap(),
            normalize: NormalizeSettings::default(),
            formulas_import: "../formulas".to_string(),
            dry_run: false,
        }
    }

    fn run(settings: GenerateSettings) -> GenerationSummary {
        let buffer = CaptureBuffer::new();
        let out = buffer.output(OutputMode::Quiet);
        Generator::new(settings, &out).run().unwrap()
    }

    #[test]
    fn test_mortgage_end_to_end() {
        let tmp = TempDir::new().unwrap();
        let settings = settings(&tmp);
        fs::write(settings.specs_dir.join("mortgage.yaml"), MORTGAGE).unwrap();
        let out_dir = settings.out_dir.clone();

        let summary = run(settings);
        assert_eq!(summary.generated, 1);
        assert_eq!(summary.failed, 0);

        let code = fs::read_to_string(out_dir.join("mortgage-calc.jsx")).unwrap();
        assert!(code.contains("const [Loan_Amount, setLoan_Amount] = useState(0);"));
        assert!(code.contains("export default function MortgageCalc()"));

        let manifest: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(out_dir.join(MANIFEST_FILE)).unwrap()).unwrap();
        assert_eq!(manifest["generated"], 1);
        assert_eq!(manifest["failed"], 0);
        assert_eq!(manifest["artifacts"]["mortgage.yaml"], "mortgage-calc.jsx");
    }

    #[test]
    fn test_second_run_is_unchanged() {
        let tmp = TempDir::new().unwrap();
        let settings = settings(&tmp);
        fs::write(settings.specs_dir.join("mortgage.yaml"), MORTGAGE).unwrap();
        let target = settings.out_dir.join("mortgage-calc.jsx");

        let first = run(settings.clone());
        assert_eq!(first.unchanged, 0);
        let before = fs::read(&target).unwrap();

        let second = run(settings);
        assert_eq!(second.generated, 1);
        assert_eq!(second.unchanged, 1);
        assert_eq!(fs::read(&target).unwrap(), before);
    }

    #[test]
    fn test_one_bad_spec_does_not_stop_the_batch() {
        let tmp = TempDir::new().unwrap();
        let settings = settings(&tmp);
        for i in 0..9 {
            let spec = format!(
                "title: Calculadora {i}\ninputs:\n  - {{name: Monto, type: number}}\n"
            );
            fs::write(settings.specs_dir.join(format!("calc-{i}.yaml")), spec).unwrap();
        }
        fs::write(settings.specs_dir.join("broken.yaml"), "title: Rota\ninputs: []\n").unwrap();
        let out_dir = settings.out_dir.clone();

        let summary = run(settings);
        assert_eq!(summary.generated, 9);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.results.len(), 10);

        let broken = summary
            .results
            .iter()
            .find(|r| r.spec.ends_with("broken.yaml"))
            .unwrap();
        match &broken.outcome {
            Outcome::Failed { issues } => {
                assert!(issues.iter().any(|i| i.field.as_deref() == Some("inputs")))
            }
            other => panic!("expected failure, got {:?}", other),
        }

        let manifest: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(out_dir.join(MANIFEST_FILE)).unwrap()).unwrap();
        assert_eq!(manifest["failed"], 1);
        assert!(manifest["failures"]["broken.yaml"].is_array());
    }

    #[test]
    fn test_results_follow_listing_order() {
        let tmp = TempDir::new().unwrap();
        let mut settings = settings(&tmp);
        settings.jobs = 3;
        for name in ["c", "a", "b", "e", "d"] {
            let spec = format!("title: {name}\ninputs:\n  - {{name: x, type: number}}\n");
            fs::write(settings.specs_dir.join(format!("{name}.yml")), spec).unwrap();
        }

        let names: Vec<String> = run(settings)
            .results
            .iter()
            .map(|r| display_name(&r.spec))
            .collect();
        assert_eq!(names, vec!["a.yml", "b.yml", "c.yml", "d.yml", "e.yml"]);
    }

    #[test]
    fn test_skip_patterns_and_extensions() {
        let tmp = TempDir::new().unwrap();
        let settings = settings(&tmp);
        fs::write(settings.specs_dir.join("mortgage.yaml"), MORTGAGE).unwrap();
        fs::write(settings.specs_dir.join("_draft.yaml"), "not: [valid").unwrap();
        fs::write(settings.specs_dir.join("README.md"), "# notes").unwrap();
        fs::write(settings.specs_dir.join("notes.txt"), "ignored").unwrap();

        let summary = run(settings);
        assert_eq!(summary.results.len(), 1);
        assert_eq!(summary.failed, 0);
    }

    #[test]
    fn test_slug_collision_fails_the_later_spec() {
        let tmp = TempDir::new().unwrap();
        let settings = settings(&tmp);
        fs::write(settings.specs_dir.join("a.yaml"), MORTGAGE).unwrap();
        fs::write(
            settings.specs_dir.join("b.json"),
            r#"{"slug": "mortgage-calc", "title": "Other", "inputs": [{"name": "x", "type": "number"}]}"#,
        )
        .unwrap();

        let summary = run(settings);
        assert_eq!(summary.generated, 1);
        assert_eq!(summary.failed, 1);
        match &summary.results[1].outcome {
            Outcome::Failed { issues } => {
                assert_eq!(issues[0].field.as_deref(), Some("slug"));
                assert!(issues[0].message.contains("a.yaml"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let mut settings = settings(&tmp);
        settings.dry_run = true;
        fs::write(settings.specs_dir.join("mortgage.yaml"), MORTGAGE).unwrap();
        let out_dir = settings.out_dir.clone();

        let summary = run(settings);
        assert_eq!(summary.generated, 1);
        assert!(summary.manifest.is_none());
        assert!(!out_dir.exists());
    }

    #[test]
    fn test_missing_specs_dir() {
        let tmp = TempDir::new().unwrap();
        let mut settings = settings(&tmp);
        settings.specs_dir = tmp.path().join("nope");

        let out = Output::with_writer(OutputMode::Quiet, Box::new(std::io::sink()));
        let err = Generator::new(settings, &out).run().unwrap_err();
        assert!(matches!(err, GenerateError::SpecsDirMissing(_)));
    }

    #[test]
    fn test_counters_in_json_mode() {
        let tmp = TempDir::new().unwrap();
        let settings = settings(&tmp);
        fs::write(settings.specs_dir.join("mortgage.yaml"), MORTGAGE).unwrap();

        let buffer = CaptureBuffer::new();
        let out = buffer.output(OutputMode::Json);
        Generator::new(settings, &out).run().unwrap();

        let counters: Vec<serde_json::Value> = buffer
            .contents()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .filter(|v: &serde_json::Value| v["level"] == "counter")
            .collect();
        assert_eq!(counters.len(), 3);
        assert_eq!(counters[0]["msg"], "generated");
        assert_eq!(counters[0]["count"], 1);
    }
}
