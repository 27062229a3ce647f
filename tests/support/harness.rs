use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// TestHarness provides an isolated site directory for running the binary.
/// Specs go to `content/calculators/`, the config (when written) to
/// `.calcforge/config.md`; everything is removed on drop.
pub struct TestHarness {
    pub dir: TempDir,
    pub specs_dir: PathBuf,
    #[allow(dead_code)]
    pub out_dir: PathBuf,
    #[allow(dead_code)]
    pub config_path: PathBuf,
    pub binary: PathBuf,
}

impl TestHarness {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let base_path = temp_dir.path();

        let specs_dir = base_path.join("content/calculators");
        fs::create_dir_all(&specs_dir).expect("Failed to create specs dir");

        TestHarness {
            specs_dir,
            out_dir: base_path.join("src/components/calculators/generated"),
            config_path: base_path.join(".calcforge/config.md"),
            binary: PathBuf::from(env!("CARGO_BIN_EXE_calcforge")),
            dir: temp_dir,
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    #[allow(dead_code)]
    pub fn write_spec(&self, name: &str, content: &str) {
        fs::write(self.specs_dir.join(name), content).expect("Failed to write spec");
    }

    #[allow(dead_code)]
    pub fn write_config(&self, frontmatter: &str) {
        fs::create_dir_all(self.config_path.parent().unwrap()).expect("Failed to create .calcforge");
        fs::write(&self.config_path, format!("---\n{}---\n\n# Test config\n", frontmatter))
            .expect("Failed to write config");
    }

    #[allow(dead_code)]
    pub fn write_file(&self, name: &str, content: &str) {
        fs::write(self.path().join(name), content).expect("Failed to write file");
    }

    /// Run the binary in the harness directory.
    pub fn run(&self, args: &[&str]) -> Output {
        Command::new(&self.binary)
            .args(args)
            .current_dir(self.path())
            .env("NO_COLOR", "1")
            .output()
            .expect("Failed to run calcforge")
    }
}

#[allow(dead_code)]
pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[allow(dead_code)]
pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
