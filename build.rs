use std::process::Command;

/// Value of `var` if set (release builds pass it in), else the trimmed stdout
/// of `program args`, else "unknown".
fn env_or_command(var: &str, program: &str, args: &[&str]) -> String {
    println!("cargo:rerun-if-env-changed={}", var);
    std::env::var(var).unwrap_or_else(|_| {
        Command::new(program)
            .args(args)
            .output()
            .ok()
            .filter(|output| output.status.success())
            .map(|output| String::from_utf8_lossy(&output.stdout).trim().to_string())
            .unwrap_or_else(|| "unknown".to_string())
    })
}

fn main() {
    let git_sha = env_or_command("GIT_SHA", "git", &["rev-parse", "--short", "HEAD"]);
    println!("cargo:rustc-env=GIT_SHA={}", git_sha);

    let build_date = env_or_command("BUILD_DATE", "date", &["-u", "+%Y-%m-%d"]);
    println!("cargo:rustc-env=BUILD_DATE={}", build_date);
}
