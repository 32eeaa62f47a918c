use std::env;
use std::process::Command;

fn main() {
    let version = env::var("CARGO_PKG_VERSION").unwrap_or_else(|_| "0.0.0".to_string());

    // Dev builds carry the commit so `cliagent --version` identifies them.
    let full_version = match env::var("PROFILE").as_deref() {
        Ok("release") => version,
        _ => match git(&["rev-parse", "--short=8", "HEAD"]) {
            Some(hash) if is_dirty() => format!("{}-dev+{}.dirty", version, hash),
            Some(hash) => format!("{}-dev+{}", version, hash),
            None => format!("{}-dev", version),
        },
    };

    println!("cargo:rustc-env=CLIAGENT_VERSION={}", full_version);
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/index");
}

fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!text.is_empty()).then_some(text)
}

fn is_dirty() -> bool {
    git(&["status", "--porcelain", "--untracked-files=no"]).is_some()
}
