use std::process::Command;

fn main() {
    let Ok(output) = Command::new("git")
        .args([
            "describe",
            "--long",
            "--dirty",
            "--abbrev=10",
            "--tags",
            "--always",
        ])
        .output()
    else {
        println!(
            "cargo:warning=`git describe` command failed.  Falling back to CARGO_PKG_VERSION.  `revspec version` output will be imprecise"
        );
        println!(
            "cargo:rustc-env=REVSPEC_VERSION={}",
            env!("CARGO_PKG_VERSION")
        );
        return;
    };
    let version = match String::from_utf8(output.stdout) {
        Ok(v) if output.status.success() && !v.trim().is_empty() => v.trim().to_string(),
        _ => env!("CARGO_PKG_VERSION").to_string(),
    };
    println!("cargo:rustc-env=REVSPEC_VERSION={}", version);
    println!("cargo:rerun-if-changed=.git/HEAD");
}
