use std::process::Command;

use chrono::{DateTime, Utc};

const RELEASE_TAG_PREFIXES: [&str; 2] = ["v", "codecheck@v"];

fn main() {
    println!("cargo:rerun-if-changed=../../.git/HEAD");
    println!("cargo:rerun-if-changed=../../.git/index");
    println!("cargo:rerun-if-env-changed=SOURCE_DATE_EPOCH");

    let version = env!("CARGO_PKG_VERSION");

    let Some(hash) = git(&["rev-parse", "--short=10", "HEAD"]) else {
        println!("cargo:rustc-env=CODECHECK_VERSION={version}");
        return;
    };

    let dirty = git(&["status", "--porcelain", "--untracked-files=no"])
        .is_some_and(|status| !status.is_empty());

    let version_string = if !dirty && tagged_release(version) {
        version.to_owned()
    } else {
        let marker = if dirty { ".dirty" } else { "" };
        format!("{version}+{hash}{marker}.{}", build_date())
    };

    println!("cargo:rustc-env=CODECHECK_VERSION={version_string}");
}

fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    Some(String::from_utf8(output.stdout).ok()?.trim().to_owned())
}

fn tagged_release(version: &str) -> bool {
    let Some(tags) = git(&["tag", "--points-at", "HEAD"]) else {
        return false;
    };
    tags.lines().any(|tag| {
        RELEASE_TAG_PREFIXES
            .iter()
            .any(|prefix| tag.trim().strip_prefix(prefix) == Some(version))
    })
}

// SOURCE_DATE_EPOCH keeps packaged builds reproducible.
fn build_date() -> String {
    let timestamp = std::env::var("SOURCE_DATE_EPOCH")
        .ok()
        .and_then(|epoch| epoch.parse::<i64>().ok())
        .and_then(|seconds| DateTime::<Utc>::from_timestamp(seconds, 0))
        .unwrap_or_else(Utc::now);
    timestamp.format("%Y%m%d").to_string()
}
