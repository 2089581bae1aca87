#![cfg(unix)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use tempfile::TempDir;

const INSPECTOR_SCRIPT: &str = r#"#!/bin/sh
input=$(cat)
case "$input" in
  *CRASH*) echo "engine crashed" >&2; exit 2 ;;
  *TODO*) echo '[{"rule":"backend_005","severity":"warning","location":{"start":1,"end":1},"message":"unfinished work"}]' ;;
  *) echo '[]' ;;
esac
"#;

struct Fixture {
    repo: TempDir,
    support: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let repo = TempDir::new().expect("failed to create repo dir");
        let support = TempDir::new().expect("failed to create support dir");

        git(repo.path(), &["init", "--initial-branch=main"]);
        git(repo.path(), &["config", "user.email", "test@example.com"]);
        git(repo.path(), &["config", "user.name", "Test"]);

        let script = support.path().join("inspector.sh");
        fs::write(&script, INSPECTOR_SCRIPT).expect("failed to write inspector");
        fs::write(
            support.path().join("codecheck.toml"),
            format!(
                "[inspector]\ncommand = [\"sh\", \"{}\"]\ntimeout-secs = 30\n",
                script.display()
            ),
        )
        .expect("failed to write config");

        Self { repo, support }
    }

    fn root(&self) -> &Path {
        self.repo.path()
    }

    fn config(&self) -> PathBuf {
        self.support.path().join("codecheck.toml")
    }

    fn output_dir(&self) -> PathBuf {
        self.support.path().join("reports")
    }

    fn write(&self, path: &str, content: &[u8]) {
        let full = self.root().join(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).expect("failed to create parent dir");
        }
        fs::write(full, content).expect("failed to write file");
    }

    fn commit_all(&self, message: &str) -> String {
        git(self.root(), &["add", "-A"]);
        git(self.root(), &["commit", "-m", message]);
        head(self.root())
    }

    fn codecheck(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("codecheck");
        cmd.current_dir(self.root());
        cmd
    }
}

fn git(dir: &Path, args: &[&str]) {
    let status = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("failed to run git")
        .status;
    assert!(status.success(), "git {args:?} failed");
}

fn head(dir: &Path) -> String {
    let output = Command::new("git")
        .args(["rev-parse", "HEAD"])
        .current_dir(dir)
        .output()
        .expect("failed to run git rev-parse");
    String::from_utf8(output.stdout)
        .expect("utf-8 hash")
        .trim()
        .to_string()
}

fn fixture_with_commit() -> Fixture {
    let fixture = Fixture::new();
    fixture.write("README.md", b"# service\n");
    fixture.commit_all("Initial commit");
    fixture.write("svc/todo.py", b"def handler():\n    pass  # TODO\n");
    fixture.write("svc/clean.py", b"def ok():\n    return 1\n");
    fixture.commit_all("Add handlers");
    fixture
}

#[test]
fn commit_reports_progress_summary_and_files() {
    let fixture = fixture_with_commit();

    fixture
        .codecheck()
        .arg("commit")
        .arg("HEAD")
        .arg("--config")
        .arg(fixture.config())
        .arg("--output-dir")
        .arg(fixture.output_dir())
        .assert()
        .success()
        .stderr(contains("[1/2]").and(contains("[2/2]")))
        .stdout(contains("Inspected 2 file(s): 1 issue(s), 0 failed"))
        .stdout(contains("Report written to"));

    let summary =
        fs::read_to_string(fixture.output_dir().join("summary.md")).expect("summary.md missing");
    assert!(summary.starts_with("# Code Check Report - Git Commit"));
    assert!(summary.contains("- **Message**: Add handlers"));
    assert!(fixture.output_dir().join("summary.json").is_file());
    assert!(fixture.output_dir().join("with_issues/svc/todo.py.md").is_file());
    assert!(fixture.output_dir().join("no_issues/svc/clean.py.md").is_file());
}

#[test]
fn fail_on_threshold_exits_with_error_after_summary() {
    let fixture = fixture_with_commit();

    fixture
        .codecheck()
        .args(["commit", "HEAD", "--no-report", "--fail-on", "warning", "--config"])
        .arg(fixture.config())
        .assert()
        .failure()
        .stdout(contains("Inspected 2 file(s)"))
        .stderr(contains("1 issue(s) at or above severity 'warning'"));
}

#[test]
fn fail_on_above_found_severity_succeeds() {
    let fixture = fixture_with_commit();

    fixture
        .codecheck()
        .args(["commit", "HEAD", "--no-report", "--fail-on", "error", "--config"])
        .arg(fixture.config())
        .assert()
        .success();
}

#[test]
fn failed_inspection_does_not_abort_the_batch() {
    let fixture = Fixture::new();
    fixture.write("a.py", b"x = 1\n");
    fixture.write("b.py", b"CRASH = True\n");
    fixture.write("c.py", b"# TODO\n");
    fixture.commit_all("Initial commit");

    fixture
        .codecheck()
        .args(["commit", "HEAD", "--workers", "1", "--no-report", "--config"])
        .arg(fixture.config())
        .assert()
        .success()
        .stdout(contains("Inspected 3 file(s): 1 issue(s), 1 failed"))
        .stdout(contains("b.py: 'sh' failed with status 2: engine crashed"));
}

#[test]
fn invalid_option_value_warns_and_continues() {
    let fixture = fixture_with_commit();

    fixture
        .codecheck()
        .args(["commit", "HEAD", "--no-report", "--consensus", "abc", "--config"])
        .arg(fixture.config())
        .assert()
        .success()
        .stderr(contains("warning: invalid value 'abc' for consensus"))
        .stdout(contains("Inspected 2 file(s)"));
}

#[test]
fn binary_files_are_skipped() {
    let fixture = Fixture::new();
    fixture.write("main.py", b"print('hi')\n");
    fixture.write("logo.png", b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR");
    fixture.commit_all("Initial commit");

    fixture
        .codecheck()
        .args(["commit", "HEAD", "--no-report", "--config"])
        .arg(fixture.config())
        .assert()
        .success()
        .stderr(contains("skipped logo.png: binary file"))
        .stdout(contains("Inspected 1 file(s)"))
        .stdout(contains("Skipped 1 file(s)"));
}

#[test]
fn staged_changes_are_inspected_from_the_working_tree() {
    let fixture = fixture_with_commit();
    fixture.write("svc/new.py", b"# TODO: wire up\n");
    git(fixture.root(), &["add", "svc/new.py"]);

    fixture
        .codecheck()
        .args(["staged", "--output-dir"])
        .arg(fixture.output_dir())
        .arg("--config")
        .arg(fixture.config())
        .assert()
        .success()
        .stderr(contains("[1/1] svc/new.py: 1 issue(s)"));

    let summary =
        fs::read_to_string(fixture.output_dir().join("summary.md")).expect("summary.md missing");
    assert!(summary.starts_with("# Code Check Report - Git Staged Changes"));
}

#[test]
fn unstaged_without_report_writes_nothing() {
    let fixture = fixture_with_commit();
    fixture.write("svc/clean.py", b"def ok():\n    return 2\n");

    fixture
        .codecheck()
        .args(["unstaged", "--no-report", "--quiet", "--config"])
        .arg(fixture.config())
        .assert()
        .success()
        .stderr(contains("[1/1]").not())
        .stdout(contains("Inspected 1 file(s): 0 issue(s), 0 failed"));

    assert!(!fixture.root().join("codecheck-reports").exists());
    assert!(!fixture.output_dir().exists());
}

#[test]
fn diff_defaults_target_to_head() {
    let fixture = Fixture::new();
    fixture.write("one.py", b"1\n");
    let base = fixture.commit_all("One");
    fixture.write("two.py", b"2\n");
    fixture.commit_all("Two");
    fixture.write("three.py", b"# TODO\n");
    fixture.commit_all("Three");

    fixture
        .codecheck()
        .args(["diff", base.as_str(), "--no-report", "--config"])
        .arg(fixture.config())
        .assert()
        .success()
        .stdout(contains("Inspected 2 file(s): 1 issue(s), 0 failed"));
}

#[test]
fn list_files_needs_no_inspector() {
    let fixture = fixture_with_commit();

    fixture
        .codecheck()
        .args(["commit", "HEAD", "--list-files"])
        .assert()
        .success()
        .stdout(contains("svc/todo.py").and(contains("svc/clean.py")))
        .stdout(contains("README.md").not());
}

#[test]
fn path_option_selects_repository() {
    let fixture = fixture_with_commit();
    let elsewhere = TempDir::new().expect("failed to create temp dir");

    assert_cmd::cargo::cargo_bin_cmd!("codecheck")
        .current_dir(elsewhere.path())
        .arg("-C")
        .arg(fixture.root())
        .args(["commit", "HEAD", "--list-files"])
        .assert()
        .success()
        .stdout(contains("svc/todo.py"));
}

#[test]
fn missing_inspector_is_an_error() {
    let fixture = fixture_with_commit();

    fixture
        .codecheck()
        .args(["commit", "HEAD", "--no-report"])
        .assert()
        .failure()
        .stderr(contains("no inspector configured"));
}

#[test]
fn unknown_revision_is_an_error() {
    let fixture = fixture_with_commit();

    fixture
        .codecheck()
        .args(["commit", "no-such-commit", "--config"])
        .arg(fixture.config())
        .assert()
        .failure()
        .stderr(contains("error: revision 'no-such-commit' not found"));
}

#[test]
fn outside_a_repository_is_an_error() {
    let dir = TempDir::new().expect("failed to create temp dir");

    assert_cmd::cargo::cargo_bin_cmd!("codecheck")
        .current_dir(dir.path())
        .arg("staged")
        .assert()
        .failure()
        .stderr(contains("not a git repository"));
}

#[test]
fn interrupt_stops_the_run_and_removes_scratch() {
    let fixture = Fixture::new();
    fixture.write("README.md", b"# service\n");
    fixture.commit_all("Initial commit");
    for i in 0..6 {
        fixture.write(&format!("jobs/job{i}.py"), b"run()\n");
    }
    fixture.commit_all("Add jobs");

    let slow = fixture.support.path().join("slow.sh");
    fs::write(&slow, "#!/bin/sh\ncat > /dev/null\nsleep 1\necho '[]'\n")
        .expect("failed to write slow inspector");
    let config = fixture.support.path().join("slow.toml");
    fs::write(
        &config,
        format!("[inspector]\ncommand = [\"sh\", \"{}\"]\n", slow.display()),
    )
    .expect("failed to write config");
    let scratch_root = TempDir::new().expect("failed to create temp dir");

    let child = Command::new(env!("CARGO_BIN_EXE_codecheck"))
        .args(["commit", "HEAD", "--workers", "1", "--config"])
        .arg(&config)
        .arg("--output-dir")
        .arg(fixture.output_dir())
        .current_dir(fixture.root())
        .env("TMPDIR", scratch_root.path())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to start codecheck");

    thread::sleep(Duration::from_millis(1500));
    let killed = Command::new("kill")
        .args(["-INT", &child.id().to_string()])
        .status()
        .expect("failed to run kill");
    assert!(killed.success());

    let output = child.wait_with_output().expect("codecheck did not finish");

    assert_eq!(output.status.code(), Some(130));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("interrupted after"), "{stderr}");
    assert!(!fixture.output_dir().exists());
    let leftovers: Vec<_> = fs::read_dir(scratch_root.path())
        .expect("failed to list scratch root")
        .collect();
    assert!(leftovers.is_empty(), "scratch left behind: {leftovers:?}");
}
