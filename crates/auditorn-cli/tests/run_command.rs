use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};

#[allow(deprecated)]
fn get_auditorn_bin() -> PathBuf {
    assert_cmd::cargo::cargo_bin("auditorn")
}

fn fixtures() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("tests")
        .join("fixtures")
}

/// Stand-in for the lighthouse CLI that prints a canned report
#[cfg(unix)]
fn fake_lighthouse(dir: &Path) -> PathBuf {
    fake_lighthouse_with(dir, "")
}

/// Like `fake_lighthouse`, running `prelude` before printing the report
#[cfg(unix)]
fn fake_lighthouse_with(dir: &Path, prelude: &str) -> PathBuf {
    let report = fixtures().join("lighthouse-report.json");
    write_executable(
        &dir.join("lighthouse"),
        &format!("#!/bin/sh\n{}\ncat '{}'\n", prelude, report.display()),
    )
}

#[cfg(unix)]
fn write_executable(path: &Path, content: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    std::fs::write(path, content).unwrap();
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path.to_path_buf()
}

fn count_files(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
}

#[test]
fn test_run_help_lists_flags() {
    let mut cmd = Command::new(get_auditorn_bin());
    cmd.arg("run").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("--output"))
        .stdout(predicate::str::contains("--headless"))
        .stdout(predicate::str::contains("--device"))
        .stdout(predicate::str::contains("--throttling"))
        .stdout(predicate::str::contains("--count"))
        .stdout(predicate::str::contains("3g-fast"))
        .stdout(predicate::str::contains("--basic-auth"))
        .stdout(predicate::str::contains("protected"))
        .stdout(predicate::str::contains("CHROME_PATH"));
}

#[test]
fn test_run_rejects_zero_count() {
    let mut cmd = Command::new(get_auditorn_bin());
    cmd.arg("run").arg("blog").arg("--count").arg("0");

    cmd.assert().failure().stderr(predicate::str::contains("0"));
}

#[test]
fn test_run_rejects_unknown_throttling() {
    let mut cmd = Command::new(get_auditorn_bin());
    cmd.arg("run").arg("blog").arg("-t").arg("5g");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_run_reports_missing_lighthouse() {
    let temp = tempfile::tempdir().unwrap();
    let mut cmd = Command::new(get_auditorn_bin());
    cmd.arg("run")
        .arg("blog")
        .arg("--lighthouse-path")
        .arg(temp.path().join("no-such-lighthouse"));

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Lighthouse not found"));
}

#[cfg(unix)]
#[test]
fn test_run_reports_missing_definition() {
    let temp = tempfile::tempdir().unwrap();
    let lighthouse = fake_lighthouse(temp.path());

    let mut cmd = Command::new(get_auditorn_bin());
    cmd.arg("run")
        .arg("nope")
        .arg("--lighthouse-path")
        .arg(&lighthouse)
        .arg("--definitions-dir")
        .arg(fixtures().join("definitions"));

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Definition not found"))
        .stderr(predicate::str::contains("nope"));
}

#[cfg(unix)]
#[test]
fn test_run_prints_summary_and_saves_reports() {
    let temp = tempfile::tempdir().unwrap();
    let lighthouse = fake_lighthouse(temp.path());
    let outputs = temp.path().join("outputs");

    let mut cmd = Command::new(get_auditorn_bin());
    cmd.arg("run")
        .arg("blog")
        .arg("--count")
        .arg("2")
        .arg("--output")
        .arg("--lighthouse-path")
        .arg(&lighthouse)
        .arg("--definitions-dir")
        .arg(fixtures().join("definitions"))
        .arg("--outputs-dir")
        .arg(&outputs);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Service\t\t: blog"))
        .stdout(predicate::str::contains("PERFORMANCE"))
        .stdout(predicate::str::contains("trial 1"))
        .stdout(predicate::str::contains("trial 2"))
        .stdout(predicate::str::contains("median"))
        .stdout(predicate::str::contains("1,432.75"))
        .stdout(predicate::str::contains("[Miss cache]").not());

    assert_eq!(count_files(&outputs.join("blog").join("top")), 2);
}

#[cfg(unix)]
#[test]
fn test_run_audits_cache_miss_when_cookie_declared() {
    let temp = tempfile::tempdir().unwrap();
    let lighthouse = fake_lighthouse(temp.path());
    let outputs = temp.path().join("outputs");

    let mut cmd = Command::new(get_auditorn_bin());
    cmd.arg("run")
        .arg("shop.json")
        .arg("-c")
        .arg("2")
        .arg("-o")
        .arg("-d")
        .arg("mobile")
        .arg("-t")
        .arg("lte")
        .arg("--lighthouse-path")
        .arg(&lighthouse)
        .arg("--definitions-dir")
        .arg(fixtures().join("definitions"))
        .arg("--outputs-dir")
        .arg(&outputs);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("CDN\t\t: yes"))
        .stdout(predicate::str::contains("top [Miss cache]"));

    let dir = outputs.join("shop").join("top");
    assert_eq!(count_files(&dir), 4);
    let misses = std::fs::read_dir(&dir)
        .unwrap()
        .filter(|e| {
            let name = e.as_ref().unwrap().file_name();
            name.to_string_lossy().starts_with("MissCache-mobile-lte-")
        })
        .count();
    assert_eq!(misses, 2);
}

#[cfg(unix)]
#[test]
fn test_run_without_output_flag_writes_nothing() {
    let temp = tempfile::tempdir().unwrap();
    let lighthouse = fake_lighthouse(temp.path());
    let outputs = temp.path().join("outputs");

    let mut cmd = Command::new(get_auditorn_bin());
    cmd.arg("run")
        .arg("blog")
        .arg("--lighthouse-path")
        .arg(&lighthouse)
        .arg("--definitions-dir")
        .arg(fixtures().join("definitions"))
        .arg("--outputs-dir")
        .arg(&outputs);

    cmd.assert().success().stdout(predicate::str::contains("trial 1"));

    assert!(!outputs.exists());
}

#[cfg(unix)]
#[test]
fn test_run_keeps_inherited_chrome_path() {
    let temp = tempfile::tempdir().unwrap();
    let chrome = write_executable(&temp.path().join("my-chrome"), "#!/bin/sh\n");
    let seen = temp.path().join("seen-chrome-path");
    let lighthouse = fake_lighthouse_with(
        temp.path(),
        &format!("printf '%s' \"$CHROME_PATH\" > '{}'", seen.display()),
    );

    let mut cmd = Command::new(get_auditorn_bin());
    cmd.env("CHROME_PATH", &chrome)
        .arg("run")
        .arg("blog")
        .arg("--lighthouse-path")
        .arg(&lighthouse)
        .arg("--definitions-dir")
        .arg(fixtures().join("definitions"));

    cmd.assert().success();

    assert_eq!(
        std::fs::read_to_string(&seen).unwrap(),
        chrome.display().to_string()
    );
}

#[cfg(unix)]
#[test]
fn test_run_aborts_when_reports_cannot_be_saved() {
    let temp = tempfile::tempdir().unwrap();
    let lighthouse = fake_lighthouse(temp.path());
    let outputs = temp.path().join("outputs");
    std::fs::write(&outputs, "not a directory").unwrap();

    let mut cmd = Command::new(get_auditorn_bin());
    cmd.arg("run")
        .arg("blog")
        .arg("--output")
        .arg("--lighthouse-path")
        .arg(&lighthouse)
        .arg("--definitions-dir")
        .arg(fixtures().join("definitions"))
        .arg("--outputs-dir")
        .arg(&outputs);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to save trial 1 of top"));
}
