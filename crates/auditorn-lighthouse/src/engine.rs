use crate::{Error, LighthouseArgs, Result};
use async_trait::async_trait;
use auditorn_core::options::AuditOptions;
use serde_json::Value;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;

/// Runs one audit of a URL and returns the raw result record
#[async_trait]
pub trait AuditEngine: Send + Sync {
    async fn audit(&self, url: &str, options: &AuditOptions) -> Result<Value>;
}

/// Audit engine backed by the `lighthouse` CLI.
///
/// Every call spawns a fresh Lighthouse process, which launches and tears down
/// its own Chrome instance.
pub struct LighthouseEngine {
    binary: PathBuf,
    chrome_path: Option<PathBuf>,
}

impl LighthouseEngine {
    pub fn new(binary: PathBuf, chrome_path: Option<PathBuf>) -> Self {
        Self {
            binary,
            chrome_path,
        }
    }

    pub fn binary(&self) -> &PathBuf {
        &self.binary
    }
}

#[async_trait]
impl AuditEngine for LighthouseEngine {
    async fn audit(&self, url: &str, options: &AuditOptions) -> Result<Value> {
        let stamp = chrono::Utc::now().timestamp_millis();
        let args = LighthouseArgs::build(url, options, stamp);
        tracing::debug!("Running {} {}", self.binary.display(), args.as_slice().join(" "));

        let mut command = Command::new(&self.binary);
        command
            .args(args.as_slice())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(chrome) = &self.chrome_path {
            command.env("CHROME_PATH", chrome);
        }

        let output = command
            .output()
            .await
            .map_err(|e| Error::Launch(format!("{}: {}", self.binary.display(), e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let last_line = stderr.lines().rev().find(|l| !l.trim().is_empty());
            return Err(Error::Audit(format!(
                "lighthouse exited with code {}: {}",
                output.status.code().unwrap_or(-1),
                last_line.unwrap_or("no error output")
            )));
        }

        if output.stdout.iter().all(u8::is_ascii_whitespace) {
            return Err(Error::Audit(format!("lighthouse produced no report for {}", url)));
        }

        let report: Value = serde_json::from_slice(&output.stdout)?;
        tracing::debug!("Lighthouse finished auditing {}", url);

        Ok(report)
    }
}
