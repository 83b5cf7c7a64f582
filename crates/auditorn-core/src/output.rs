use crate::Result;
use crate::options::AuditOptions;
use chrono::{DateTime, Local};
use serde_json::Value;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Writes raw audit results under `<root>/<service>/<resource>/`
pub struct ReportWriter {
    root: PathBuf,
}

impl ReportWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the reports of one resource
    pub fn directory(&self, service: &str, resource: &str) -> PathBuf {
        self.root.join(service).join(resource)
    }

    /// Write one raw result as pretty-printed JSON, returning the file path
    pub fn write(
        &self,
        service: &str,
        resource: &str,
        filename: &str,
        report: &Value,
    ) -> Result<PathBuf> {
        let dir = self.directory(service, resource);
        fs::create_dir_all(&dir)?;

        let path = dir.join(format!("{}.json", filename));
        tracing::debug!("Writing audit report to: {}", path.display());

        let file = File::create(&path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, report)?;
        writer.flush()?;

        tracing::info!("Saved audit report to {}", path.display());

        Ok(path)
    }
}

/// File stem for a persisted result:
/// `[MissCache-]<device>-<throttling>-<timestamp>-<trial>`
pub fn report_filename(options: &AuditOptions, at: &DateTime<Local>, trial: usize) -> String {
    format!(
        "{}{}-{}-{}-{}",
        if options.is_cache_miss() { "MissCache-" } else { "" },
        options.form_factor.as_str(),
        options.throttling.as_str(),
        compact_timestamp(at),
        trial
    )
}

/// Sortable local timestamp with `-`, whitespace, `/` and `:` removed
pub fn compact_timestamp(at: &DateTime<Local>) -> String {
    at.format("%Y-%m-%d %H:%M:%S:%3f")
        .to_string()
        .chars()
        .filter(|c| !matches!(c, '-' | '/' | ':') && !c.is_whitespace())
        .collect()
}
