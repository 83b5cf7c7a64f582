//! The `run` command: audit every resource of a service repeatedly and print
//! summary tables.
//!
//! Trials run strictly one after another. When the service declares a CDN
//! cache-bypass cookie, each resource is audited a second time with the
//! cookie set so cache hits and misses can be compared.

use crate::commands::prompt;
use crate::{Device, Throttling};
use anyhow::{Context, Result};
use auditorn_core::definition::{DefinitionReader, ResourceTarget, ServiceTarget};
use auditorn_core::options::{AuditOptions, FormFactor, ThrottlingProfile};
use auditorn_core::output::{ReportWriter, report_filename};
use auditorn_core::report::AuditResult;
use auditorn_core::summary::{Summary, summarize};
use auditorn_lighthouse::{AuditEngine, ChromeFinder, LighthouseEngine, LighthouseFinder};
use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Service definition file (prompts for one when omitted)
    #[arg(value_name = "FILENAME")]
    pub filename: Option<String>,

    /// Write every Lighthouse report to the outputs directory
    #[arg(short, long)]
    pub output: bool,

    /// Run Chrome in headless mode
    #[arg(short = 'l', long)]
    pub headless: bool,

    /// Device to emulate
    #[arg(short, long, value_enum, default_value = "desktop")]
    pub device: Device,

    /// Network throttling profile
    #[arg(short, long, value_enum, default_value = "no")]
    pub throttling: Throttling,

    /// Number of trials per resource
    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub count: u32,

    /// Directory containing service definitions
    #[arg(long, env = "AUDITORN_DEFINITIONS", default_value = "definitions")]
    pub definitions_dir: PathBuf,

    /// Directory reports are written to with --output
    #[arg(long, env = "AUDITORN_OUTPUTS", default_value = "outputs")]
    pub outputs_dir: PathBuf,

    /// Path to the lighthouse binary (defaults to PATH lookup)
    #[arg(long)]
    pub lighthouse_path: Option<PathBuf>,

    /// Path to the Chrome binary Lighthouse should drive
    #[arg(long, env = "CHROME_PATH")]
    pub chrome_path: Option<PathBuf>,

    /// Basic auth credential (user:password) sent with every request, needed
    /// for protected origins
    #[arg(long, env = "AUDITORN_BASIC_AUTH", hide_env_values = true)]
    pub basic_auth: Option<String>,

    /// Abort on the first failed trial instead of skipping it
    #[arg(long)]
    pub fail_fast: bool,
}

/// Settings shared by every trial of a run
pub struct RunSettings {
    pub trials: usize,
    pub headless: bool,
    pub form_factor: FormFactor,
    pub throttling: ThrottlingProfile,
    pub basic_auth: Option<String>,
    pub writer: Option<ReportWriter>,
    pub fail_fast: bool,
}

impl RunSettings {
    pub fn from_args(args: &RunArgs) -> Self {
        Self {
            trials: args.count as usize,
            headless: args.headless,
            form_factor: args.device.into(),
            throttling: args.throttling.into(),
            basic_auth: args.basic_auth.clone(),
            writer: args
                .output
                .then(|| ReportWriter::new(args.outputs_dir.clone())),
            fail_fast: args.fail_fast,
        }
    }

    /// Options for a trial, with the cache-bypass cookie when auditing cache misses
    pub fn options(&self, cache_bypass_cookie: Option<&str>) -> AuditOptions {
        AuditOptions::new(self.headless, self.form_factor, self.throttling)
            .with_basic_auth(self.basic_auth.clone())
            .with_cache_bypass_cookie(cache_bypass_cookie.map(str::to_string))
    }
}

/// Summary of one resource under one cache state
#[derive(Debug, Clone)]
pub struct ResourceSummary {
    pub resource: String,
    pub cache_miss: bool,
    pub summary: Summary,
}

impl ResourceSummary {
    pub fn title(&self) -> String {
        if self.cache_miss {
            format!("{} [Miss cache]", self.resource)
        } else {
            self.resource.clone()
        }
    }
}

pub fn execute(args: RunArgs) -> Result<()> {
    let lighthouse = LighthouseFinder::new(args.lighthouse_path.clone()).find()?;
    tracing::debug!("Using Lighthouse at {}", lighthouse.display());

    let chrome = match args.chrome_path.clone() {
        Some(path) => Some(ChromeFinder::new(Some(path)).find()?),
        None => ChromeFinder::new(None)
            .find()
            .inspect_err(|e| tracing::debug!("Leaving Chrome discovery to Lighthouse: {}", e))
            .ok(),
    };

    let target = load_target(&args)?;
    let settings = RunSettings::from_args(&args);
    print_banner(&target, &settings);

    let engine = LighthouseEngine::new(lighthouse, chrome);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let result = runtime.block_on(run_service(&engine, &target, &settings));

    runtime.shutdown_timeout(Duration::from_millis(100));

    result.map(|_| ())
}

/// Load the service from the named definition, or ask for one interactively
pub fn load_target(args: &RunArgs) -> Result<ServiceTarget> {
    match &args.filename {
        Some(name) => {
            let path = DefinitionReader::resolve(name, &args.definitions_dir)?;
            DefinitionReader::from_file(&path)
                .with_context(|| format!("Failed to load definition {}", path.display()))
        }
        None => prompt::select_target(&args.definitions_dir),
    }
}

fn print_banner(target: &ServiceTarget, settings: &RunSettings) {
    println!(
        "{}",
        style(format!(
            "Auditing with the following settings\n\
             Service\t\t: {}\n\
             Resources\t: {}\n\
             CDN\t\t: {}\n\
             Trials\t\t: {}\n\
             Headless\t: {}\n\
             Device\t\t: {}\n\
             Throttling\t: {}\n",
            target.name,
            target.resources.len(),
            if target.cache_bypass_cookie().is_some() {
                "yes"
            } else {
                "no"
            },
            settings.trials,
            settings.headless,
            settings.form_factor.as_str(),
            settings.throttling.as_str(),
        ))
        .blue()
        .bright()
    );
    println!("{}", style("----------------").white().bright());
}

/// Audit every resource of a service and print a summary table for each
pub async fn run_service<E: AuditEngine + ?Sized>(
    engine: &E,
    service: &ServiceTarget,
    settings: &RunSettings,
) -> Result<Vec<ResourceSummary>> {
    let mut summaries = Vec::new();

    for resource in &service.resources {
        let results = run_trials(engine, service, resource, settings, None).await?;
        summaries.push(print_summary(resource, false, &results));

        let Some(cookie) = service.cache_bypass_cookie() else {
            continue;
        };

        let results = run_trials(engine, service, resource, settings, Some(cookie)).await?;
        summaries.push(print_summary(resource, true, &results));
    }

    Ok(summaries)
}

fn print_summary(
    resource: &ResourceTarget,
    cache_miss: bool,
    results: &[Option<AuditResult>],
) -> ResourceSummary {
    let summary = ResourceSummary {
        resource: resource.name.clone(),
        cache_miss,
        summary: summarize(results),
    };

    println!("{}", style(summary.title()).green().bright());
    println!("{}", style(summary.summary.render()).green().bright());
    println!();

    summary
}

/// Audit one resource `settings.trials` times.
///
/// The returned sequence always has one slot per trial; a trial the engine
/// failed on is `None`. With `fail_fast`, or when the engine cannot run at
/// all, the first error aborts instead.
pub async fn run_trials<E: AuditEngine + ?Sized>(
    engine: &E,
    service: &ServiceTarget,
    resource: &ResourceTarget,
    settings: &RunSettings,
    cache_bypass_cookie: Option<&str>,
) -> Result<Vec<Option<AuditResult>>> {
    let url = service.url_for(resource);
    let options = settings.options(cache_bypass_cookie);
    let label = if options.is_cache_miss() {
        format!("{} [Miss cache]", resource.name)
    } else {
        resource.name.clone()
    };

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(Duration::from_millis(100));

    let mut results = Vec::with_capacity(settings.trials);

    for trial in 1..=settings.trials {
        spinner.set_message(format!("scoring {} ({}/{})", label, trial, settings.trials));
        tracing::debug!("Trial {}/{} for {}", trial, settings.trials, url);

        let outcome = match engine.audit(&url, &options).await {
            Ok(Value::Null) => {
                tracing::warn!(
                    "Trial {}/{} of {} returned no report",
                    trial,
                    settings.trials,
                    label
                );
                None
            }
            Ok(raw) => {
                if let Some(writer) = &settings.writer {
                    let filename = report_filename(&options, &chrono::Local::now(), trial);
                    if let Err(e) = writer.write(&service.name, &resource.name, &filename, &raw) {
                        spinner.abandon_with_message(format!("failed saving {}", label));
                        return Err(e)
                            .with_context(|| format!("Failed to save trial {} of {}", trial, label));
                    }
                }
                Some(AuditResult::new(raw))
            }
            Err(e) if settings.fail_fast || e.is_fatal() => {
                spinner.abandon_with_message(format!("failed scoring {}", label));
                return Err(e).with_context(|| format!("Trial {} of {} failed", trial, label));
            }
            Err(e) => {
                tracing::warn!(
                    "Trial {}/{} of {} failed: {}",
                    trial,
                    settings.trials,
                    label,
                    e
                );
                None
            }
        };

        results.push(outcome);
    }

    spinner.finish_with_message(format!("scored {} ({} trials)", label, settings.trials));

    Ok(results)
}
