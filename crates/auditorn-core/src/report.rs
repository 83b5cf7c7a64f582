//! Typed view over Lighthouse result records.
//!
//! Only the fields the summary needs are modelled. Every field is optional and
//! the accessors fall back to zero, so a partial or malformed record never
//! fails aggregation.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Lighthouse result (LHR) subset
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LighthouseReport {
    #[serde(rename = "lighthouseVersion", skip_serializing_if = "Option::is_none")]
    pub lighthouse_version: Option<String>,
    #[serde(rename = "requestedUrl", skip_serializing_if = "Option::is_none")]
    pub requested_url: Option<String>,
    #[serde(rename = "finalUrl", skip_serializing_if = "Option::is_none")]
    pub final_url: Option<String>,
    #[serde(rename = "fetchTime", skip_serializing_if = "Option::is_none")]
    pub fetch_time: Option<String>,
    #[serde(rename = "runtimeError", skip_serializing_if = "Option::is_none")]
    pub runtime_error: Option<RuntimeError>,
    pub categories: Categories,
    pub audits: Audits,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeError {
    pub code: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Categories {
    pub performance: Option<Category>,
    pub accessibility: Option<Category>,
    #[serde(rename = "best-practices")]
    pub best_practices: Option<Category>,
    pub seo: Option<Category>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Category {
    pub id: Option<String>,
    pub title: Option<String>,
    pub score: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Audits {
    #[serde(rename = "server-response-time")]
    pub server_response_time: Option<AuditEntry>,
    #[serde(rename = "first-contentful-paint")]
    pub first_contentful_paint: Option<AuditEntry>,
    #[serde(rename = "first-meaningful-paint")]
    pub first_meaningful_paint: Option<AuditEntry>,
    #[serde(rename = "largest-contentful-paint")]
    pub largest_contentful_paint: Option<AuditEntry>,
    #[serde(rename = "max-potential-fid")]
    pub max_potential_fid: Option<AuditEntry>,
    #[serde(rename = "cumulative-layout-shift")]
    pub cumulative_layout_shift: Option<AuditEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditEntry {
    pub id: Option<String>,
    pub title: Option<String>,
    pub score: Option<f64>,
    #[serde(rename = "numericValue")]
    pub numeric_value: Option<f64>,
    #[serde(rename = "displayValue")]
    pub display_value: Option<String>,
}

fn or_zero(value: Option<f64>) -> f64 {
    value.filter(|v| !v.is_nan()).unwrap_or(0.0)
}

fn score(category: &Option<Category>) -> f64 {
    or_zero(category.as_ref().and_then(|c| c.score))
}

fn numeric(audit: &Option<AuditEntry>) -> f64 {
    or_zero(audit.as_ref().and_then(|a| a.numeric_value))
}

impl LighthouseReport {
    pub fn performance(&self) -> f64 {
        score(&self.categories.performance)
    }

    pub fn fixed_performance(&self) -> f64 {
        self.performance() * 100.0
    }

    pub fn accessibility(&self) -> f64 {
        score(&self.categories.accessibility)
    }

    pub fn fixed_accessibility(&self) -> f64 {
        self.accessibility() * 100.0
    }

    pub fn best_practice(&self) -> f64 {
        score(&self.categories.best_practices)
    }

    pub fn fixed_best_practice(&self) -> f64 {
        self.best_practice() * 100.0
    }

    pub fn seo(&self) -> f64 {
        score(&self.categories.seo)
    }

    pub fn fixed_seo(&self) -> f64 {
        self.seo() * 100.0
    }

    /// Server response time, reported as TTFB
    pub fn time_to_first_byte(&self) -> f64 {
        numeric(&self.audits.server_response_time)
    }

    pub fn first_contentful_paint(&self) -> f64 {
        numeric(&self.audits.first_contentful_paint)
    }

    pub fn first_meaningful_paint(&self) -> f64 {
        numeric(&self.audits.first_meaningful_paint)
    }

    pub fn largest_contentful_paint(&self) -> f64 {
        numeric(&self.audits.largest_contentful_paint)
    }

    /// Max potential FID, the lab stand-in for first input delay
    pub fn first_input_delay(&self) -> f64 {
        numeric(&self.audits.max_potential_fid)
    }

    pub fn cumulative_layout_shift(&self) -> f64 {
        numeric(&self.audits.cumulative_layout_shift)
    }
}

/// One trial's raw engine output together with its typed view
#[derive(Debug, Clone)]
pub struct AuditResult {
    raw: Value,
    report: LighthouseReport,
}

impl AuditResult {
    /// Wrap a raw record. A record that does not match the typed view is
    /// kept for persistence and read as all zeros.
    pub fn new(raw: Value) -> Self {
        let report = match serde_json::from_value::<LighthouseReport>(raw.clone()) {
            Ok(report) => report,
            Err(e) => {
                tracing::warn!("Audit result does not look like a Lighthouse report: {}", e);
                LighthouseReport::default()
            }
        };

        if let Some(error) = &report.runtime_error {
            tracing::warn!(
                "Lighthouse reported a runtime error: {} {}",
                error.code.as_deref().unwrap_or("UNKNOWN"),
                error.message.as_deref().unwrap_or("")
            );
        }

        Self { raw, report }
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }

    pub fn report(&self) -> &LighthouseReport {
        &self.report
    }

    pub fn metric(&self, metric: Metric) -> f64 {
        metric.value(&self.report)
    }
}

impl From<Value> for AuditResult {
    fn from(raw: Value) -> Self {
        Self::new(raw)
    }
}

/// Summary table columns, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Performance,
    Accessibility,
    BestPractice,
    Seo,
    FirstContentfulPaint,
    FirstMeaningfulPaint,
    TimeToFirstByte,
    LargestContentfulPaint,
    FirstInputDelay,
    CumulativeLayoutShift,
}

impl Metric {
    pub const COUNT: usize = 10;

    pub const ALL: [Metric; Metric::COUNT] = [
        Metric::Performance,
        Metric::Accessibility,
        Metric::BestPractice,
        Metric::Seo,
        Metric::FirstContentfulPaint,
        Metric::FirstMeaningfulPaint,
        Metric::TimeToFirstByte,
        Metric::LargestContentfulPaint,
        Metric::FirstInputDelay,
        Metric::CumulativeLayoutShift,
    ];

    pub fn header(&self) -> &'static str {
        match self {
            Metric::Performance => "Performance",
            Metric::Accessibility => "Accessibility",
            Metric::BestPractice => "Best Practice",
            Metric::Seo => "SEO",
            Metric::FirstContentfulPaint => "first-contentful-paint",
            Metric::FirstMeaningfulPaint => "first-meaningful-paint",
            Metric::TimeToFirstByte => "time-to-first-byte",
            Metric::LargestContentfulPaint => "largest-contentful-paint",
            Metric::FirstInputDelay => "first-input-delay",
            Metric::CumulativeLayoutShift => "cumulative-layout-shift",
        }
    }

    /// Display value: category scores scaled to 0-100, timings as reported
    pub fn value(&self, report: &LighthouseReport) -> f64 {
        match self {
            Metric::Performance => report.fixed_performance(),
            Metric::Accessibility => report.fixed_accessibility(),
            Metric::BestPractice => report.fixed_best_practice(),
            Metric::Seo => report.fixed_seo(),
            Metric::FirstContentfulPaint => report.first_contentful_paint(),
            Metric::FirstMeaningfulPaint => report.first_meaningful_paint(),
            Metric::TimeToFirstByte => report.time_to_first_byte(),
            Metric::LargestContentfulPaint => report.largest_contentful_paint(),
            Metric::FirstInputDelay => report.first_input_delay(),
            Metric::CumulativeLayoutShift => report.cumulative_layout_shift(),
        }
    }
}
