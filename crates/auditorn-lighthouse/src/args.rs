use auditorn_core::options::{AuditOptions, FormFactor, ThrottlingProfile};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Map, Value};

/// Lighthouse command-line arguments for one trial
#[derive(Debug, Clone)]
pub struct LighthouseArgs {
    args: Vec<String>,
}

impl LighthouseArgs {
    /// Build arguments for auditing `url`. `stamp` is the value written into
    /// the cache-bypass cookie, normally the current epoch milliseconds.
    pub fn build(url: &str, options: &AuditOptions, stamp: i64) -> Self {
        let mut args = vec![
            "--output=json".to_string(),
            "--output-path=stdout".to_string(),
            "--quiet".to_string(),
            format!("--chrome-flags={}", Self::chrome_flags(options).join(" ")),
        ];

        match options.form_factor {
            FormFactor::Desktop => args.push("--preset=desktop".to_string()),
            FormFactor::Mobile => args.push("--form-factor=mobile".to_string()),
        }

        args.extend(Self::throttling_args(options.throttling));

        let headers = Self::extra_headers(options, stamp);
        if !headers.is_empty() {
            args.push(format!("--extra-headers={}", Value::Object(headers)));
        }

        args.push(url.to_string());

        Self { args }
    }

    pub fn as_slice(&self) -> &[String] {
        &self.args
    }

    /// Flags for the Chrome instance Lighthouse launches
    pub fn chrome_flags(options: &AuditOptions) -> Vec<String> {
        let mut flags = vec![
            "--disable-extensions".to_string(),
            "--disable-gpu".to_string(),
        ];
        if options.headless {
            flags.push("--headless".to_string());
        }
        let (width, height) = options.form_factor.window_size();
        flags.push(format!("--window-size={},{}", width, height));
        flags
    }

    fn throttling_args(profile: ThrottlingProfile) -> Vec<String> {
        match profile.settings() {
            None => vec!["--throttling-method=provided".to_string()],
            Some(settings) => vec![
                "--throttling-method=devtools".to_string(),
                format!("--throttling.rttMs={}", settings.rtt_ms),
                format!("--throttling.throughputKbps={}", settings.throughput_kbps),
                format!("--throttling.requestLatencyMs={}", settings.request_latency_ms),
                format!(
                    "--throttling.downloadThroughputKbps={}",
                    settings.download_throughput_kbps
                ),
                format!(
                    "--throttling.uploadThroughputKbps={}",
                    settings.upload_throughput_kbps
                ),
                format!(
                    "--throttling.cpuSlowdownMultiplier={}",
                    settings.cpu_slowdown_multiplier
                ),
            ],
        }
    }

    /// Headers added to every request the audited page makes
    pub fn extra_headers(options: &AuditOptions, stamp: i64) -> Map<String, Value> {
        let mut headers = Map::new();

        if let Some(credential) = &options.basic_auth {
            headers.insert(
                "Authorization".to_string(),
                Value::String(format!("Basic {}", STANDARD.encode(credential))),
            );
        }

        if let Some(cookie) = &options.cache_bypass_cookie {
            headers.insert(
                "Cookie".to_string(),
                Value::String(format!("{}={};", cookie, stamp)),
            );
        }

        headers
    }
}
