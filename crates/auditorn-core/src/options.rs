//! Audit options shared by every trial of a run.
//!
//! The throttling presets follow the WebPageTest connectivity profiles and the
//! Lighthouse throttling constants.

use serde::{Deserialize, Serialize};

/// Device emulated by the audit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormFactor {
    #[default]
    Desktop,
    Mobile,
}

impl FormFactor {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormFactor::Desktop => "desktop",
            FormFactor::Mobile => "mobile",
        }
    }

    /// Browser window size as (width, height)
    pub fn window_size(&self) -> (u32, u32) {
        match self {
            FormFactor::Desktop => (1200, 800),
            FormFactor::Mobile => (412, 732),
        }
    }
}

/// Named network/CPU degradation preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ThrottlingProfile {
    #[default]
    #[serde(rename = "no")]
    None,
    #[serde(rename = "lte")]
    Lte,
    #[serde(rename = "3g-fast")]
    ThreeGFast,
}

/// Simulated network and CPU conditions
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThrottlingSettings {
    pub rtt_ms: f64,
    pub throughput_kbps: f64,
    pub request_latency_ms: f64,
    pub download_throughput_kbps: f64,
    pub upload_throughput_kbps: f64,
    pub cpu_slowdown_multiplier: f64,
}

impl ThrottlingSettings {
    /// Mobile LTE
    pub const LTE: ThrottlingSettings = ThrottlingSettings {
        rtt_ms: 70.0,
        throughput_kbps: 12.0 * 1024.0,
        request_latency_ms: 70.0 * 3.75,
        download_throughput_kbps: 12.0 * 1024.0 * 0.9,
        upload_throughput_kbps: 12.0 * 1024.0 * 0.9,
        cpu_slowdown_multiplier: 1.0,
    };

    /// 3G - Fast
    pub const THREE_G_FAST: ThrottlingSettings = ThrottlingSettings {
        rtt_ms: 150.0,
        throughput_kbps: 1.6 * 1024.0,
        request_latency_ms: 150.0 * 3.75,
        download_throughput_kbps: 1.6 * 1024.0 * 0.9,
        upload_throughput_kbps: 750.0 * 0.9,
        cpu_slowdown_multiplier: 4.0,
    };
}

impl ThrottlingProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThrottlingProfile::None => "no",
            ThrottlingProfile::Lte => "lte",
            ThrottlingProfile::ThreeGFast => "3g-fast",
        }
    }

    /// Preset values, `None` when no throttling is simulated
    pub fn settings(&self) -> Option<ThrottlingSettings> {
        match self {
            ThrottlingProfile::None => None,
            ThrottlingProfile::Lte => Some(ThrottlingSettings::LTE),
            ThrottlingProfile::ThreeGFast => Some(ThrottlingSettings::THREE_G_FAST),
        }
    }
}

/// Options bundle handed to the audit engine for one trial
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuditOptions {
    pub headless: bool,
    pub form_factor: FormFactor,
    pub throttling: ThrottlingProfile,
    /// `user:password` sent as a basic-auth header on every request
    pub basic_auth: Option<String>,
    /// Cookie name stamped with the current time to defeat the CDN cache
    pub cache_bypass_cookie: Option<String>,
}

impl AuditOptions {
    pub fn new(headless: bool, form_factor: FormFactor, throttling: ThrottlingProfile) -> Self {
        Self {
            headless,
            form_factor,
            throttling,
            basic_auth: None,
            cache_bypass_cookie: None,
        }
    }

    pub fn with_basic_auth(mut self, credential: Option<String>) -> Self {
        self.basic_auth = credential;
        self
    }

    pub fn with_cache_bypass_cookie(mut self, cookie: Option<String>) -> Self {
        self.cache_bypass_cookie = cookie;
        self
    }

    pub fn is_cache_miss(&self) -> bool {
        self.cache_bypass_cookie.is_some()
    }

    pub fn is_mobile(&self) -> bool {
        self.form_factor == FormFactor::Mobile
    }
}
