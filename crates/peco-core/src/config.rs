//! Endpoint configuration for the PECO outage client.
//!
//! The endpoints, status code, phone number length and alert markup patterns
//! live in one immutable [`OutageApiConfig`] that is handed to the client at
//! construction time.

use crate::types::DEFAULT_PHONE_NUMBER_LENGTH;
use crate::Error;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Placeholder substituted in URL templates.
pub const URL_PLACEHOLDER: &str = "{}";

/// Current-state endpoint of the PECO storm center.
pub const DEFAULT_API_URL: &str = "https://kubra.io/stormcenter/api/v1/stormcenters/39e6d9f3-fdea-4539-848f-b8631945da6f/views/74de8a50-3f45-4f6a-9483-fd618bb9165d/currentState?preview=false";

/// Per-report endpoint, templated with the report identifier.
pub const DEFAULT_REPORT_URL_TEMPLATE: &str =
    "https://kubra.io/{}/public/reports/a36a6292-1c55-44de-a6a9-44fedf9482ee_report.json";

/// Alert deployment endpoint, templated with the deployment identifier.
pub const DEFAULT_ALERTS_URL_TEMPLATE: &str = "https://kubra.io/stormcenter/api/v1/stormcenters/39e6d9f3-fdea-4539-848f-b8631945da6f/views/74de8a50-3f45-4f6a-9483-fd618bb9165d/alert-deployments/{}";

/// Smart meter account query endpoint.
pub const DEFAULT_QUERY_URL: &str =
    "https://secure.peco.com/.euapi/mobile/custom/anon/PECO/outage/query";

/// Smart meter ping precheck endpoint.
pub const DEFAULT_PRECHECK_URL: &str =
    "https://secure.peco.com/.euapi/mobile/custom/anon/PECO/outage/precheck";

/// Smart meter ping endpoint.
pub const DEFAULT_PING_URL: &str =
    "https://secure.peco.com/.euapi/mobile/custom/anon/PECO/outage/ping";

/// The only status accepted as success.
pub const DEFAULT_STATUS_OK: u16 = 200;

/// Pattern matching any markup tag in alert content.
pub const DEFAULT_TAG_PATTERN: &str = "<[^>]+>";

/// Line-break tag turned into a blank line in alert content.
pub const DEFAULT_LINE_BREAK_TAG: &str = "<br />";

/// Endpoint and protocol configuration for the outage client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct OutageApiConfig {
    /// Current-state endpoint
    #[validate(url)]
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Report endpoint template containing one `{}` placeholder
    #[validate(custom(function = "validate_template"))]
    #[serde(default = "default_report_url_template")]
    pub report_url_template: String,

    /// Alerts endpoint template containing one `{}` placeholder
    #[validate(custom(function = "validate_template"))]
    #[serde(default = "default_alerts_url_template")]
    pub alerts_url_template: String,

    /// Meter query endpoint
    #[validate(url)]
    #[serde(default = "default_query_url")]
    pub query_url: String,

    /// Meter precheck endpoint
    #[validate(url)]
    #[serde(default = "default_precheck_url")]
    pub precheck_url: String,

    /// Meter ping endpoint
    #[validate(url)]
    #[serde(default = "default_ping_url")]
    pub ping_url: String,

    /// HTTP status treated as success
    #[validate(range(min = 100, max = 599))]
    #[serde(default = "default_status_ok")]
    pub status_ok: u16,

    /// Number of digits in a phone number
    #[validate(range(min = 1, max = 32))]
    #[serde(default = "default_phone_number_length")]
    pub phone_number_length: usize,

    /// Regular expression stripped from alert content
    #[validate(custom(function = "validate_pattern"))]
    #[serde(default = "default_tag_pattern")]
    pub tag_pattern: String,

    /// Literal tag replaced by a blank line before stripping
    #[validate(length(min = 1))]
    #[serde(default = "default_line_break_tag")]
    pub line_break_tag: String,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_report_url_template() -> String {
    DEFAULT_REPORT_URL_TEMPLATE.to_string()
}

fn default_alerts_url_template() -> String {
    DEFAULT_ALERTS_URL_TEMPLATE.to_string()
}

fn default_query_url() -> String {
    DEFAULT_QUERY_URL.to_string()
}

fn default_precheck_url() -> String {
    DEFAULT_PRECHECK_URL.to_string()
}

fn default_ping_url() -> String {
    DEFAULT_PING_URL.to_string()
}

const fn default_status_ok() -> u16 {
    DEFAULT_STATUS_OK
}

const fn default_phone_number_length() -> usize {
    DEFAULT_PHONE_NUMBER_LENGTH
}

fn default_tag_pattern() -> String {
    DEFAULT_TAG_PATTERN.to_string()
}

fn default_line_break_tag() -> String {
    DEFAULT_LINE_BREAK_TAG.to_string()
}

fn validate_template(template: &str) -> Result<(), ValidationError> {
    if template.matches(URL_PLACEHOLDER).count() != 1 {
        return Err(ValidationError::new("template_placeholder"));
    }
    url::Url::parse(&template.replace(URL_PLACEHOLDER, "id"))
        .map(|_| ())
        .map_err(|_| ValidationError::new("template_url"))
}

fn validate_pattern(pattern: &str) -> Result<(), ValidationError> {
    Regex::new(pattern)
        .map(|_| ())
        .map_err(|_| ValidationError::new("tag_pattern"))
}

impl OutageApiConfig {
    /// Create a configuration pointing at the production PECO endpoints.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the current-state endpoint.
    #[must_use]
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// Set the report endpoint template.
    #[must_use]
    pub fn with_report_url_template(mut self, template: impl Into<String>) -> Self {
        self.report_url_template = template.into();
        self
    }

    /// Set the alerts endpoint template.
    #[must_use]
    pub fn with_alerts_url_template(mut self, template: impl Into<String>) -> Self {
        self.alerts_url_template = template.into();
        self
    }

    /// Set the meter query endpoint.
    #[must_use]
    pub fn with_query_url(mut self, url: impl Into<String>) -> Self {
        self.query_url = url.into();
        self
    }

    /// Set the meter precheck endpoint.
    #[must_use]
    pub fn with_precheck_url(mut self, url: impl Into<String>) -> Self {
        self.precheck_url = url.into();
        self
    }

    /// Set the meter ping endpoint.
    #[must_use]
    pub fn with_ping_url(mut self, url: impl Into<String>) -> Self {
        self.ping_url = url.into();
        self
    }

    /// Point every endpoint at `base_url`, keeping the upstream paths.
    ///
    /// Used to run the client against a proxy or a local stub.
    #[must_use]
    pub fn with_base_url(self, base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        self.with_api_url(format!("{base}/currentState?preview=false"))
            .with_report_url_template(format!("{base}/{{}}/public/reports/report.json"))
            .with_alerts_url_template(format!("{base}/alert-deployments/{{}}"))
            .with_query_url(format!("{base}/outage/query"))
            .with_precheck_url(format!("{base}/outage/precheck"))
            .with_ping_url(format!("{base}/outage/ping"))
    }

    /// Set the status code treated as success.
    #[must_use]
    pub const fn with_status_ok(mut self, status: u16) -> Self {
        self.status_ok = status;
        self
    }

    /// Set the required phone number length.
    #[must_use]
    pub const fn with_phone_number_length(mut self, length: usize) -> Self {
        self.phone_number_length = length;
        self
    }

    /// Set the markup pattern stripped from alert content.
    #[must_use]
    pub fn with_tag_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.tag_pattern = pattern.into();
        self
    }

    /// Run all validation rules.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] describing every failed rule.
    pub fn validate_config(&self) -> Result<(), Error> {
        self.validate()
            .map_err(|e| Error::ConfigError(format!("Invalid configuration: {e}")))
    }

    /// Render the report URL for a report identifier.
    #[must_use]
    pub fn render_report_url(&self, report_id: &str) -> String {
        self.report_url_template.replacen(URL_PLACEHOLDER, report_id, 1)
    }

    /// Render the alerts URL for a deployment identifier.
    #[must_use]
    pub fn render_alerts_url(&self, deployment_id: &str) -> String {
        self.alerts_url_template
            .replacen(URL_PLACEHOLDER, deployment_id, 1)
    }

    /// Compile the alert markup pattern.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the pattern does not compile.
    pub fn compile_tag_pattern(&self) -> Result<Regex, Error> {
        Regex::new(&self.tag_pattern).map_err(Error::from)
    }

    /// Return the success status as a [`reqwest::StatusCode`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] for codes outside the valid range.
    pub fn status_code(&self) -> Result<reqwest::StatusCode, Error> {
        reqwest::StatusCode::from_u16(self.status_ok)
            .map_err(|e| Error::ConfigError(format!("Invalid status code {}: {e}", self.status_ok)))
    }
}

impl Default for OutageApiConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            report_url_template: default_report_url_template(),
            alerts_url_template: default_alerts_url_template(),
            query_url: default_query_url(),
            precheck_url: default_precheck_url(),
            ping_url: default_ping_url(),
            status_ok: default_status_ok(),
            phone_number_length: default_phone_number_length(),
            tag_pattern: default_tag_pattern(),
            line_break_tag: default_line_break_tag(),
        }
    }
}
