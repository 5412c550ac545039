//! Asynchronous PECO outage client.

use crate::alert::AlertFormatter;
use crate::models::{
    AlertResult, MeterPingRequest, MeterPrecheckRequest, MeterQueryRequest, MeterTokens,
    OutageResult,
};
use crate::Result;
use peco_core::client::{
    ClientConfig, ConnectionProvider, EphemeralSessions, JsonTransport, SharedSession,
};
use peco_core::config::OutageApiConfig;
use peco_core::extract::{extract, extract_array, extract_as, extract_flag};
use peco_core::types::{County, PhoneNumber};
use peco_core::Error;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

const USER_AGENT: &str = concat!("peco-outage/", env!("CARGO_PKG_VERSION"));

const REPORT_ID_PATH: &[&str] = &["data", "interval_generation_data"];
const AREAS_PATH: &[&str] = &["file_data", "areas"];
const TOTALS_PATH: &[&str] = &["file_data", "totals"];
const DEPLOYMENT_ID_PATH: &[&str] = &["controlCenter", "alertDeploymentId"];
const ALERT_PATH: &[&str] = &["_embedded", "deployedAlertResourceList", "0", "data", "0"];

/// Builder for [`OutageClient`].
#[derive(Clone)]
pub struct OutageClientBuilder {
    config: OutageApiConfig,
    http_config: ClientConfig,
    provider: Option<Arc<dyn ConnectionProvider>>,
}

impl OutageClientBuilder {
    /// Create a builder for the given endpoint configuration.
    #[must_use]
    pub fn new(config: OutageApiConfig) -> Self {
        Self {
            config,
            http_config: ClientConfig::new().with_user_agent(USER_AGENT),
            provider: None,
        }
    }

    /// Override the HTTP configuration used for per-request sessions.
    #[must_use]
    pub fn with_http_config(mut self, config: ClientConfig) -> Self {
        self.http_config = config;
        self
    }

    /// Reuse a caller-owned `reqwest::Client` for every request.
    #[must_use]
    pub fn with_session(self, client: reqwest::Client) -> Self {
        self.with_connection_provider(Arc::new(SharedSession::new(client)))
    }

    /// Use a custom connection provider.
    #[must_use]
    pub fn with_connection_provider(mut self, provider: Arc<dyn ConnectionProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Validate the configuration and build the client.
    pub fn build(self) -> Result<OutageClient> {
        self.config.validate_config()?;

        let expected_status = self.config.status_code()?;
        let formatter = AlertFormatter::new(
            self.config.compile_tag_pattern()?,
            self.config.line_break_tag.clone(),
        );
        let provider: Arc<dyn ConnectionProvider> = match self.provider {
            Some(provider) => provider,
            None => Arc::new(EphemeralSessions::new(self.http_config)),
        };

        Ok(OutageClient {
            config: Arc::new(self.config),
            transport: JsonTransport::new(provider, expected_status),
            formatter,
        })
    }
}

impl Default for OutageClientBuilder {
    fn default() -> Self {
        Self::new(OutageApiConfig::default())
    }
}

/// Asynchronous client for the PECO outage map and smart meter check.
///
/// Holds no mutable state; clones share configuration and connection
/// provider, and concurrent calls are independent.
#[derive(Clone)]
pub struct OutageClient {
    config: Arc<OutageApiConfig>,
    transport: JsonTransport,
    formatter: AlertFormatter,
}

impl OutageClient {
    /// Client for the production endpoints that opens a connection per request.
    pub fn new() -> Result<Self> {
        OutageClientBuilder::default().build()
    }

    /// Client for the production endpoints that reuses `client`.
    pub fn with_session(client: reqwest::Client) -> Result<Self> {
        OutageClientBuilder::default().with_session(client).build()
    }

    /// Start a builder for a custom configuration.
    #[must_use]
    pub fn builder(config: OutageApiConfig) -> OutageClientBuilder {
        OutageClientBuilder::new(config)
    }

    /// Access the endpoint configuration.
    #[must_use]
    pub fn config(&self) -> &OutageApiConfig {
        &self.config
    }

    /// Outage statistics for one county.
    ///
    /// The county name is validated before any request is sent. A report
    /// that does not list the county yields an all-zero result.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidCounty`] for unknown names, [`Error::HttpError`] for
    /// failed requests and [`Error::BadJson`] for unexpected responses.
    pub async fn get_outage_count(&self, county: &str) -> Result<OutageResult> {
        let county: County = county.parse()?;
        self.get_outage_count_for(county).await
    }

    /// Outage statistics for an already validated county.
    ///
    /// # Errors
    ///
    /// Same as [`OutageClient::get_outage_count`] minus name validation.
    pub async fn get_outage_count_for(&self, county: County) -> Result<OutageResult> {
        let report = self.fetch_report().await?;
        let areas = extract_array(&report, AREAS_PATH)?;

        // Later records with the same name replace earlier ones.
        let mut matched = None;
        for area in areas {
            if extract(area, &["name"])?.as_str() == Some(county.name()) {
                matched = Some(area);
            }
        }

        match matched {
            Some(area) => OutageResult::from_record(area),
            None => {
                debug!(%county, "county not listed in outage report, reporting no outages");
                Ok(OutageResult::default())
            }
        }
    }

    /// Outage statistics for the whole service territory.
    ///
    /// # Errors
    ///
    /// [`Error::HttpError`] for failed requests and [`Error::BadJson`] for
    /// unexpected responses.
    pub async fn get_outage_totals(&self) -> Result<OutageResult> {
        let report = self.fetch_report().await?;
        OutageResult::from_record(extract(&report, TOTALS_PATH)?)
    }

    /// The banner alert currently shown on the outage map.
    ///
    /// Returns an empty [`AlertResult`] when no alert is deployed or the
    /// deployment carries no alert data.
    ///
    /// # Errors
    ///
    /// [`Error::HttpError`] for failed requests and [`Error::BadJson`] when
    /// the current state lacks the deployment id or the alert record lacks
    /// its fields.
    pub async fn get_map_alerts(&self) -> Result<AlertResult> {
        let state = self.transport.get_json(&self.config.api_url).await?;

        let Some(deployment_id) = extract_token(&state, DEPLOYMENT_ID_PATH)? else {
            debug!("no alert deployed");
            return Ok(AlertResult::none());
        };

        let alerts_url = self.config.render_alerts_url(&deployment_id);
        let deployment = self.transport.get_json(&alerts_url).await?;

        // Only the first alert of the first deployment is shown on the map.
        let Ok(alert) = extract(&deployment, ALERT_PATH) else {
            debug!(%deployment_id, "alert deployment has no alert data");
            return Ok(AlertResult::none());
        };

        let content: String = extract_as(alert, &["content"])?;
        let title: String = extract_as(alert, &["bannerTitle"])?;

        Ok(AlertResult {
            alert_title: title,
            alert_content: self.formatter.render(&content),
        })
    }

    /// Check whether power is reaching the meter on the account for
    /// `phone_number`.
    ///
    /// Runs the query, precheck and ping steps in order and stops at the
    /// first failure.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidPhoneNumber`] for malformed input,
    /// [`Error::IncompatibleMeter`] when the account has no pingable smart
    /// meter, [`Error::UnresponsiveMeter`] when the precheck says the meter
    /// will not answer, [`Error::HttpError`] for failed requests or a false
    /// `success` flag and [`Error::BadJson`] for unexpected responses.
    pub async fn meter_check(&self, phone_number: &str) -> Result<bool> {
        let phone = PhoneNumber::parse_with_length(phone_number, self.config.phone_number_length)?;
        debug!(phone = %phone.redacted(), "starting meter check");

        let tokens = self.query_meter(&phone).await?;
        self.precheck_meter(&tokens, &phone).await?;
        self.ping_meter(&tokens).await
    }

    async fn fetch_report(&self) -> Result<Value> {
        let state = self.transport.get_json(&self.config.api_url).await?;
        let report_id = extract_token(&state, REPORT_ID_PATH)?.ok_or_else(|| {
            Error::BadJson(format!("null `{}`", REPORT_ID_PATH.join(".")))
        })?;
        debug!(%report_id, "resolved outage report");

        let report_url = self.config.render_report_url(&report_id);
        self.transport.get_json(&report_url).await
    }

    async fn query_meter(&self, phone: &PhoneNumber) -> Result<MeterTokens> {
        let response = self
            .transport
            .post_json(&self.config.query_url, &MeterQueryRequest { phone })
            .await?;
        ensure_success(&response, "query")?;

        let account = extract(&response, &["data", "0"])?;
        if !extract_flag(account, &["smartMeterStatus"])? {
            return Err(Error::IncompatibleMeter);
        }

        Ok(MeterTokens {
            auid: extract(account, &["auid"])?.clone(),
            account_number: extract(account, &["accountNumber"])?.clone(),
        })
    }

    async fn precheck_meter(&self, tokens: &MeterTokens, phone: &PhoneNumber) -> Result<()> {
        let response = self
            .transport
            .post_json(
                &self.config.precheck_url,
                &MeterPrecheckRequest { tokens, phone },
            )
            .await?;
        ensure_success(&response, "precheck")?;

        if extract_flag(&response, &["data", "meterPing"])? {
            Ok(())
        } else {
            Err(Error::UnresponsiveMeter)
        }
    }

    async fn ping_meter(&self, tokens: &MeterTokens) -> Result<bool> {
        let response = self
            .transport
            .post_json(&self.config.ping_url, &MeterPingRequest { tokens })
            .await?;
        ensure_success(&response, "ping")?;

        extract_flag(&response, &["data", "meterInfo", "pingResult"])
    }
}

/// Reads an opaque identifier. Strings are used as-is and numbers by their
/// decimal text; `null` means absent.
fn extract_token(value: &Value, path: &[&str]) -> Result<Option<String>> {
    match extract(value, path)? {
        Value::Null => Ok(None),
        Value::String(token) => Ok(Some(token.clone())),
        Value::Number(token) => Ok(Some(token.to_string())),
        _ => Err(Error::BadJson(format!(
            "expected a string or number at `{}`",
            path.join(".")
        ))),
    }
}

fn ensure_success(response: &Value, step: &str) -> Result<()> {
    if extract_flag(response, &["success"])? {
        Ok(())
    } else {
        Err(Error::HttpError(format!("meter {step} reported success=false")))
    }
}
