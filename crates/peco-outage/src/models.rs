//! Data models for outage reports, map alerts and meter checks.

use peco_core::extract::extract_as;
use peco_core::types::PhoneNumber;
use peco_core::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outage statistics for one county or for the whole service territory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutageResult {
    /// Customers currently without power
    pub customers_out: u64,
    /// Share of served customers without power, in percent
    pub percent_customers_out: i64,
    /// Number of distinct outages
    pub outage_count: u64,
    /// Customers served in the area
    pub customers_served: u64,
}

impl OutageResult {
    /// Read an area record or the totals object of an outage report.
    ///
    /// # Errors
    ///
    /// Returns [`peco_core::Error::BadJson`] if any statistic is missing or
    /// not an integer.
    pub fn from_record(record: &Value) -> Result<Self> {
        Ok(Self {
            customers_out: extract_as(record, &["cust_a", "val"])?,
            percent_customers_out: extract_as(record, &["percent_cust_a", "val"])?,
            outage_count: extract_as(record, &["n_out"])?,
            customers_served: extract_as(record, &["cust_s"])?,
        })
    }
}

/// The banner alert shown on the outage map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AlertResult {
    /// Banner title
    pub alert_title: String,
    /// Alert body with markup removed
    pub alert_content: String,
}

impl AlertResult {
    /// Result used when no alert is active.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Returns true when no alert is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.alert_title.is_empty() && self.alert_content.is_empty()
    }
}

/// Correlation tokens returned by the meter query step.
///
/// The values are opaque and echoed back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeterTokens {
    /// Account user id
    pub auid: Value,
    /// Account number
    #[serde(rename = "accountNumber")]
    pub account_number: Value,
}

/// Body of the meter query request.
#[derive(Debug, Serialize)]
pub struct MeterQueryRequest<'a> {
    /// Phone number on the account
    pub phone: &'a PhoneNumber,
}

/// Body of the meter precheck request.
#[derive(Debug, Serialize)]
pub struct MeterPrecheckRequest<'a> {
    /// Tokens from the query step
    #[serde(flatten)]
    pub tokens: &'a MeterTokens,
    /// Phone number on the account
    pub phone: &'a PhoneNumber,
}

/// Body of the meter ping request.
#[derive(Debug, Serialize)]
pub struct MeterPingRequest<'a> {
    /// Tokens from the query step
    #[serde(flatten)]
    pub tokens: &'a MeterTokens,
}
