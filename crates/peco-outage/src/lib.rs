//! PECO outage client.
//!
//! Provides an asynchronous client for the PECO outage map (county and
//! territory outage counts, banner alerts) and the smart meter power check.

#![deny(missing_docs)]

pub mod alert;
pub mod client;
pub mod models;

pub use client::{OutageClient, OutageClientBuilder};
pub use models::{AlertResult, MeterTokens, OutageResult};
pub use peco_core::types::{County, PhoneNumber};

/// Convenient result alias that reuses the shared PECO error type.
pub type Result<T> = peco_core::Result<T>;
