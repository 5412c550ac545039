//! # peco-core
//!
//! Core types and utilities for talking to the PECO outage service.
//!
//! This crate provides the error taxonomy, endpoint configuration, the JSON
//! transport with its session capability, and the field extraction helpers
//! that the outage client builds its pipelines from.
//!
//! ## Modules
//!
//! - [`error`] - Error types and their classification
//! - [`config`] - Endpoint configuration replacing hard-coded constants
//! - [`client`] - HTTP transport, session providers and client tuning
//! - [`extract`] - Nested JSON field extraction
//! - [`types`] - Validated domain inputs (counties, phone numbers)

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod config;
pub mod error;
pub mod extract;
pub mod types;

// Re-export commonly used types
pub use error::{Error, ErrorKind, Result};
