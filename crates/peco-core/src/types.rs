//! Validated domain inputs.
//!
//! Counties and phone numbers are checked here, before any request is built,
//! so invalid input never reaches the network.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Default number of digits in a phone number.
pub const DEFAULT_PHONE_NUMBER_LENGTH: usize = 10;

/// Counties served by PECO.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum County {
    /// Bucks County
    Bucks,
    /// Chester County
    Chester,
    /// Delaware County
    Delaware,
    /// Montgomery County
    Montgomery,
    /// Philadelphia County
    Philadelphia,
    /// York County
    York,
}

impl County {
    /// Returns the name used for the county in outage reports.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Bucks => "BUCKS",
            Self::Chester => "CHESTER",
            Self::Delaware => "DELAWARE",
            Self::Montgomery => "MONTGOMERY",
            Self::Philadelphia => "PHILADELPHIA",
            Self::York => "YORK",
        }
    }

    /// Returns all served counties.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Bucks,
            Self::Chester,
            Self::Delaware,
            Self::Montgomery,
            Self::Philadelphia,
            Self::York,
        ]
    }
}

impl FromStr for County {
    type Err = Error;

    /// Parses a report name. Matching is exact and case-sensitive.
    fn from_str(s: &str) -> Result<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|county| county.name() == s)
            .ok_or_else(|| Error::InvalidCounty(s.to_string()))
    }
}

impl fmt::Display for County {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A phone number made of ASCII digits only.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Parses a ten digit phone number.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPhoneNumber`] if the input is not exactly ten
    /// ASCII digits.
    pub fn parse(input: &str) -> Result<Self> {
        Self::parse_with_length(input, DEFAULT_PHONE_NUMBER_LENGTH)
    }

    /// Parses a phone number that must have exactly `length` digits.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPhoneNumber`] on a length mismatch or when any
    /// character is not an ASCII digit.
    pub fn parse_with_length(input: &str, length: usize) -> Result<Self> {
        if input.chars().count() != length {
            return Err(Error::InvalidPhoneNumber(format!(
                "Phone number must be {length} digits"
            )));
        }

        if !input.chars().all(|c| c.is_ascii_digit()) {
            return Err(Error::InvalidPhoneNumber(
                "Phone number must be numeric".to_string(),
            ));
        }

        Ok(Self(input.to_string()))
    }

    /// Returns the digits.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the number with all but the last four digits masked.
    #[must_use]
    pub fn redacted(&self) -> String {
        let visible = self.0.len().saturating_sub(4);
        let mut masked = "*".repeat(visible);
        masked.push_str(&self.0[visible..]);
        masked
    }
}

impl fmt::Debug for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PhoneNumber").field(&self.redacted()).finish()
    }
}

impl FromStr for PhoneNumber {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for PhoneNumber {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}
