//! Error types for PECO operations.
//!
//! Every failure surfaced by the client is one [`Error`] variant. Variants are
//! grouped into an [`ErrorKind`] so callers can tell bad input from transport
//! failures, unexpected response shapes and negative meter outcomes.

use thiserror::Error;

/// Main error type for PECO operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// County name outside the served set
    #[error("{0} is not a valid county")]
    InvalidCounty(String),

    /// Malformed phone number
    #[error("Invalid phone number: {0}")]
    InvalidPhoneNumber(String),

    /// Non-OK status, failed `success` flag or transport failure
    #[error("Bad response from PECO: {0}")]
    HttpError(String),

    /// Successful response with an unexpected shape
    #[error("Bad JSON returned from PECO: {0}")]
    BadJson(String),

    /// The account's meter cannot be pinged remotely
    #[error("Meter is not compatible with the API")]
    IncompatibleMeter,

    /// Precheck reported that the meter will not answer a ping
    #[error("Meter is not responding")]
    UnresponsiveMeter,

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Invalid endpoint
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

/// Specialized result type for PECO operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Broad classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Caller input rejected before any request was sent
    InvalidArgument,
    /// The upstream could not be reached or answered with a failure
    Transport,
    /// The upstream answered successfully with an unexpected shape
    Protocol,
    /// A valid but negative smart-meter outcome
    Meter,
    /// The client itself is misconfigured
    Configuration,
}

impl Error {
    /// Returns the classification of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidCounty(_) | Self::InvalidPhoneNumber(_) => ErrorKind::InvalidArgument,
            Self::HttpError(_) => ErrorKind::Transport,
            Self::BadJson(_) => ErrorKind::Protocol,
            Self::IncompatibleMeter | Self::UnresponsiveMeter => ErrorKind::Meter,
            Self::ConfigError(_) | Self::InvalidEndpoint(_) => ErrorKind::Configuration,
        }
    }

    /// Returns the error code for this error type.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidCounty(_) => "INVALID_COUNTY",
            Self::InvalidPhoneNumber(_) => "INVALID_PHONE_NUMBER",
            Self::HttpError(_) => "HTTP_ERROR",
            Self::BadJson(_) => "BAD_JSON",
            Self::IncompatibleMeter => "INCOMPATIBLE_METER",
            Self::UnresponsiveMeter => "UNRESPONSIVE_METER",
            Self::ConfigError(_) => "CONFIG_ERROR",
            Self::InvalidEndpoint(_) => "INVALID_ENDPOINT",
        }
    }

    /// Returns true when repeating the same call may succeed.
    ///
    /// The client never retries on its own; this only informs caller policy.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self.kind(), ErrorKind::Transport)
    }

    /// Returns true for input validation failures.
    #[must_use]
    pub const fn is_invalid_argument(&self) -> bool {
        matches!(self.kind(), ErrorKind::InvalidArgument)
    }
}

// Conversions from external error types
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::HttpError(format!("request timed out: {err}"))
        } else if err.is_connect() {
            Self::HttpError(format!("connection failed: {err}"))
        } else {
            Self::HttpError(err.to_string())
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidEndpoint(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::BadJson(err.to_string())
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::ConfigError(err.to_string())
    }
}

impl From<regex::Error> for Error {
    fn from(err: regex::Error) -> Self {
        Self::ConfigError(format!("invalid tag pattern: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            Error::InvalidCounty("test".to_string()).error_code(),
            "INVALID_COUNTY"
        );
        assert_eq!(
            Error::InvalidPhoneNumber("test".to_string()).error_code(),
            "INVALID_PHONE_NUMBER"
        );
        assert_eq!(
            Error::HttpError("test".to_string()).error_code(),
            "HTTP_ERROR"
        );
        assert_eq!(Error::BadJson("test".to_string()).error_code(), "BAD_JSON");
        assert_eq!(Error::IncompatibleMeter.error_code(), "INCOMPATIBLE_METER");
        assert_eq!(Error::UnresponsiveMeter.error_code(), "UNRESPONSIVE_METER");
        assert_eq!(
            Error::ConfigError("test".to_string()).error_code(),
            "CONFIG_ERROR"
        );
        assert_eq!(
            Error::InvalidEndpoint("test".to_string()).error_code(),
            "INVALID_ENDPOINT"
        );
    }

    #[test]
    fn test_error_display() {
        let err = Error::InvalidCounty("GOTHAM".to_string());
        assert_eq!(err.to_string(), "GOTHAM is not a valid county");

        let err = Error::IncompatibleMeter;
        assert_eq!(err.to_string(), "Meter is not compatible with the API");

        let err = Error::BadJson("missing `file_data.areas`".to_string());
        assert_eq!(
            err.to_string(),
            "Bad JSON returned from PECO: missing `file_data.areas`"
        );
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            Error::InvalidCounty(String::new()).kind(),
            ErrorKind::InvalidArgument
        );
        assert_eq!(
            Error::InvalidPhoneNumber(String::new()).kind(),
            ErrorKind::InvalidArgument
        );
        assert_eq!(Error::HttpError(String::new()).kind(), ErrorKind::Transport);
        assert_eq!(Error::BadJson(String::new()).kind(), ErrorKind::Protocol);
        assert_eq!(Error::IncompatibleMeter.kind(), ErrorKind::Meter);
        assert_eq!(Error::UnresponsiveMeter.kind(), ErrorKind::Meter);
        assert_eq!(
            Error::InvalidEndpoint(String::new()).kind(),
            ErrorKind::Configuration
        );
    }

    #[test]
    fn test_only_transport_errors_are_retryable() {
        assert!(Error::HttpError("503".to_string()).is_retryable());

        assert!(!Error::BadJson("shape".to_string()).is_retryable());
        assert!(!Error::IncompatibleMeter.is_retryable());
        assert!(!Error::InvalidCounty("X".to_string()).is_retryable());
    }

    #[test]
    fn test_is_invalid_argument() {
        assert!(Error::InvalidPhoneNumber("short".to_string()).is_invalid_argument());
        assert!(!Error::UnresponsiveMeter.is_invalid_argument());
    }

    #[test]
    fn test_from_url_parse_error() {
        let err = url::Url::parse("not a url").unwrap_err();
        let peco_err: Error = err.into();
        assert!(matches!(peco_err, Error::InvalidEndpoint(_)));
    }

    #[test]
    fn test_from_serde_json_error() {
        let err = serde_json::from_str::<serde_json::Value>("{invalid json}").unwrap_err();
        let peco_err: Error = err.into();
        assert!(matches!(peco_err, Error::BadJson(_)));
    }

    #[test]
    fn test_from_regex_error() {
        let err = regex::Regex::new("<[^>+").unwrap_err();
        let peco_err: Error = err.into();
        assert!(matches!(peco_err, Error::ConfigError(_)));
    }

    #[test]
    fn test_error_clone() {
        let err = Error::BadJson("test".to_string());
        let cloned = err.clone();
        assert_eq!(err, cloned);
    }
}
