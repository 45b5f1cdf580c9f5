//! Error types
//!
//! Every pipeline failure becomes a [`PipelineError`] that ends up in
//! `ViewState.error`. Its message is shown to the user as is.

use std::fmt;

use thiserror::Error;

/// Geolocation failure codes, as reported by position providers
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GeolocationErrorCode {
    PermissionDenied,
    PositionUnavailable,
    Timeout,
}

impl GeolocationErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeolocationErrorCode::PermissionDenied => "PERMISSION_DENIED",
            GeolocationErrorCode::PositionUnavailable => "POSITION_UNAVAILABLE",
            GeolocationErrorCode::Timeout => "TIMEOUT",
        }
    }

    /// Map the numeric codes used by position APIs (1, 2, 3).
    pub fn from_numeric(code: u16) -> Option<Self> {
        match code {
            1 => Some(GeolocationErrorCode::PermissionDenied),
            2 => Some(GeolocationErrorCode::PositionUnavailable),
            3 => Some(GeolocationErrorCode::Timeout),
            _ => None,
        }
    }
}

impl fmt::Display for GeolocationErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which stage failed, and how
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PipelineErrorKind {
    PermissionQueryFailed,
    GeolocationFailed(GeolocationErrorCode),
    NetworkFailed,
    ParseFailed,
}

impl fmt::Display for PipelineErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineErrorKind::PermissionQueryFailed => f.write_str("PermissionQueryFailed"),
            PipelineErrorKind::GeolocationFailed(code) => write!(f, "GeolocationFailed({code})"),
            PipelineErrorKind::NetworkFailed => f.write_str("NetworkFailed"),
            PipelineErrorKind::ParseFailed => f.write_str("ParseFailed"),
        }
    }
}

/// A failure of one pipeline stage
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct PipelineError {
    pub kind: PipelineErrorKind,
    pub message: String,
}

impl PipelineError {
    pub fn new(kind: PipelineErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn permission_query(message: impl Into<String>) -> Self {
        Self::new(PipelineErrorKind::PermissionQueryFailed, message)
    }

    pub fn geolocation(code: GeolocationErrorCode, message: impl Into<String>) -> Self {
        Self::new(PipelineErrorKind::GeolocationFailed(code), message)
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(PipelineErrorKind::NetworkFailed, message)
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(PipelineErrorKind::ParseFailed, message)
    }

    /// The geolocation code, for `GeolocationFailed` errors.
    pub fn geolocation_code(&self) -> Option<GeolocationErrorCode> {
        match self.kind {
            PipelineErrorKind::GeolocationFailed(code) => Some(code),
            _ => None,
        }
    }
}

/// Error returned by a location capability
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{code}: {message}")]
pub struct GeolocationError {
    pub code: GeolocationErrorCode,
    pub message: String,
}

impl GeolocationError {
    pub fn new(code: GeolocationErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl From<GeolocationError> for PipelineError {
    fn from(err: GeolocationError) -> Self {
        PipelineError::geolocation(err.code, err.message)
    }
}

/// Error returned by a permission capability's query
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct PermissionQueryError(pub String);

impl From<PermissionQueryError> for PipelineError {
    fn from(err: PermissionQueryError) -> Self {
        PipelineError::permission_query(err.0)
    }
}

/// Invalid command line or environment configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {name} URL {value:?}: {reason}")]
    InvalidUrl {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("timeout must be at least one second")]
    ZeroTimeout,

    #[error("--lat and --lon must be given together")]
    PartialPosition,

    #[error("{name} {value} is out of range")]
    OutOfRange { name: &'static str, value: f64 },

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_shown_verbatim() {
        let err = PipelineError::network("connection refused");
        assert_eq!(err.to_string(), "connection refused");
        assert_eq!(err.kind, PipelineErrorKind::NetworkFailed);
    }

    #[test]
    fn test_geolocation_codes() {
        assert_eq!(
            GeolocationErrorCode::PermissionDenied.to_string(),
            "PERMISSION_DENIED"
        );
        assert_eq!(
            GeolocationErrorCode::from_numeric(3),
            Some(GeolocationErrorCode::Timeout)
        );
        assert_eq!(GeolocationErrorCode::from_numeric(0), None);
    }

    #[test]
    fn test_geolocation_error_conversion() {
        let err: PipelineError =
            GeolocationError::new(GeolocationErrorCode::PermissionDenied, "User denied").into();

        assert_eq!(
            err.kind,
            PipelineErrorKind::GeolocationFailed(GeolocationErrorCode::PermissionDenied)
        );
        assert_eq!(
            err.geolocation_code(),
            Some(GeolocationErrorCode::PermissionDenied)
        );
        assert_eq!(err.message, "User denied");
        assert_eq!(err.kind.to_string(), "GeolocationFailed(PERMISSION_DENIED)");
    }

    #[test]
    fn test_permission_query_conversion() {
        let err: PipelineError = PermissionQueryError("not supported".into()).into();
        assert_eq!(err.kind, PipelineErrorKind::PermissionQueryFailed);
        assert_eq!(err.geolocation_code(), None);
    }

    #[test]
    fn test_config_error_display() {
        assert_eq!(
            ConfigError::OutOfRange {
                name: "latitude",
                value: 91.0
            }
            .to_string(),
            "latitude 91 is out of range"
        );
    }
}
