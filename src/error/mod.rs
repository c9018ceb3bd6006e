//! Error Types
//!
//! Error hierarchy for credential and reporting operations.
//!
//! Only local failures are raised. A provider that rejects a request answers
//! with a non-200 status, which reaches the caller as the `http_code` field of
//! an otherwise normal response.

use std::time::Duration;
use thiserror::Error;

/// Root error type for the analytics integration.
#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Key material error: {0}")]
    KeyMaterial(#[from] KeyMaterialError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),
}

impl AnalyticsError {
    /// Get error code for telemetry.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "ANALYTICS_CONFIG",
            Self::KeyMaterial(KeyMaterialError::KeyNotFound { .. }) => "ANALYTICS_KEY_NOT_FOUND",
            Self::KeyMaterial(KeyMaterialError::InvalidKeyStore { .. }) => {
                "ANALYTICS_INVALID_KEY_STORE"
            }
            Self::KeyMaterial(KeyMaterialError::SigningFailed { .. }) => "ANALYTICS_SIGNING",
            Self::Transport(TransportError::NoOp) => "ANALYTICS_NO_OP",
            Self::Transport(_) => "ANALYTICS_TRANSPORT",
            Self::Decode(_) => "ANALYTICS_DECODE",
        }
    }

    /// Check if the error was raised before any request left the process.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            Self::Configuration(_) | Self::KeyMaterial(_) | Self::Transport(TransportError::NoOp)
        )
    }
}

/// Configuration error.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("Missing required field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid endpoint URL: {url}")]
    InvalidEndpoint { url: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl ConfigurationError {
    pub(crate) fn missing(field: &str) -> Self {
        Self::MissingRequired {
            field: field.to_string(),
        }
    }
}

/// Service-account key material error.
#[derive(Error, Debug)]
pub enum KeyMaterialError {
    #[error("Key store not found: {path}")]
    KeyNotFound { path: String },

    #[error("Invalid key store: {message}")]
    InvalidKeyStore { message: String },

    #[error("Signing failed: {message}")]
    SigningFailed { message: String },
}

/// Transport-level error.
///
/// `NoOp` means nothing was sent at all, which is distinct from a request
/// that was attempted and failed.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("No request sent: empty URL")]
    NoOp,

    #[error("Connection failed: {message}")]
    ConnectionFailed { message: String },

    #[error("Request timeout")]
    Timeout,

    #[error("Failed to read response body: {message}")]
    BodyRead { message: String },
}

impl TransportError {
    /// Check if this is the empty-URL sentinel.
    pub fn is_no_op(&self) -> bool {
        matches!(self, Self::NoOp)
    }
}

/// Response decoding error.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("Invalid JSON (HTTP {status}): {message}")]
    InvalidJson { status: u16, message: String },
}

/// Provider (OAuth2 server) error.
///
/// Never raised by this crate. Built on demand from a response body so a
/// caller can branch on the provider's error code.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    #[error("Invalid client credentials")]
    InvalidClient { error_description: Option<String> },

    #[error("Invalid grant: {message}")]
    InvalidGrant { message: String },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Invalid scope: {scope}")]
    InvalidScope { scope: String },

    #[error("Unauthorized client for this grant type")]
    UnauthorizedClient { error_description: Option<String> },

    #[error("Unsupported grant type: {grant_type}")]
    UnsupportedGrantType { grant_type: String },

    #[error("Server error: {message}")]
    ServerError { message: String },

    #[error("Server temporarily unavailable")]
    TemporarilyUnavailable { retry_after: Option<Duration> },
}

/// Result type for analytics operations.
pub type AnalyticsResult<T> = Result<T, AnalyticsError>;

/// OAuth2 error response from provider.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct OAuth2ErrorResponse {
    pub error: String,
    #[serde(default)]
    pub error_description: Option<String>,
    #[serde(default)]
    pub error_uri: Option<String>,
}

/// Map token error response to error type.
pub fn map_token_error(response: &OAuth2ErrorResponse) -> ProviderError {
    match response.error.as_str() {
        "invalid_client" => ProviderError::InvalidClient {
            error_description: response.error_description.clone(),
        },
        "invalid_grant" => ProviderError::InvalidGrant {
            message: response
                .error_description
                .clone()
                .unwrap_or_else(|| "Invalid grant".to_string()),
        },
        "invalid_request" => ProviderError::InvalidRequest {
            message: response
                .error_description
                .clone()
                .unwrap_or_else(|| "Invalid request".to_string()),
        },
        "invalid_scope" => ProviderError::InvalidScope {
            scope: response.error_description.clone().unwrap_or_default(),
        },
        "unauthorized_client" => ProviderError::UnauthorizedClient {
            error_description: response.error_description.clone(),
        },
        "unsupported_grant_type" => ProviderError::UnsupportedGrantType {
            grant_type: response.error_description.clone().unwrap_or_default(),
        },
        "server_error" => ProviderError::ServerError {
            message: response
                .error_description
                .clone()
                .unwrap_or_else(|| "Server error".to_string()),
        },
        "temporarily_unavailable" => ProviderError::TemporarilyUnavailable { retry_after: None },
        _ => ProviderError::InvalidRequest {
            message: response
                .error_description
                .clone()
                .unwrap_or_else(|| response.error.clone()),
        },
    }
}

/// Map a bare HTTP status (no OAuth error body) to a provider error.
pub fn map_status_error(status: u16) -> ProviderError {
    match status {
        400 => ProviderError::InvalidRequest {
            message: "Bad request".to_string(),
        },
        401 => ProviderError::InvalidClient {
            error_description: Some("Unauthorized".to_string()),
        },
        403 => ProviderError::UnauthorizedClient {
            error_description: Some("Forbidden".to_string()),
        },
        429 => ProviderError::TemporarilyUnavailable {
            retry_after: Some(Duration::from_secs(60)),
        },
        _ => ProviderError::ServerError {
            message: format!("HTTP {}", status),
        },
    }
}

/// Get user-friendly error message.
pub fn get_user_message(error: &AnalyticsError) -> String {
    match error {
        AnalyticsError::Configuration(ConfigurationError::MissingRequired { field }) => {
            format!("The analytics client is missing its {}.", field)
        }
        AnalyticsError::Configuration(_) => {
            "The analytics client is misconfigured. Please check its settings.".to_string()
        }
        AnalyticsError::KeyMaterial(KeyMaterialError::KeyNotFound { .. }) => {
            "The service account key file could not be found.".to_string()
        }
        AnalyticsError::KeyMaterial(_) => {
            "The service account key could not be used. Please check the key file and passphrase."
                .to_string()
        }
        AnalyticsError::Transport(TransportError::Timeout) => {
            "The request timed out. Please check your connection and try again.".to_string()
        }
        AnalyticsError::Transport(_) => {
            "The analytics service could not be reached. Please try again later.".to_string()
        }
        AnalyticsError::Decode(_) => {
            "The analytics service returned an unexpected response.".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let error: AnalyticsError = ConfigurationError::missing("client_id").into();
        assert_eq!(error.error_code(), "ANALYTICS_CONFIG");

        let error: AnalyticsError = KeyMaterialError::KeyNotFound {
            path: "/tmp/missing.p12".to_string(),
        }
        .into();
        assert_eq!(error.error_code(), "ANALYTICS_KEY_NOT_FOUND");

        let error: AnalyticsError = TransportError::NoOp.into();
        assert_eq!(error.error_code(), "ANALYTICS_NO_OP");
    }

    #[test]
    fn test_is_local() {
        assert!(AnalyticsError::from(ConfigurationError::missing("redirect_uri")).is_local());
        assert!(AnalyticsError::from(TransportError::NoOp).is_local());
        assert!(!AnalyticsError::from(TransportError::Timeout).is_local());
        assert!(!AnalyticsError::from(DecodeError::InvalidJson {
            status: 502,
            message: "expected value".to_string(),
        })
        .is_local());
    }

    #[test]
    fn test_map_token_error() {
        let body = r#"{"error":"invalid_grant","error_description":"Token has been expired or revoked."}"#;
        let response: OAuth2ErrorResponse = serde_json::from_str(body).unwrap();
        assert_eq!(
            map_token_error(&response),
            ProviderError::InvalidGrant {
                message: "Token has been expired or revoked.".to_string()
            }
        );

        let response: OAuth2ErrorResponse = serde_json::from_str(r#"{"error":"weird"}"#).unwrap();
        assert_eq!(
            map_token_error(&response),
            ProviderError::InvalidRequest {
                message: "weird".to_string()
            }
        );
    }

    #[test]
    fn test_map_status_error() {
        assert!(matches!(map_status_error(401), ProviderError::InvalidClient { .. }));
        assert!(matches!(
            map_status_error(429),
            ProviderError::TemporarilyUnavailable { retry_after: Some(_) }
        ));
        assert!(matches!(map_status_error(503), ProviderError::ServerError { .. }));
    }

    #[test]
    fn test_user_message_names_missing_field() {
        let error = AnalyticsError::from(ConfigurationError::missing("client secret"));
        assert!(get_user_message(&error).contains("client secret"));
    }
}
