//! Token Types
//!
//! Token endpoint and revocation endpoint payloads.

use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;

use crate::core::envelope::StatusCoded;
use crate::error::{map_status_error, map_token_error, OAuth2ErrorResponse, ProviderError};

/// Token endpoint response.
///
/// Only `http_code` is guaranteed. A missing `access_token` means the provider
/// refused the grant; check [`TokenResponse::is_success`] before using it.
#[derive(Clone, Deserialize, PartialEq)]
pub struct TokenResponse {
    /// Injected transport status.
    pub http_code: u16,
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    /// Lifetime in seconds.
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub id_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    /// OAuth error code (`invalid_grant`, ...).
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
    /// Additional fields.
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl TokenResponse {
    /// Status 200 with an access token present.
    pub fn is_success(&self) -> bool {
        self.http_code == 200 && self.access_token.is_some()
    }

    /// Classify a failed response. `None` when the grant succeeded.
    pub fn provider_error(&self) -> Option<ProviderError> {
        if self.is_success() {
            return None;
        }

        match &self.error {
            Some(code) => Some(map_token_error(&OAuth2ErrorResponse {
                error: code.clone(),
                error_description: self.error_description.clone(),
                error_uri: None,
            })),
            None if self.http_code == 200 => Some(ProviderError::InvalidRequest {
                message: "response missing access_token".to_string(),
            }),
            None => Some(map_status_error(self.http_code)),
        }
    }
}

impl StatusCoded for TokenResponse {
    fn http_code(&self) -> u16 {
        self.http_code
    }
}

impl std::fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |value: &Option<String>| value.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("TokenResponse")
            .field("http_code", &self.http_code)
            .field("access_token", &redact(&self.access_token))
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("refresh_token", &redact(&self.refresh_token))
            .field("id_token", &redact(&self.id_token))
            .field("scope", &self.scope)
            .field("error", &self.error)
            .field("error_description", &self.error_description)
            .finish()
    }
}

/// Revocation endpoint response.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct RevocationResult {
    pub http_code: u16,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_description: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

impl RevocationResult {
    pub fn is_revoked(&self) -> bool {
        self.http_code == 200
    }
}

impl StatusCoded for RevocationResult {
    fn http_code(&self) -> u16 {
        self.http_code
    }
}
