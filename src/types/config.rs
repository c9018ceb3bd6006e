//! Endpoint Configuration
//!
//! Provider URLs and protocol constants.

use serde::{Deserialize, Serialize};

use crate::core::{QueryParams, ResponseFormat};

/// Browser consent endpoint.
pub const AUTHORIZATION_URL: &str = "https://accounts.google.com/o/oauth2/auth";

/// Token endpoint, also the `aud` of service-account assertions.
pub const TOKEN_URL: &str = "https://accounts.google.com/o/oauth2/token";

/// Token revocation endpoint.
pub const REVOCATION_URL: &str = "https://accounts.google.com/o/oauth2/revoke";

/// Core reporting endpoint.
pub const REPORTING_URL: &str = "https://www.googleapis.com/analytics/v3/data/ga";

/// Management endpoint listing every web property of the user.
pub const WEB_PROPERTIES_URL: &str =
    "https://www.googleapis.com/analytics/v3/management/accounts/~all/webproperties";

/// Management endpoint listing every profile of the user.
pub const PROFILES_URL: &str =
    "https://www.googleapis.com/analytics/v3/management/accounts/~all/webproperties/~all/profiles";

/// Read-only analytics scope requested by both credential kinds.
pub const ANALYTICS_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/analytics.readonly";

/// Grant type for signed JWT assertions.
pub const JWT_BEARER_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Upper bound the provider accepts for `exp - iat` of an assertion.
pub const MAX_ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Passphrase of PKCS#12 key stores exported by the Google console.
///
/// This is a publicly known placeholder, not a secret: anyone holding the key
/// file can open it. Protect the file itself.
pub const DEFAULT_KEY_STORE_PASSPHRASE: &str = "notasecret";

/// Grant types used against the token endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GrantType {
    #[serde(rename = "authorization_code")]
    AuthorizationCode,
    #[serde(rename = "refresh_token")]
    RefreshToken,
    #[serde(rename = "urn:ietf:params:oauth:grant-type:jwt-bearer")]
    JwtBearer,
}

impl GrantType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthorizationCode => "authorization_code",
            Self::RefreshToken => "refresh_token",
            Self::JwtBearer => JWT_BEARER_GRANT_TYPE,
        }
    }
}

/// Provider endpoints.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
    pub authorization: String,
    pub token: String,
    pub revocation: String,
    pub reporting: String,
    pub web_properties: String,
    pub profiles: String,
}

impl Endpoints {
    /// Google's production endpoints.
    pub fn google() -> Self {
        Self {
            authorization: AUTHORIZATION_URL.to_string(),
            token: TOKEN_URL.to_string(),
            revocation: REVOCATION_URL.to_string(),
            reporting: REPORTING_URL.to_string(),
            web_properties: WEB_PROPERTIES_URL.to_string(),
            profiles: PROFILES_URL.to_string(),
        }
    }

    /// Every endpoint rooted at `base`, keeping Google's paths.
    ///
    /// Used to point the client at a local mock server.
    pub fn with_base_url(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            authorization: format!("{}/o/oauth2/auth", base),
            token: format!("{}/o/oauth2/token", base),
            revocation: format!("{}/o/oauth2/revoke", base),
            reporting: format!("{}/analytics/v3/data/ga", base),
            web_properties: format!(
                "{}/analytics/v3/management/accounts/~all/webproperties",
                base
            ),
            profiles: format!(
                "{}/analytics/v3/management/accounts/~all/webproperties/~all/profiles",
                base
            ),
        }
    }

    /// Name/URL pairs, for validation.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("authorization", self.authorization.as_str()),
            ("token", self.token.as_str()),
            ("revocation", self.revocation.as_str()),
            ("reporting", self.reporting.as_str()),
            ("web_properties", self.web_properties.as_str()),
            ("profiles", self.profiles.as_str()),
        ]
        .into_iter()
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::google()
    }
}

/// Reporting client configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct AnalyticsConfig {
    pub endpoints: Endpoints,
    /// Report identifier (`ga:<profile id>`) used as `ids`.
    pub account_id: Option<String>,
    /// Layered over the library defaults of every query.
    pub default_query_params: QueryParams,
    pub response_format: ResponseFormat,
    /// Scope requested by the credential.
    pub scope: String,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            endpoints: Endpoints::google(),
            account_id: None,
            default_query_params: QueryParams::new(),
            response_format: ResponseFormat::Structured,
            scope: ANALYTICS_READONLY_SCOPE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grant_type_as_str() {
        assert_eq!(GrantType::AuthorizationCode.as_str(), "authorization_code");
        assert_eq!(GrantType::RefreshToken.as_str(), "refresh_token");
        assert_eq!(
            GrantType::JwtBearer.as_str(),
            "urn:ietf:params:oauth:grant-type:jwt-bearer"
        );
    }

    #[test]
    fn test_with_base_url() {
        let endpoints = Endpoints::with_base_url("http://127.0.0.1:8080/");
        assert_eq!(endpoints.token, "http://127.0.0.1:8080/o/oauth2/token");
        assert_eq!(endpoints.reporting, "http://127.0.0.1:8080/analytics/v3/data/ga");
        assert_eq!(Endpoints::default(), Endpoints::google());
    }
}
