//! Configuration Builder
//!
//! Fluent builder for reporting client configuration.

use url::Url;

use crate::core::{ParamValue, QueryParams, ResponseFormat};
use crate::error::ConfigurationError;
use crate::types::{AnalyticsConfig, Endpoints};

/// Account id variable read by [`AnalyticsConfigBuilder::apply_env`].
pub const ENV_ACCOUNT_ID: &str = "GOOGLE_ANALYTICS_ACCOUNT_ID";
/// Set to `true`/`1` to decode responses as raw JSON maps.
pub const ENV_RAW_RESPONSES: &str = "GOOGLE_ANALYTICS_RAW_RESPONSES";
pub const ENV_AUTHORIZATION_ENDPOINT: &str = "GOOGLE_OAUTH_AUTHORIZATION_ENDPOINT";
pub const ENV_TOKEN_ENDPOINT: &str = "GOOGLE_OAUTH_TOKEN_ENDPOINT";
pub const ENV_REVOCATION_ENDPOINT: &str = "GOOGLE_OAUTH_REVOCATION_ENDPOINT";
pub const ENV_REPORTING_ENDPOINT: &str = "GOOGLE_ANALYTICS_REPORTING_ENDPOINT";
pub const ENV_WEB_PROPERTIES_ENDPOINT: &str = "GOOGLE_ANALYTICS_WEB_PROPERTIES_ENDPOINT";
pub const ENV_PROFILES_ENDPOINT: &str = "GOOGLE_ANALYTICS_PROFILES_ENDPOINT";

/// Reporting configuration builder.
#[derive(Default)]
pub struct AnalyticsConfigBuilder {
    endpoints: Option<Endpoints>,
    authorization_endpoint: Option<String>,
    token_endpoint: Option<String>,
    revocation_endpoint: Option<String>,
    reporting_endpoint: Option<String>,
    web_properties_endpoint: Option<String>,
    profiles_endpoint: Option<String>,
    account_id: Option<String>,
    default_query_params: QueryParams,
    response_format: ResponseFormat,
    scope: Option<String>,
}

impl AnalyticsConfigBuilder {
    /// Create new configuration builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a complete endpoint set. Individual endpoint setters
    /// still override it.
    pub fn endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = Some(endpoints);
        self
    }

    /// Root every endpoint at `base` (mock servers, proxies).
    pub fn base_url(self, base: &str) -> Self {
        self.endpoints(Endpoints::with_base_url(base))
    }

    pub fn authorization_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.authorization_endpoint = Some(endpoint.into());
        self
    }

    pub fn token_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.token_endpoint = Some(endpoint.into());
        self
    }

    pub fn revocation_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.revocation_endpoint = Some(endpoint.into());
        self
    }

    pub fn reporting_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.reporting_endpoint = Some(endpoint.into());
        self
    }

    pub fn web_properties_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.web_properties_endpoint = Some(endpoint.into());
        self
    }

    pub fn profiles_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.profiles_endpoint = Some(endpoint.into());
        self
    }

    /// Set the report identifier, e.g. `ga:12345`.
    pub fn account_id(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = Some(account_id.into());
        self
    }

    /// Add one default query parameter.
    pub fn default_query_param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.default_query_params.insert(key, value);
        self
    }

    /// Merge a set of default query parameters.
    pub fn default_query_params(mut self, params: &QueryParams) -> Self {
        self.default_query_params.merge(params);
        self
    }

    pub fn response_format(mut self, format: ResponseFormat) -> Self {
        self.response_format = format;
        self
    }

    /// Override the requested scope.
    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    /// Apply `GOOGLE_ANALYTICS_*` / `GOOGLE_OAUTH_*` variables.
    pub fn apply_env(self) -> Self {
        self.apply_lookup(|name| std::env::var(name).ok())
    }

    /// Apply variables from an arbitrary source.
    pub fn apply_lookup(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(account_id) = read(ENV_ACCOUNT_ID) {
            self.account_id = Some(account_id);
        }
        if let Some(raw) = read(ENV_RAW_RESPONSES) {
            let raw = matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes");
            self.response_format = ResponseFormat::from_structured(!raw);
        }

        let overrides = [
            (ENV_AUTHORIZATION_ENDPOINT, &mut self.authorization_endpoint),
            (ENV_TOKEN_ENDPOINT, &mut self.token_endpoint),
            (ENV_REVOCATION_ENDPOINT, &mut self.revocation_endpoint),
            (ENV_REPORTING_ENDPOINT, &mut self.reporting_endpoint),
            (ENV_WEB_PROPERTIES_ENDPOINT, &mut self.web_properties_endpoint),
            (ENV_PROFILES_ENDPOINT, &mut self.profiles_endpoint),
        ];
        for (name, slot) in overrides {
            if let Some(endpoint) = read(name) {
                *slot = Some(endpoint);
            }
        }

        self
    }

    /// Build the configuration, validating every endpoint URL.
    pub fn build(self) -> Result<AnalyticsConfig, ConfigurationError> {
        let mut endpoints = self.endpoints.unwrap_or_default();
        let overrides = [
            (&mut endpoints.authorization, self.authorization_endpoint),
            (&mut endpoints.token, self.token_endpoint),
            (&mut endpoints.revocation, self.revocation_endpoint),
            (&mut endpoints.reporting, self.reporting_endpoint),
            (&mut endpoints.web_properties, self.web_properties_endpoint),
            (&mut endpoints.profiles, self.profiles_endpoint),
        ];
        for (slot, value) in overrides {
            if let Some(value) = value {
                *slot = value;
            }
        }

        for (_, endpoint) in endpoints.iter() {
            validate_endpoint(endpoint)?;
        }

        let account_id = self.account_id.filter(|id| !id.trim().is_empty());
        let scope = match self.scope {
            Some(scope) if scope.trim().is_empty() => {
                return Err(ConfigurationError::missing("scope"));
            }
            Some(scope) => scope,
            None => AnalyticsConfig::default().scope,
        };

        Ok(AnalyticsConfig {
            endpoints,
            account_id,
            default_query_params: self.default_query_params,
            response_format: self.response_format,
            scope,
        })
    }
}

fn validate_endpoint(endpoint: &str) -> Result<(), ConfigurationError> {
    let invalid = || ConfigurationError::InvalidEndpoint {
        url: endpoint.to_string(),
    };
    let url = Url::parse(endpoint).map_err(|_| invalid())?;
    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Ok(()),
        _ => Err(invalid()),
    }
}

impl AnalyticsConfig {
    /// Create a new configuration builder.
    pub fn builder() -> AnalyticsConfigBuilder {
        AnalyticsConfigBuilder::new()
    }

    /// Configuration from environment variables over the defaults.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        AnalyticsConfigBuilder::new().apply_env().build()
    }
}

/// Create a new reporting configuration builder.
pub fn analytics_config() -> AnalyticsConfigBuilder {
    AnalyticsConfigBuilder::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ANALYTICS_READONLY_SCOPE, REPORTING_URL, TOKEN_URL};
    use std::collections::HashMap;

    #[test]
    fn test_builder_defaults() {
        let config = analytics_config().build().unwrap();

        assert_eq!(config.endpoints, Endpoints::google());
        assert!(config.account_id.is_none());
        assert!(config.default_query_params.is_empty());
        assert_eq!(config.response_format, ResponseFormat::Structured);
        assert_eq!(config.scope, ANALYTICS_READONLY_SCOPE);
    }

    #[test]
    fn test_builder_success() {
        let config = analytics_config()
            .account_id("ga:12345")
            .token_endpoint("http://127.0.0.1:8080/token")
            .default_query_param("max-results", 50)
            .default_query_param("metrics", "ga:pageviews")
            .response_format(ResponseFormat::Raw)
            .build()
            .unwrap();

        assert_eq!(config.account_id.as_deref(), Some("ga:12345"));
        assert_eq!(config.endpoints.token, "http://127.0.0.1:8080/token");
        assert_eq!(config.endpoints.reporting, REPORTING_URL);
        assert_eq!(config.default_query_params.len(), 2);
        assert_eq!(config.response_format, ResponseFormat::Raw);
    }

    #[test]
    fn test_builder_base_url_then_override() {
        let config = analytics_config()
            .base_url("http://localhost:9000")
            .profiles_endpoint("http://localhost:9001/profiles")
            .build()
            .unwrap();

        assert_eq!(config.endpoints.token, "http://localhost:9000/o/oauth2/token");
        assert_eq!(config.endpoints.profiles, "http://localhost:9001/profiles");
    }

    #[test]
    fn test_builder_rejects_invalid_endpoint() {
        for endpoint in ["not a url", "ftp://example.com/token", ""] {
            let result = analytics_config().token_endpoint(endpoint).build();
            assert!(
                matches!(result, Err(ConfigurationError::InvalidEndpoint { .. })),
                "{:?} should be rejected",
                endpoint
            );
        }
    }

    #[test]
    fn test_builder_rejects_empty_scope() {
        let result = analytics_config().scope(" ").build();
        assert!(matches!(result, Err(ConfigurationError::MissingRequired { .. })));
    }

    #[test]
    fn test_apply_lookup() {
        let vars: HashMap<&str, &str> = [
            (ENV_ACCOUNT_ID, "ga:777"),
            (ENV_RAW_RESPONSES, "true"),
            (ENV_REPORTING_ENDPOINT, "http://127.0.0.1:1234/data"),
            (ENV_TOKEN_ENDPOINT, "  "),
        ]
        .into_iter()
        .collect();

        let config = analytics_config()
            .apply_lookup(|name| vars.get(name).map(|v| v.to_string()))
            .build()
            .unwrap();

        assert_eq!(config.account_id.as_deref(), Some("ga:777"));
        assert_eq!(config.response_format, ResponseFormat::Raw);
        assert_eq!(config.endpoints.reporting, "http://127.0.0.1:1234/data");
        // blank values are ignored
        assert_eq!(config.endpoints.token, TOKEN_URL);
    }

    #[test]
    fn test_apply_lookup_structured_by_default() {
        let config = analytics_config()
            .apply_lookup(|name| (name == ENV_RAW_RESPONSES).then(|| "0".to_string()))
            .build()
            .unwrap();
        assert_eq!(config.response_format, ResponseFormat::Structured);
    }
}
