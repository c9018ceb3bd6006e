//! Reporting Client
//!
//! Thin facade over the reporting and management endpoints. Owns one
//! credential, an access token, an account id and layered default query
//! parameters.

pub mod presets;

pub use presets::{ReportPreset, MOBILE_TRAFFIC_SEGMENT};

use chrono::{Months, NaiveDate};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, info};

use crate::core::clock::{Clock, SystemClock};
use crate::core::{decode, ApiResponse, QueryParams, ResponseFormat, Transport};
use crate::core::transport::{HttpTransport, ReqwestHttpTransport};
use crate::credentials::{Credential, CredentialKind, ServiceAccountCredential, WebFlowCredential};
use crate::error::{AnalyticsResult, ConfigurationError};
use crate::types::{AnalyticsConfig, Endpoints, ManagementList, ReportResponse, TokenResponse};

/// Metric queried when nothing else is asked for.
pub const DEFAULT_METRICS: &str = "ga:visits";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Library defaults: the last month of visits, ending today.
pub fn library_default_params(today: NaiveDate) -> QueryParams {
    let start = today.checked_sub_months(Months::new(1)).unwrap_or(today);
    QueryParams::new()
        .with("start-date", start.format(DATE_FORMAT).to_string())
        .with("end-date", today.format(DATE_FORMAT).to_string())
        .with("metrics", DEFAULT_METRICS)
}

/// Google Analytics reporting client.
pub struct AnalyticsClient<T: HttpTransport = ReqwestHttpTransport> {
    credential: CredentialKind<T>,
    transport: Transport<T>,
    endpoints: Endpoints,
    access_token: Option<SecretString>,
    account_id: Option<String>,
    default_query_params: QueryParams,
    format: ResponseFormat,
    clock: Arc<dyn Clock>,
}

impl AnalyticsClient<ReqwestHttpTransport> {
    /// Client authenticating through the browser consent flow.
    pub fn web_flow(config: AnalyticsConfig) -> AnalyticsResult<Self> {
        Ok(Self::with_web_flow(config, Transport::reqwest()?))
    }

    /// Client authenticating as a service account.
    pub fn service_account(config: AnalyticsConfig) -> AnalyticsResult<Self> {
        Ok(Self::with_service_account(config, Transport::reqwest()?))
    }
}

impl<T: HttpTransport> AnalyticsClient<T> {
    /// Web-flow client over `transport`. Configure the credential through
    /// [`AnalyticsClient::credential_mut`].
    pub fn with_web_flow(config: AnalyticsConfig, transport: Transport<T>) -> Self {
        let mut credential =
            WebFlowCredential::with_transport(transport.clone()).with_endpoints(config.endpoints.clone());
        credential.set_scope(config.scope.clone());
        Self::new(CredentialKind::WebFlow(credential), config, transport)
    }

    /// Service-account client over `transport`.
    pub fn with_service_account(config: AnalyticsConfig, transport: Transport<T>) -> Self {
        let mut credential = ServiceAccountCredential::with_transport(transport.clone())
            .with_endpoints(config.endpoints.clone());
        credential.set_scope(config.scope.clone());
        Self::new(CredentialKind::ServiceAccount(credential), config, transport)
    }

    /// Assemble a client from an already configured credential.
    pub fn new(mut credential: CredentialKind<T>, config: AnalyticsConfig, transport: Transport<T>) -> Self {
        credential.toggle_structured_decoding(config.response_format.is_structured());
        Self {
            credential,
            transport,
            endpoints: config.endpoints,
            access_token: None,
            account_id: config.account_id,
            default_query_params: config.default_query_params,
            format: config.response_format,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the clock used for default report dates.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn credential(&self) -> &CredentialKind<T> {
        &self.credential
    }

    pub fn credential_mut(&mut self) -> &mut CredentialKind<T> {
        &mut self.credential
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn set_access_token(&mut self, token: impl Into<String>) {
        self.access_token = Some(SecretString::new(token.into()));
    }

    pub fn clear_access_token(&mut self) {
        self.access_token = None;
    }

    pub fn has_access_token(&self) -> bool {
        self.access_token.is_some()
    }

    pub fn set_account_id(&mut self, account_id: impl Into<String>) {
        self.account_id = Some(account_id.into());
    }

    pub fn account_id(&self) -> Option<&str> {
        self.account_id.as_deref()
    }

    /// Merge `params` into the configured defaults.
    pub fn set_default_query_params(&mut self, params: &QueryParams) {
        self.default_query_params.merge(params);
    }

    /// Library defaults with the configured defaults on top.
    pub fn default_query_params(&self) -> QueryParams {
        let today = self.clock.now().date_naive();
        QueryParams::merged([&library_default_params(today), &self.default_query_params])
    }

    pub fn response_format(&self) -> ResponseFormat {
        self.format
    }

    /// Switch between structured and raw decoding, for this client and its
    /// credential.
    pub fn set_response_format(&mut self, format: ResponseFormat) {
        self.format = format;
        self.credential.toggle_structured_decoding(format.is_structured());
    }

    /// Obtain a token through the credential and keep it for later queries.
    ///
    /// `code` is the authorization code for web-flow clients. The token is
    /// stored only when the provider answered 200 with an access token.
    pub async fn authorize(&mut self, code: Option<&str>) -> AnalyticsResult<ApiResponse<TokenResponse>> {
        let response = self.credential.acquire_token(code).await?;

        let token = match &response {
            ApiResponse::Structured(token) if token.is_success() => token.access_token.clone(),
            ApiResponse::Raw(_) if response.is_ok_status() => {
                response.raw_str("access_token").map(str::to_string)
            }
            _ => None,
        };

        match token {
            Some(token) => {
                info!("Access token stored");
                self.set_access_token(token);
            }
            None => debug!(status = ?response.http_code(), "No access token in response"),
        }

        Ok(response)
    }

    fn require_access_token(&self) -> Result<&str, ConfigurationError> {
        self.access_token
            .as_ref()
            .map(|token| token.expose_secret().as_str())
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| ConfigurationError::missing("access_token"))
    }

    fn require_account_id(&self) -> Result<&str, ConfigurationError> {
        self.account_id
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| ConfigurationError::missing("account_id"))
    }

    /// Query the reporting endpoint.
    ///
    /// Parameters are layered as library defaults, configured defaults,
    /// `access_token` and `ids`, then `overrides`.
    pub async fn query(&self, overrides: &QueryParams) -> AnalyticsResult<ApiResponse<ReportResponse>> {
        let access_token = self.require_access_token()?;
        let account_id = self.require_account_id()?;

        let credentials = QueryParams::new()
            .with("access_token", access_token)
            .with("ids", account_id);
        let params = QueryParams::merged([&self.default_query_params(), &credentials, overrides]);

        debug!(ids = %account_id, "Querying report");
        self.get(&self.endpoints.reporting, &params).await
    }

    /// Run a predefined report, with `overrides` applied last.
    pub async fn run_preset(
        &self,
        preset: ReportPreset,
        overrides: &QueryParams,
    ) -> AnalyticsResult<ApiResponse<ReportResponse>> {
        debug!(preset = preset.name(), "Running report preset");
        self.query(&preset.with_overrides(overrides)).await
    }

    /// Every web property visible to the token.
    pub async fn get_web_properties(&self) -> AnalyticsResult<ApiResponse<ManagementList>> {
        let params = QueryParams::new().with("access_token", self.require_access_token()?);
        self.get(&self.endpoints.web_properties, &params).await
    }

    /// Every profile visible to the token.
    pub async fn get_profiles(&self) -> AnalyticsResult<ApiResponse<ManagementList>> {
        let params = QueryParams::new().with("access_token", self.require_access_token()?);
        self.get(&self.endpoints.profiles, &params).await
    }

    async fn get<R: DeserializeOwned>(
        &self,
        url: &str,
        params: &QueryParams,
    ) -> AnalyticsResult<ApiResponse<R>> {
        let raw = self.transport.send(url, params, false).await?;
        Ok(decode(&raw, self.format)?)
    }
}

impl<T: HttpTransport> std::fmt::Debug for AnalyticsClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalyticsClient")
            .field("credential", &self.credential)
            .field("access_token", &self.access_token.as_ref().map(|_| "[REDACTED]"))
            .field("account_id", &self.account_id)
            .field("default_query_params", &self.default_query_params)
            .field("format", &self.format)
            .finish()
    }
}
