//! Authorization Code Grant
//!
//! Browser-based consent: build the consent URL, exchange the returned code,
//! refresh and revoke.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info};

use crate::core::{decode, inject_status_code, ApiResponse, QueryParams, ResponseFormat, Transport};
use crate::core::transport::{HttpTransport, ReqwestHttpTransport};
use crate::credentials::{request_token, require, Credential, CredentialIdentity};
use crate::error::{AnalyticsResult, ConfigurationError};
use crate::types::{Endpoints, GrantType, RevocationResult, TokenResponse, ANALYTICS_READONLY_SCOPE};

/// Web application credential.
///
/// Holds configuration only. Tokens returned by the provider belong to the
/// caller. Setters take `&mut self`, so configuration cannot change while a
/// request borrowed from the same instance is in flight.
pub struct WebFlowCredential<T: HttpTransport = ReqwestHttpTransport> {
    identity: CredentialIdentity,
    client_secret: Option<SecretString>,
    redirect_uri: String,
    scope: String,
    endpoints: Endpoints,
    transport: Transport<T>,
}

impl WebFlowCredential<ReqwestHttpTransport> {
    /// Create a fully configured credential using reqwest.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> AnalyticsResult<Self> {
        let mut credential = Self::with_transport(Transport::reqwest()?);
        credential.set_client_id(client_id.into());
        credential.set_client_secret(client_secret);
        credential.set_redirect_uri(redirect_uri);
        Ok(credential)
    }
}

impl<T: HttpTransport> WebFlowCredential<T> {
    /// Create an unconfigured credential over `transport`.
    pub fn with_transport(transport: Transport<T>) -> Self {
        Self {
            identity: CredentialIdentity::default(),
            client_secret: None,
            redirect_uri: String::new(),
            scope: ANALYTICS_READONLY_SCOPE.to_string(),
            endpoints: Endpoints::google(),
            transport,
        }
    }

    /// Replace the provider endpoints.
    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn set_client_secret(&mut self, client_secret: impl Into<String>) {
        self.client_secret = Some(SecretString::new(client_secret.into()));
    }

    pub fn set_redirect_uri(&mut self, redirect_uri: impl Into<String>) {
        self.redirect_uri = redirect_uri.into();
    }

    pub fn set_scope(&mut self, scope: impl Into<String>) {
        self.scope = scope.into();
    }

    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn has_client_secret(&self) -> bool {
        self.client_secret
            .as_ref()
            .map(|secret| !secret.expose_secret().trim().is_empty())
            .unwrap_or(false)
    }

    fn require_client_secret(&self) -> Result<&str, ConfigurationError> {
        let secret = self
            .client_secret
            .as_ref()
            .map(|secret| secret.expose_secret().as_str())
            .unwrap_or("");
        require(secret, "client_secret")
    }

    /// Consent URL the user's browser should be sent to.
    ///
    /// `extra_params` override the standard parameters on key collision.
    pub fn build_authorization_url(&self, extra_params: &QueryParams) -> AnalyticsResult<String> {
        let client_id = require(&self.identity.client_id, "client_id")?;
        let redirect_uri = require(&self.redirect_uri, "redirect_uri")?;

        let mut params = QueryParams::new()
            .with("response_type", "code")
            .with("client_id", client_id)
            .with("redirect_uri", redirect_uri)
            .with("scope", self.scope.as_str())
            .with("access_type", "offline")
            .with("approval_prompt", "force");
        params.merge(extra_params);

        Ok(format!(
            "{}?{}",
            self.endpoints.authorization,
            params.to_form_encoded()
        ))
    }

    /// Exchange an authorization code for tokens.
    pub async fn exchange_code(&self, code: &str) -> AnalyticsResult<ApiResponse<TokenResponse>> {
        let client_id = require(&self.identity.client_id, "client_id")?;
        let client_secret = self.require_client_secret()?;
        let redirect_uri = require(&self.redirect_uri, "redirect_uri")?;
        let code = require(code, "authorization_code")?;

        let params = QueryParams::new()
            .with("grant_type", GrantType::AuthorizationCode.as_str())
            .with("code", code)
            .with("client_id", client_id)
            .with("client_secret", client_secret)
            .with("redirect_uri", redirect_uri);

        info!(
            grant_type = GrantType::AuthorizationCode.as_str(),
            client_id = %client_id,
            "Exchanging authorization code"
        );
        request_token(&self.transport, &self.endpoints.token, &params, self.identity.format).await
    }

    /// Obtain a new access token from a refresh token.
    pub async fn refresh_access_token(
        &self,
        refresh_token: &str,
    ) -> AnalyticsResult<ApiResponse<TokenResponse>> {
        let client_id = require(&self.identity.client_id, "client_id")?;
        let client_secret = self.require_client_secret()?;

        let params = QueryParams::new()
            .with("grant_type", GrantType::RefreshToken.as_str())
            .with("refresh_token", refresh_token)
            .with("client_id", client_id)
            .with("client_secret", client_secret);

        info!(
            grant_type = GrantType::RefreshToken.as_str(),
            client_id = %client_id,
            "Refreshing access token"
        );
        request_token(&self.transport, &self.endpoints.token, &params, self.identity.format).await
    }

    /// Revoke an access or refresh token.
    ///
    /// The provider answers a successful revocation with an empty body, which
    /// is reported as `{"http_code":200}`. Tokens held by the caller are not
    /// touched.
    pub async fn revoke_access(&self, token: &str) -> AnalyticsResult<ApiResponse<RevocationResult>> {
        let params = QueryParams::new().with("token", token);

        info!("Revoking token");
        let mut raw = self
            .transport
            .send(&self.endpoints.revocation, &params, false)
            .await?;

        if raw.body.trim().is_empty() {
            raw.body = inject_status_code("{}", raw.status);
        }
        debug!(status = raw.status, "Revocation endpoint responded");

        Ok(decode(&raw, self.identity.format)?)
    }
}

#[async_trait]
impl<T: HttpTransport> Credential for WebFlowCredential<T> {
    fn client_id(&self) -> &str {
        &self.identity.client_id
    }

    fn set_client_id(&mut self, client_id: String) {
        self.identity.client_id = client_id;
    }

    fn response_format(&self) -> ResponseFormat {
        self.identity.format
    }

    fn toggle_structured_decoding(&mut self, structured: bool) {
        self.identity.format = ResponseFormat::from_structured(structured);
    }

    /// `input` is the authorization code returned to the redirect URI.
    async fn acquire_token(&self, input: Option<&str>) -> AnalyticsResult<ApiResponse<TokenResponse>> {
        self.exchange_code(input.unwrap_or("")).await
    }
}

impl<T: HttpTransport> std::fmt::Debug for WebFlowCredential<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebFlowCredential")
            .field("client_id", &self.identity.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "[REDACTED]"))
            .field("redirect_uri", &self.redirect_uri)
            .field("scope", &self.scope)
            .field("format", &self.identity.format)
            .finish()
    }
}
