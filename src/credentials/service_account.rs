//! JWT-Bearer Grant
//!
//! Server-to-server credential. Each token request signs a fresh assertion
//! with the service account's PKCS#12 key; the provider issues no refresh
//! token for this grant.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use crate::core::clock::{Clock, SystemClock};
use crate::core::{ApiResponse, QueryParams, ResponseFormat, Transport};
use crate::core::transport::{HttpTransport, ReqwestHttpTransport};
use crate::credentials::assertion::{sign_assertion, AssertionClaims};
use crate::credentials::key_store::{ensure_key_store_file, ServiceAccountKey};
use crate::credentials::{request_token, require, Credential, CredentialIdentity};
use crate::error::{AnalyticsResult, ConfigurationError};
use crate::types::{
    Endpoints, GrantType, TokenResponse, ANALYTICS_READONLY_SCOPE, DEFAULT_KEY_STORE_PASSPHRASE,
};

/// Service account credential.
pub struct ServiceAccountCredential<T: HttpTransport = ReqwestHttpTransport> {
    identity: CredentialIdentity,
    service_email: String,
    key_store_location: Option<PathBuf>,
    key_store_passphrase: SecretString,
    scope: String,
    endpoints: Endpoints,
    clock: Arc<dyn Clock>,
    transport: Transport<T>,
}

impl ServiceAccountCredential<ReqwestHttpTransport> {
    /// Create a fully configured credential using reqwest and the default
    /// key store passphrase.
    pub fn new(
        client_id: impl Into<String>,
        service_email: impl Into<String>,
        key_store_location: impl Into<PathBuf>,
    ) -> AnalyticsResult<Self> {
        let mut credential = Self::with_transport(Transport::reqwest()?);
        credential.set_client_id(client_id.into());
        credential.set_service_email(service_email);
        credential.set_key_store_location(key_store_location);
        Ok(credential)
    }
}

impl<T: HttpTransport> ServiceAccountCredential<T> {
    /// Create an unconfigured credential over `transport`.
    pub fn with_transport(transport: Transport<T>) -> Self {
        Self {
            identity: CredentialIdentity::default(),
            service_email: String::new(),
            key_store_location: None,
            key_store_passphrase: SecretString::new(DEFAULT_KEY_STORE_PASSPHRASE.to_string()),
            scope: ANALYTICS_READONLY_SCOPE.to_string(),
            endpoints: Endpoints::google(),
            clock: Arc::new(SystemClock),
            transport,
        }
    }

    /// Replace the provider endpoints. The token endpoint is also the
    /// assertion audience.
    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Replace the clock used for `iat`/`exp`.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn set_service_email(&mut self, service_email: impl Into<String>) {
        self.service_email = service_email.into();
    }

    pub fn set_key_store_location(&mut self, location: impl Into<PathBuf>) {
        self.key_store_location = Some(location.into());
    }

    pub fn set_key_store_passphrase(&mut self, passphrase: impl Into<String>) {
        self.key_store_passphrase = SecretString::new(passphrase.into());
    }

    pub fn set_scope(&mut self, scope: impl Into<String>) {
        self.scope = scope.into();
    }

    pub fn service_email(&self) -> &str {
        &self.service_email
    }

    pub fn key_store_location(&self) -> Option<&Path> {
        self.key_store_location.as_deref()
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Whether the publicly known default passphrase is configured.
    pub fn uses_default_passphrase(&self) -> bool {
        self.key_store_passphrase.expose_secret() == DEFAULT_KEY_STORE_PASSPHRASE
    }

    fn require_key_store_location(&self) -> Result<&Path, ConfigurationError> {
        match self.key_store_location.as_deref() {
            Some(path) if !path.as_os_str().is_empty() => Ok(path),
            _ => Err(ConfigurationError::missing("key_store_location")),
        }
    }

    /// Build and sign a fresh JWT assertion.
    ///
    /// The key store must exist before anything is signed. `iat` is taken
    /// from the clock on every call, so consecutive assertions are never
    /// identical.
    pub async fn generate_assertion(&self) -> AnalyticsResult<String> {
        let service_email = require(&self.service_email, "service_email")?;
        let location = self.require_key_store_location()?;

        ensure_key_store_file(location).await?;

        let claims = AssertionClaims::new(
            service_email,
            self.scope.as_str(),
            self.endpoints.token.as_str(),
            self.clock.now().timestamp(),
        );

        if self.uses_default_passphrase() {
            warn!(
                path = %location.display(),
                "Opening key store with the default passphrase; protect the key file itself"
            );
        }
        let key = ServiceAccountKey::load(location, self.key_store_passphrase.expose_secret()).await?;

        Ok(sign_assertion(&claims, &key)?)
    }
}

#[async_trait]
impl<T: HttpTransport> Credential for ServiceAccountCredential<T> {
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

    /// `input` is ignored.
    async fn acquire_token(&self, _input: Option<&str>) -> AnalyticsResult<ApiResponse<TokenResponse>> {
        let client_id = require(&self.identity.client_id, "client_id")?;
        let assertion = self.generate_assertion().await?;

        let params = QueryParams::new()
            .with("grant_type", GrantType::JwtBearer.as_str())
            .with("assertion", assertion);

        info!(
            grant_type = GrantType::JwtBearer.as_str(),
            client_id = %client_id,
            service_email = %self.service_email,
            "Requesting service account token"
        );
        request_token(&self.transport, &self.endpoints.token, &params, self.identity.format).await
    }
}

impl<T: HttpTransport> std::fmt::Debug for ServiceAccountCredential<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountCredential")
            .field("client_id", &self.identity.client_id)
            .field("service_email", &self.service_email)
            .field("key_store_location", &self.key_store_location)
            .field("key_store_passphrase", &"[REDACTED]")
            .field("scope", &self.scope)
            .field("format", &self.identity.format)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::{ManualClock, MockClock};
    use crate::core::transport::{HttpMethod, MockHttpTransport};
    use crate::credentials::assertion::inspect_assertion;
    use crate::error::{AnalyticsError, KeyMaterialError};
    use chrono::{DateTime, Duration, Utc};
    use jsonwebtoken::Algorithm;
    use std::collections::HashMap;

    const EMAIL: &str = "reporting-test@example.iam.gserviceaccount.com";

    fn fixture(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests/fixtures")
            .join(name)
    }

    fn credential(
        http: &Arc<MockHttpTransport>,
        key_store: &str,
    ) -> ServiceAccountCredential<MockHttpTransport> {
        let mut credential = ServiceAccountCredential::with_transport(Transport::new(http.clone()));
        credential.set_client_id("cid.apps.googleusercontent.com".to_string());
        credential.set_service_email(EMAIL);
        credential.set_key_store_location(fixture(key_store));
        credential
    }

    #[tokio::test]
    async fn test_acquire_token() {
        let http = Arc::new(MockHttpTransport::new());
        http.queue_body(200, r#"{"access_token":"ya29.svc","token_type":"Bearer","expires_in":3600}"#);
        let credential = credential(&http, "service-account.p12")
            .with_clock(Arc::new(ManualClock::at_timestamp(1_700_000_000)));

        let token = credential
            .acquire_token(None)
            .await
            .unwrap()
            .into_structured()
            .unwrap();
        assert!(token.is_success());
        assert!(token.refresh_token.is_none());

        let request = http.get_last_request().unwrap();
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.url, "https://accounts.google.com/o/oauth2/token");

        let body: HashMap<String, String> =
            url::form_urlencoded::parse(request.body.as_deref().unwrap().as_bytes())
                .into_owned()
                .collect();
        assert_eq!(
            body.get("grant_type").map(String::as_str),
            Some("urn:ietf:params:oauth:grant-type:jwt-bearer")
        );

        let (header, claims) = inspect_assertion(&body["assertion"]).unwrap();
        assert_eq!(header.alg, Algorithm::RS256);
        assert_eq!(claims.iss, EMAIL);
        assert_eq!(claims.scope, ANALYTICS_READONLY_SCOPE);
        assert_eq!(claims.aud, "https://accounts.google.com/o/oauth2/token");
        assert_eq!(claims.iat, 1_700_000_000);
        assert_eq!(claims.exp, 1_700_003_600);
    }

    #[tokio::test]
    async fn test_missing_key_store_fails_before_signing() {
        let http = Arc::new(MockHttpTransport::new());
        let mut clock = MockClock::new();
        clock.expect_now().never();
        let credential = credential(&http, "does-not-exist.p12").with_clock(Arc::new(clock));

        let result = credential.acquire_token(None).await;
        assert!(matches!(
            result,
            Err(AnalyticsError::KeyMaterial(KeyMaterialError::KeyNotFound { .. }))
        ));
        assert_eq!(http.request_count(), 0);
    }

    #[tokio::test]
    async fn test_invalid_key_stores() {
        for (file, passphrase) in [
            ("corrupt.p12", DEFAULT_KEY_STORE_PASSPHRASE),
            ("certificate-only.p12", DEFAULT_KEY_STORE_PASSPHRASE),
            ("service-account.p12", "not-the-passphrase"),
        ] {
            let http = Arc::new(MockHttpTransport::new());
            let mut credential = credential(&http, file);
            credential.set_key_store_passphrase(passphrase);

            let result = credential.acquire_token(None).await;
            assert!(
                matches!(
                    result,
                    Err(AnalyticsError::KeyMaterial(KeyMaterialError::InvalidKeyStore { .. }))
                ),
                "{} should be rejected",
                file
            );
            assert_eq!(http.request_count(), 0);
        }
    }

    #[tokio::test]
    async fn test_requires_configuration() {
        let http = Arc::new(MockHttpTransport::new());

        let mut missing_client = credential(&http, "service-account.p12");
        missing_client.set_client_id(String::new());
        assert!(matches!(
            missing_client.acquire_token(None).await,
            Err(AnalyticsError::Configuration(ConfigurationError::MissingRequired { ref field })) if field == "client_id"
        ));

        let mut missing_email = credential(&http, "service-account.p12");
        missing_email.set_service_email("");
        assert!(matches!(
            missing_email.acquire_token(None).await,
            Err(AnalyticsError::Configuration(ConfigurationError::MissingRequired { ref field })) if field == "service_email"
        ));

        let mut missing_location = ServiceAccountCredential::with_transport(Transport::new(http.clone()));
        missing_location.set_client_id("cid".to_string());
        missing_location.set_service_email(EMAIL);
        assert!(matches!(
            missing_location.acquire_token(None).await,
            Err(AnalyticsError::Configuration(ConfigurationError::MissingRequired { ref field })) if field == "key_store_location"
        ));

        assert_eq!(http.request_count(), 0);
    }

    #[tokio::test]
    async fn test_assertions_are_never_reused() {
        let http = Arc::new(MockHttpTransport::new());
        let clock = Arc::new(ManualClock::at_timestamp(1_700_000_000));
        let credential = credential(&http, "service-account.p12").with_clock(clock.clone());

        let first = credential.generate_assertion().await.unwrap();
        clock.advance(Duration::seconds(1));
        let second = credential.generate_assertion().await.unwrap();

        assert_ne!(first, second);
        let (first_header, first_claims) = inspect_assertion(&first).unwrap();
        let (second_header, second_claims) = inspect_assertion(&second).unwrap();

        assert_eq!(first_header, second_header);
        assert_eq!(first_claims.iss, second_claims.iss);
        assert_eq!(first_claims.scope, second_claims.scope);
        assert_eq!(first_claims.aud, second_claims.aud);
        assert_eq!(second_claims.iat, first_claims.iat + 1);
        assert_eq!(second_claims.exp, first_claims.exp + 1);
    }

    #[tokio::test]
    async fn test_assertion_audience_follows_endpoints() {
        let http = Arc::new(MockHttpTransport::new());
        let mut clock = MockClock::new();
        let fixed = DateTime::<Utc>::from_timestamp(1_600_000_000, 0).unwrap();
        clock.expect_now().times(1).return_const(fixed);

        let credential = credential(&http, "service-account.p12")
            .with_endpoints(Endpoints::with_base_url("http://127.0.0.1:9"))
            .with_clock(Arc::new(clock));

        let assertion = credential.generate_assertion().await.unwrap();
        let (_, claims) = inspect_assertion(&assertion).unwrap();
        assert_eq!(claims.aud, "http://127.0.0.1:9/o/oauth2/token");
        assert_eq!(claims.iat, 1_600_000_000);
    }

    #[test]
    fn test_debug_redacts_passphrase() {
        let http = Arc::new(MockHttpTransport::new());
        let credential = credential(&http, "service-account.p12");
        assert!(credential.uses_default_passphrase());
        assert!(!format!("{:?}", credential).contains(DEFAULT_KEY_STORE_PASSPHRASE));
    }
}
