//! Google Analytics Integration Module
//!
//! OAuth2 credentials and a reporting client for the Google Analytics core
//! reporting and management APIs.
//!
//! # Features
//!
//! - Authorization Code grant with offline access (web applications)
//! - JWT-bearer grant signed with a PKCS#12 service account key
//! - Token refresh and revocation
//! - Report queries with layered default parameters and named presets
//! - Web property and profile listing
//!
//! Every call is a single request. Provider refusals are not errors: each
//! decoded response carries the HTTP status as `http_code`, and callers are
//! expected to check it before using the payload.
//!
//! # Example
//!
//! ```rust,ignore
//! use google_analytics_integration::{
//!     analytics_config, AnalyticsClient, Credential, QueryParams, ReportPreset,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = analytics_config().account_id("ga:12345").build()?;
//!     let mut client = AnalyticsClient::service_account(config)?;
//!
//!     if let Some(credential) = client.credential_mut().as_service_account_mut() {
//!         credential.set_client_id("1234.apps.googleusercontent.com".to_string());
//!         credential.set_service_email("1234@developer.gserviceaccount.com");
//!         credential.set_key_store_location("/etc/analytics/key.p12");
//!     }
//!
//!     let token = client.authorize(None).await?;
//!     if !token.is_ok_status() {
//!         return Err(format!("token request refused: {:?}", token.http_code()).into());
//!     }
//!
//!     let report = client
//!         .run_preset(ReportPreset::VisitsByCountries, &QueryParams::new().with("max-results", 10))
//!         .await?;
//!     println!("{:?}", report.as_structured().map(|r| &r.rows));
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - `types`: provider payloads, endpoints and constants
//! - `error`: error hierarchy and provider error mapping
//! - `core`: HTTP seam, status-tagging transport, parameters, decoding, clock
//! - `credentials`: web-flow and service-account credentials, key store, JWT assertions
//! - `analytics`: reporting client and report presets
//! - `builders`: fluent configuration builder

pub mod analytics;
pub mod builders;
pub mod core;
pub mod credentials;
pub mod error;
pub mod types;

// Re-export the reporting client
pub use analytics::{library_default_params, AnalyticsClient, ReportPreset, DEFAULT_METRICS};

// Re-export builders
pub use builders::{analytics_config, AnalyticsConfigBuilder};

// Re-export credentials
pub use credentials::{
    inspect_assertion, AssertionClaims, Credential, CredentialKind,
    ServiceAccountCredential, ServiceAccountKey, WebFlowCredential,
};

// Re-export errors
pub use error::{
    get_user_message, map_status_error, map_token_error, AnalyticsError, AnalyticsResult,
    ConfigurationError, DecodeError, KeyMaterialError, OAuth2ErrorResponse, ProviderError,
    TransportError,
};

// Re-export types
pub use types::{
    // Config
    AnalyticsConfig, Endpoints, GrantType, ANALYTICS_READONLY_SCOPE,
    DEFAULT_KEY_STORE_PASSPHRASE, JWT_BEARER_GRANT_TYPE, MAX_ASSERTION_LIFETIME_SECS,
    // Token
    RevocationResult, TokenResponse,
    // Report
    ApiErrorBody, ColumnHeader, ManagementEntity, ManagementList, ReportResponse,
};

// Re-export core components
pub use crate::core::{
    // Transport
    HttpMethod, HttpRequest, HttpResponse, HttpTransport, MockHttpTransport,
    ReqwestHttpTransport,
    // Status tagging
    inject_status_code, RawResponse, Transport, STATUS_FIELD,
    // Parameters
    ParamValue, QueryParams,
    // Decoding
    decode, ApiResponse, ResponseFormat, StatusCoded,
    // Time
    Clock, ManualClock, SystemClock,
};
