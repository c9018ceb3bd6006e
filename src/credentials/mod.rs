//! Credentials
//!
//! The two ways of obtaining an access token: the browser-based
//! authorization-code grant and the service-account JWT-bearer grant.
//!
//! Every operation makes at most one request. Nothing is cached between
//! calls; storing and refreshing tokens is left to the caller.

pub mod assertion;
pub mod key_store;
pub mod service_account;
pub mod web_flow;

pub use assertion::*;
pub use key_store::*;
pub use service_account::*;
pub use web_flow::*;

use async_trait::async_trait;
use tracing::debug;

use crate::core::{decode, ApiResponse, QueryParams, ResponseFormat, Transport};
use crate::core::transport::{HttpTransport, ReqwestHttpTransport};
use crate::error::{AnalyticsResult, ConfigurationError};
use crate::types::TokenResponse;

/// Capability shared by both credential kinds.
#[async_trait]
pub trait Credential: Send + Sync {
    fn client_id(&self) -> &str;

    fn set_client_id(&mut self, client_id: String);

    fn response_format(&self) -> ResponseFormat;

    /// Choose between structured and raw decoding of token responses.
    fn toggle_structured_decoding(&mut self, structured: bool);

    /// Obtain an access token.
    ///
    /// `input` is the authorization code for the web flow and is ignored by
    /// service accounts. Provider refusals come back as a normal response
    /// with a non-200 `http_code`.
    async fn acquire_token(&self, input: Option<&str>) -> AnalyticsResult<ApiResponse<TokenResponse>>;
}

/// Fields common to every credential.
#[derive(Clone, Debug, Default)]
pub struct CredentialIdentity {
    pub client_id: String,
    pub format: ResponseFormat,
}

/// `value` itself, or `MissingRequired` when it is empty.
pub(crate) fn require<'a>(value: &'a str, field: &str) -> Result<&'a str, ConfigurationError> {
    if value.trim().is_empty() {
        Err(ConfigurationError::missing(field))
    } else {
        Ok(value)
    }
}

/// POST a grant to the token endpoint and decode the answer.
pub(crate) async fn request_token<T: HttpTransport>(
    transport: &Transport<T>,
    token_url: &str,
    params: &QueryParams,
    format: ResponseFormat,
) -> AnalyticsResult<ApiResponse<TokenResponse>> {
    let raw = transport.send(token_url, params, true).await?;
    debug!(status = raw.status, "Token endpoint responded");
    Ok(decode(&raw, format)?)
}

/// A credential of either kind, chosen at construction time.
pub enum CredentialKind<T: HttpTransport = ReqwestHttpTransport> {
    WebFlow(WebFlowCredential<T>),
    ServiceAccount(ServiceAccountCredential<T>),
}

impl<T: HttpTransport> CredentialKind<T> {
    pub fn as_web_flow(&self) -> Option<&WebFlowCredential<T>> {
        match self {
            Self::WebFlow(credential) => Some(credential),
            Self::ServiceAccount(_) => None,
        }
    }

    pub fn as_web_flow_mut(&mut self) -> Option<&mut WebFlowCredential<T>> {
        match self {
            Self::WebFlow(credential) => Some(credential),
            Self::ServiceAccount(_) => None,
        }
    }

    pub fn as_service_account(&self) -> Option<&ServiceAccountCredential<T>> {
        match self {
            Self::ServiceAccount(credential) => Some(credential),
            Self::WebFlow(_) => None,
        }
    }

    pub fn as_service_account_mut(&mut self) -> Option<&mut ServiceAccountCredential<T>> {
        match self {
            Self::ServiceAccount(credential) => Some(credential),
            Self::WebFlow(_) => None,
        }
    }
}

#[async_trait]
impl<T: HttpTransport> Credential for CredentialKind<T> {
    fn client_id(&self) -> &str {
        match self {
            Self::WebFlow(credential) => credential.client_id(),
            Self::ServiceAccount(credential) => credential.client_id(),
        }
    }

    fn set_client_id(&mut self, client_id: String) {
        match self {
            Self::WebFlow(credential) => credential.set_client_id(client_id),
            Self::ServiceAccount(credential) => credential.set_client_id(client_id),
        }
    }

    fn response_format(&self) -> ResponseFormat {
        match self {
            Self::WebFlow(credential) => credential.response_format(),
            Self::ServiceAccount(credential) => credential.response_format(),
        }
    }

    fn toggle_structured_decoding(&mut self, structured: bool) {
        match self {
            Self::WebFlow(credential) => credential.toggle_structured_decoding(structured),
            Self::ServiceAccount(credential) => credential.toggle_structured_decoding(structured),
        }
    }

    async fn acquire_token(&self, input: Option<&str>) -> AnalyticsResult<ApiResponse<TokenResponse>> {
        match self {
            Self::WebFlow(credential) => credential.acquire_token(input).await,
            Self::ServiceAccount(credential) => credential.acquire_token(input).await,
        }
    }
}

impl<T: HttpTransport> std::fmt::Debug for CredentialKind<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WebFlow(credential) => f.debug_tuple("WebFlow").field(credential).finish(),
            Self::ServiceAccount(credential) => {
                f.debug_tuple("ServiceAccount").field(credential).finish()
            }
        }
    }
}

impl<T: HttpTransport> From<WebFlowCredential<T>> for CredentialKind<T> {
    fn from(credential: WebFlowCredential<T>) -> Self {
        Self::WebFlow(credential)
    }
}

impl<T: HttpTransport> From<ServiceAccountCredential<T>> for CredentialKind<T> {
    fn from(credential: ServiceAccountCredential<T>) -> Self {
        Self::ServiceAccount(credential)
    }
}
