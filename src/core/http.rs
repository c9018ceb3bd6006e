//! Provider Transport
//!
//! Single-attempt GET/POST helper that form-encodes parameters and tags the
//! response body with its HTTP status.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::core::params::QueryParams;
use crate::core::transport::{HttpMethod, HttpRequest, HttpTransport, ReqwestHttpTransport};
use crate::error::TransportError;

/// Name of the synthetic status field injected into every JSON body.
pub const STATUS_FIELD: &str = "http_code";

/// Response body after status injection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawResponse {
    /// Transport status code.
    pub status: u16,
    /// Body text, with `"http_code":<status>` as its first key when the
    /// provider answered with a JSON object.
    pub body: String,
}

/// Insert `"http_code":<status>` as the first key of a JSON object body.
///
/// Works on the text directly so the provider's formatting is preserved byte
/// for byte. Bodies that do not start with `{` are returned unchanged.
pub fn inject_status_code(body: &str, status: u16) -> String {
    let Some(rest) = body.strip_prefix('{') else {
        return body.to_string();
    };

    // `{}` must not become `{"http_code":200,}`
    let separator = if rest.trim_start().starts_with('}') { "" } else { "," };
    format!("{{\"{}\":{}{}{}", STATUS_FIELD, status, separator, rest)
}

/// Provider transport.
///
/// Holds nothing but a shared handle to the HTTP seam, so clones are cheap and
/// concurrent calls need no coordination.
pub struct Transport<T: HttpTransport = ReqwestHttpTransport> {
    http: Arc<T>,
}

impl<T: HttpTransport> Clone for Transport<T> {
    fn clone(&self) -> Self {
        Self {
            http: self.http.clone(),
        }
    }
}

impl Transport<ReqwestHttpTransport> {
    /// Create a transport backed by reqwest.
    pub fn reqwest() -> Result<Self, TransportError> {
        Ok(Self::new(Arc::new(ReqwestHttpTransport::new()?)))
    }
}

impl<T: HttpTransport> Transport<T> {
    /// Create a transport over a custom HTTP implementation.
    pub fn new(http: Arc<T>) -> Self {
        Self { http }
    }

    /// The underlying HTTP implementation.
    pub fn http(&self) -> &Arc<T> {
        &self.http
    }

    /// Send `params` to `url`, in the query string for GET or as a form body
    /// for POST.
    ///
    /// An empty `url` yields [`TransportError::NoOp`] without touching the
    /// network.
    pub async fn send(
        &self,
        url: &str,
        params: &QueryParams,
        use_post: bool,
    ) -> Result<RawResponse, TransportError> {
        if url.trim().is_empty() {
            return Err(TransportError::NoOp);
        }

        let mut headers = HashMap::new();
        let (method, full_url, body) = if use_post {
            headers.insert(
                "content-type".to_string(),
                "application/x-www-form-urlencoded".to_string(),
            );
            (HttpMethod::Post, url.to_string(), Some(params.to_form_encoded()))
        } else if params.is_empty() {
            (HttpMethod::Get, url.to_string(), None)
        } else {
            (
                HttpMethod::Get,
                format!("{}?{}", url, params.to_form_encoded()),
                None,
            )
        };

        // The query string carries access tokens; only the endpoint is logged.
        debug!(method = method.as_str(), endpoint = url, "Sending provider request");

        let response = self
            .http
            .send(HttpRequest {
                method,
                url: full_url,
                headers,
                body,
            })
            .await?;

        debug!(endpoint = url, status = response.status, "Provider responded");

        Ok(RawResponse {
            status: response.status,
            body: inject_status_code(&response.body, response.status),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transport::{HttpResponse, MockHttpTransport};

    #[test]
    fn test_inject_status_code_is_textual() {
        assert_eq!(inject_status_code(r#"{"a":1}"#, 200), r#"{"http_code":200,"a":1}"#);

        // formatting and key order survive untouched
        let body = "{\n  \"z\": 1,\n  \"a\": [1, 2]\n}";
        assert_eq!(
            inject_status_code(body, 400),
            "{\"http_code\":400,\n  \"z\": 1,\n  \"a\": [1, 2]\n}"
        );
    }

    #[test]
    fn test_inject_status_code_edge_cases() {
        assert_eq!(inject_status_code("{}", 200), r#"{"http_code":200}"#);
        assert_eq!(inject_status_code("", 200), "");
        assert_eq!(inject_status_code("[1,2]", 200), "[1,2]");
        assert_eq!(inject_status_code("Not Found", 404), "Not Found");
        // a leading space means the body does not start with an object
        assert_eq!(inject_status_code(" {\"a\":1}", 200), " {\"a\":1}");
    }

    #[test]
    fn test_empty_url_is_no_op() {
        let http = Arc::new(MockHttpTransport::new());
        let transport = Transport::new(http.clone());
        let params = QueryParams::from([("a", "1")]);

        for use_post in [false, true] {
            let result = tokio_test::block_on(transport.send("", &params, use_post));
            assert!(matches!(result, Err(TransportError::NoOp)));
        }
        assert_eq!(http.request_count(), 0);
    }

    #[tokio::test]
    async fn test_get_appends_query_string() {
        let http = Arc::new(MockHttpTransport::new());
        http.queue_body(200, r#"{"ok":true}"#);
        let transport = Transport::new(http.clone());

        let params = QueryParams::from([("ids", "ga:1"), ("metrics", "ga:visits")]);
        let response = transport
            .send("https://example.com/data", &params, false)
            .await
            .unwrap();

        assert_eq!(response.body, r#"{"http_code":200,"ok":true}"#);
        let request = http.get_last_request().unwrap();
        assert_eq!(request.method, HttpMethod::Get);
        assert_eq!(request.url, "https://example.com/data?ids=ga%3A1&metrics=ga%3Avisits");
        assert!(request.body.is_none());
        assert!(!request.headers.contains_key("authorization"));
    }

    #[tokio::test]
    async fn test_get_without_params_keeps_url() {
        let http = Arc::new(MockHttpTransport::new());
        http.queue_body(200, "{}");
        let transport = Transport::new(http.clone());

        transport
            .send("https://example.com/data", &QueryParams::new(), false)
            .await
            .unwrap();
        assert_eq!(http.get_last_request().unwrap().url, "https://example.com/data");
    }

    #[tokio::test]
    async fn test_post_sends_form_body() {
        let http = Arc::new(MockHttpTransport::new());
        http.queue_response(HttpResponse::new(400, r#"{"error":"invalid_grant"}"#));
        let transport = Transport::new(http.clone());

        let params = QueryParams::from([("grant_type", "refresh_token"), ("refresh_token", "r/1")]);
        let response = transport
            .send("https://example.com/token", &params, true)
            .await
            .unwrap();

        assert_eq!(response.status, 400);
        assert_eq!(response.body, r#"{"http_code":400,"error":"invalid_grant"}"#);

        let request = http.get_last_request().unwrap();
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.url, "https://example.com/token");
        assert_eq!(
            request.body.as_deref(),
            Some("grant_type=refresh_token&refresh_token=r%2F1")
        );
        assert_eq!(
            request.headers.get("content-type").map(String::as_str),
            Some("application/x-www-form-urlencoded")
        );
    }

    #[tokio::test]
    async fn test_network_failure_propagates() {
        let http = Arc::new(MockHttpTransport::new());
        http.queue_error(TransportError::ConnectionFailed {
            message: "connection refused".to_string(),
        });
        let transport = Transport::new(http);

        let result = transport
            .send("https://example.com", &QueryParams::new(), false)
            .await;
        assert!(matches!(result, Err(TransportError::ConnectionFailed { .. })));
    }
}
