//! Response Envelope
//!
//! Decoding of status-tagged bodies into structured types or raw maps.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::core::http::{RawResponse, STATUS_FIELD};
use crate::error::DecodeError;

/// How response bodies are decoded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ResponseFormat {
    /// Typed structs.
    #[default]
    Structured,
    /// Untyped JSON maps, keys in provider order.
    Raw,
}

impl ResponseFormat {
    /// `true` selects structured decoding.
    pub fn from_structured(structured: bool) -> Self {
        if structured {
            Self::Structured
        } else {
            Self::Raw
        }
    }

    pub fn is_structured(&self) -> bool {
        matches!(self, Self::Structured)
    }
}

/// Types that carry the injected transport status.
pub trait StatusCoded {
    fn http_code(&self) -> u16;
}

/// A decoded provider response.
#[derive(Clone, Debug, PartialEq)]
pub enum ApiResponse<T> {
    Structured(T),
    Raw(Map<String, Value>),
}

impl<T: StatusCoded> ApiResponse<T> {
    /// The injected transport status, if present.
    pub fn http_code(&self) -> Option<u16> {
        match self {
            Self::Structured(value) => Some(value.http_code()),
            Self::Raw(map) => map
                .get(STATUS_FIELD)
                .and_then(Value::as_u64)
                .and_then(|code| u16::try_from(code).ok()),
        }
    }

    /// Check for a 200 status.
    pub fn is_ok_status(&self) -> bool {
        self.http_code() == Some(200)
    }
}

impl<T> ApiResponse<T> {
    pub fn as_structured(&self) -> Option<&T> {
        match self {
            Self::Structured(value) => Some(value),
            Self::Raw(_) => None,
        }
    }

    pub fn into_structured(self) -> Option<T> {
        match self {
            Self::Structured(value) => Some(value),
            Self::Raw(_) => None,
        }
    }

    pub fn as_raw(&self) -> Option<&Map<String, Value>> {
        match self {
            Self::Structured(_) => None,
            Self::Raw(map) => Some(map),
        }
    }

    /// Look up a top-level string field of a raw response. Structured
    /// responses return `None`; read their typed fields instead.
    pub fn raw_str(&self, key: &str) -> Option<&str> {
        self.as_raw()
            .and_then(|map| map.get(key))
            .and_then(Value::as_str)
    }
}

/// Decode a status-tagged body.
pub fn decode<T: DeserializeOwned>(
    raw: &RawResponse,
    format: ResponseFormat,
) -> Result<ApiResponse<T>, DecodeError> {
    let invalid = |e: serde_json::Error| DecodeError::InvalidJson {
        status: raw.status,
        message: e.to_string(),
    };

    match format {
        ResponseFormat::Structured => serde_json::from_str::<T>(&raw.body)
            .map(ApiResponse::Structured)
            .map_err(invalid),
        ResponseFormat::Raw => serde_json::from_str::<Map<String, Value>>(&raw.body)
            .map(ApiResponse::Raw)
            .map_err(invalid),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Sample {
        http_code: u16,
        name: Option<String>,
    }

    impl StatusCoded for Sample {
        fn http_code(&self) -> u16 {
            self.http_code
        }
    }

    fn raw(status: u16, body: &str) -> RawResponse {
        RawResponse {
            status,
            body: body.to_string(),
        }
    }

    #[test]
    fn test_decode_structured() {
        let decoded: ApiResponse<Sample> =
            decode(&raw(200, r#"{"http_code":200,"name":"x"}"#), ResponseFormat::Structured)
                .unwrap();
        assert_eq!(decoded.http_code(), Some(200));
        assert_eq!(decoded.as_structured().and_then(|p| p.name.as_deref()), Some("x"));
    }

    #[test]
    fn test_decode_raw_preserves_key_order() {
        let decoded: ApiResponse<Sample> = decode(
            &raw(403, r#"{"http_code":403,"zeta":1,"alpha":2}"#),
            ResponseFormat::Raw,
        )
        .unwrap();
        assert_eq!(decoded.http_code(), Some(403));

        let keys: Vec<&String> = decoded.as_raw().unwrap().keys().collect();
        assert_eq!(keys, vec!["http_code", "zeta", "alpha"]);
    }

    #[test]
    fn test_raw_str_reads_raw_shape_only() {
        let body = r#"{"http_code":200,"name":"x"}"#;

        let raw_shape: ApiResponse<Sample> = decode(&raw(200, body), ResponseFormat::Raw).unwrap();
        assert_eq!(raw_shape.raw_str("name"), Some("x"));
        assert_eq!(raw_shape.raw_str("missing"), None);

        let structured: ApiResponse<Sample> =
            decode(&raw(200, body), ResponseFormat::Structured).unwrap();
        assert_eq!(structured.raw_str("name"), None);
    }

    #[test]
    fn test_decode_non_object_fails() {
        let result: Result<ApiResponse<Sample>, _> =
            decode(&raw(502, "Bad Gateway"), ResponseFormat::Structured);
        assert!(matches!(result, Err(DecodeError::InvalidJson { status: 502, .. })));

        let result: Result<ApiResponse<Sample>, _> = decode(&raw(200, "[]"), ResponseFormat::Raw);
        assert!(result.is_err());
    }

    #[test]
    fn test_response_format_from_structured() {
        assert_eq!(ResponseFormat::from_structured(true), ResponseFormat::Structured);
        assert_eq!(ResponseFormat::from_structured(false), ResponseFormat::Raw);
        assert!(ResponseFormat::default().is_structured());
    }
}
