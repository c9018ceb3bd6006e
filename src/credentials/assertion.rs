//! JWT Assertions
//!
//! Claim set of the JWT-bearer grant and its RS256 compact serialization.

use jsonwebtoken::{decode, decode_header, encode, Algorithm, DecodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::credentials::key_store::ServiceAccountKey;
use crate::error::KeyMaterialError;
use crate::types::MAX_ASSERTION_LIFETIME_SECS;

/// Claim set sent to the token endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssertionClaims {
    /// Service account email.
    pub iss: String,
    pub scope: String,
    /// Token endpoint URL.
    pub aud: String,
    pub exp: i64,
    pub iat: i64,
}

impl AssertionClaims {
    /// Claims issued at `issued_at`, expiring after the maximum lifetime.
    pub fn new(
        issuer: impl Into<String>,
        scope: impl Into<String>,
        audience: impl Into<String>,
        issued_at: i64,
    ) -> Self {
        Self {
            iss: issuer.into(),
            scope: scope.into(),
            aud: audience.into(),
            exp: issued_at + MAX_ASSERTION_LIFETIME_SECS,
            iat: issued_at,
        }
    }
}

/// Sign `claims` with RS256 and return the compact three-segment assertion.
pub fn sign_assertion(
    claims: &AssertionClaims,
    key: &ServiceAccountKey,
) -> Result<String, KeyMaterialError> {
    encode(&Header::new(Algorithm::RS256), claims, key.encoding_key()).map_err(|e| {
        KeyMaterialError::SigningFailed {
            message: format!("JWT encoding failed: {}", e),
        }
    })
}

/// Decode the header and claims of a compact assertion without verifying it.
pub fn inspect_assertion(assertion: &str) -> Option<(Header, AssertionClaims)> {
    let header = decode_header(assertion).ok()?;

    let mut validation = Validation::new(header.alg);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data = decode::<AssertionClaims>(assertion, &DecodingKey::from_secret(&[]), &validation).ok()?;
    Some((data.header, data.claims))
}
