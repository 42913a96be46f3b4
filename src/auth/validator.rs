//! Bearer token verification.
//!
//! A pure function of (token, shared secret, current time): no network or
//! database access happens here.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::{AuthClaims, AuthError};

/// The only algorithm tokens may be signed with.
pub const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;

/// Claims as they appear in the token body.
///
/// Fields stay untyped so that a signed token with oddly typed claims is
/// reported as a payload problem rather than a signature failure.
#[derive(Debug, Deserialize)]
struct TokenPayload {
    #[serde(default)]
    username: Option<Value>,
    #[serde(default)]
    user_id: Option<Value>,
    #[serde(default)]
    roles: Option<Value>,
    #[serde(default)]
    permissions: Option<Value>,
    #[serde(default)]
    exp: Option<Value>,
}

/// Seconds since the epoch, truncated. Non-numeric values yield `None`.
fn expiry_seconds(exp: &Value) -> Option<i64> {
    exp.as_i64()
        .or_else(|| exp.as_f64().filter(|f| f.is_finite()).map(|f| f.floor() as i64))
}

/// A JSON array of strings; `null` or absent reads as empty.
fn string_set(value: Option<Value>) -> Result<Vec<String>, AuthError> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .into_iter()
            .map(|item| match item {
                Value::String(tag) => Ok(tag),
                _ => Err(AuthError::INVALID_PAYLOAD),
            })
            .collect(),
        Some(_) => Err(AuthError::INVALID_PAYLOAD),
    }
}

/// Verifies HS256 bearer tokens signed with a shared secret.
#[derive(Clone)]
pub struct TokenValidator {
    key: DecodingKey,
    validation: Validation,
}

impl TokenValidator {
    /// Create a validator for tokens signed with `secret`.
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(SIGNING_ALGORITHM);
        // Expiry is checked against an explicit instant in `validate_at`,
        // with no leeway, so the library check is turned off.
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.required_spec_claims.clear();

        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Validate a token against the current wall clock.
    pub fn validate(&self, token: &str) -> Result<AuthClaims, AuthError> {
        self.validate_at(token, Utc::now())
    }

    /// Validate a token as of `now`.
    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<AuthClaims, AuthError> {
        if token.trim().is_empty() {
            return Err(AuthError::NOT_AUTHENTICATED);
        }

        let payload = jsonwebtoken::decode::<TokenPayload>(token, &self.key, &self.validation)
            .map_err(|e| {
                debug!(error = %e, "token verification failed");
                AuthError::INVALID_TOKEN
            })?
            .claims;

        let expires_at = match payload.exp.as_ref().and_then(expiry_seconds) {
            None => return Err(AuthError::TOKEN_EXPIRED),
            Some(exp) => DateTime::from_timestamp(exp, 0).ok_or(AuthError::INVALID_PAYLOAD)?,
        };
        if now >= expires_at {
            return Err(AuthError::TOKEN_EXPIRED);
        }

        let (Some(Value::String(username)), Some(user_id)) =
            (payload.username, payload.user_id.as_ref().and_then(Value::as_i64))
        else {
            debug!("token claims missing or mistyped");
            return Err(AuthError::INVALID_PAYLOAD);
        };

        Ok(AuthClaims {
            user_id,
            username,
            roles: string_set(payload.roles)?.into_iter().collect(),
            permissions: string_set(payload.permissions)?.into_iter().collect(),
            expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::Duration;
    use jsonwebtoken::{EncodingKey, Header};
    use serde_json::{json, Value};

    use super::*;

    const SECRET: &str = "test-secret";

    fn sign(claims: &Value) -> String {
        sign_with(claims, SECRET, Algorithm::HS256)
    }

    fn sign_with(claims: &Value, secret: &str, alg: Algorithm) -> String {
        jsonwebtoken::encode(
            &Header::new(alg),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn in_minutes(minutes: i64) -> i64 {
        (Utc::now() + Duration::minutes(minutes)).timestamp()
    }

    #[test]
    fn test_round_trip_preserves_claims() {
        let exp = in_minutes(15);
        let token = sign(&json!({
            "username": "testuser",
            "user_id": 1,
            "roles": ["admin"],
            "permissions": ["read", "write"],
            "exp": exp,
        }));

        let claims = TokenValidator::new(SECRET).validate(&token).unwrap();

        assert_eq!(claims.username, "testuser");
        assert_eq!(claims.user_id, 1);
        assert_eq!(claims.roles, BTreeSet::from(["admin".to_string()]));
        assert_eq!(
            claims.permissions,
            BTreeSet::from(["read".to_string(), "write".to_string()])
        );
        assert_eq!(claims.expires_at.timestamp(), exp);
    }

    #[test]
    fn test_missing_roles_and_permissions_are_empty() {
        let token = sign(&json!({"username": "u", "user_id": 3, "exp": in_minutes(5)}));
        let claims = TokenValidator::new(SECRET).validate(&token).unwrap();
        assert!(claims.roles.is_empty());
        assert!(claims.permissions.is_empty());
    }

    #[test]
    fn test_expired_token_rejected() {
        let token = sign(&json!({
            "username": "u",
            "user_id": 1,
            "permissions": ["manage_orders"],
            "exp": in_minutes(-1),
        }));
        let err = TokenValidator::new(SECRET).validate(&token).unwrap_err();
        assert_eq!(err, AuthError::TOKEN_EXPIRED);
    }

    #[test]
    fn test_expired_token_rejected_even_without_identity() {
        let token = sign(&json!({"exp": in_minutes(-10)}));
        let err = TokenValidator::new(SECRET).validate(&token).unwrap_err();
        assert_eq!(err, AuthError::TOKEN_EXPIRED);
    }

    #[test]
    fn test_expiry_instant_itself_is_expired() {
        let now = Utc::now();
        let token = sign(&json!({"username": "u", "user_id": 1, "exp": now.timestamp()}));
        let validator = TokenValidator::new(SECRET);

        let at_expiry = DateTime::from_timestamp(now.timestamp(), 0).unwrap();
        assert_eq!(
            validator.validate_at(&token, at_expiry).unwrap_err(),
            AuthError::TOKEN_EXPIRED
        );
        assert!(validator
            .validate_at(&token, at_expiry - Duration::seconds(1))
            .is_ok());
    }

    #[test]
    fn test_missing_exp_rejected() {
        let token = sign(&json!({"username": "u", "user_id": 1}));
        let err = TokenValidator::new(SECRET).validate(&token).unwrap_err();
        assert_eq!(err, AuthError::TOKEN_EXPIRED);
    }

    #[test]
    fn test_missing_username_rejected() {
        let token = sign(&json!({"user_id": 1, "exp": in_minutes(5)}));
        let err = TokenValidator::new(SECRET).validate(&token).unwrap_err();
        assert_eq!(err, AuthError::INVALID_PAYLOAD);
    }

    #[test]
    fn test_missing_user_id_rejected() {
        let token = sign(&json!({"username": "u", "exp": in_minutes(5)}));
        let err = TokenValidator::new(SECRET).validate(&token).unwrap_err();
        assert_eq!(err, AuthError::INVALID_PAYLOAD);
    }

    #[test]
    fn test_string_user_id_is_payload_error() {
        let token = sign(&json!({"username": "u", "user_id": "5", "exp": in_minutes(5)}));
        let err = TokenValidator::new(SECRET).validate(&token).unwrap_err();
        assert_eq!(err, AuthError::INVALID_PAYLOAD);
    }

    #[test]
    fn test_mistyped_permissions_are_payload_error() {
        let token = sign(&json!({
            "username": "u",
            "user_id": 1,
            "permissions": "manage_orders",
            "exp": in_minutes(5),
        }));
        let err = TokenValidator::new(SECRET).validate(&token).unwrap_err();
        assert_eq!(err, AuthError::INVALID_PAYLOAD);
    }

    #[test]
    fn test_fractional_exp_is_honored() {
        let validator = TokenValidator::new(SECRET);
        let exp = in_minutes(5);

        let live = sign(&json!({"username": "u", "user_id": 1, "exp": exp as f64 + 0.5}));
        let claims = validator.validate(&live).unwrap();
        assert_eq!(claims.expires_at.timestamp(), exp);

        let stale = sign(&json!({"username": "u", "user_id": 1, "exp": in_minutes(-5) as f64 + 0.5}));
        assert_eq!(
            validator.validate(&stale).unwrap_err(),
            AuthError::TOKEN_EXPIRED
        );
    }

    #[test]
    fn test_non_numeric_exp_is_expired() {
        let token = sign(&json!({"username": "u", "user_id": 1, "exp": "tomorrow"}));
        let err = TokenValidator::new(SECRET).validate(&token).unwrap_err();
        assert_eq!(err, AuthError::TOKEN_EXPIRED);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = sign_with(
            &json!({"username": "u", "user_id": 1, "exp": in_minutes(5)}),
            "other-secret",
            Algorithm::HS256,
        );
        let err = TokenValidator::new(SECRET).validate(&token).unwrap_err();
        assert_eq!(err, AuthError::INVALID_TOKEN);
    }

    #[test]
    fn test_other_algorithm_rejected() {
        let token = sign_with(
            &json!({"username": "u", "user_id": 1, "exp": in_minutes(5)}),
            SECRET,
            Algorithm::HS512,
        );
        let err = TokenValidator::new(SECRET).validate(&token).unwrap_err();
        assert_eq!(err, AuthError::INVALID_TOKEN);
    }

    #[test]
    fn test_malformed_token_rejected() {
        let err = TokenValidator::new(SECRET)
            .validate("not.a.token")
            .unwrap_err();
        assert_eq!(err, AuthError::INVALID_TOKEN);
    }

    #[test]
    fn test_empty_token_is_unauthenticated() {
        let err = TokenValidator::new(SECRET).validate("   ").unwrap_err();
        assert_eq!(err, AuthError::NOT_AUTHENTICATED);
    }
}
