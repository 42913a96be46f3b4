//! Capability checks layered on top of token validation.
//!
//! Both permission and role requirements use OR semantics: holding any one
//! of the listed capabilities is enough.

use std::sync::Arc;

use tracing::debug;

use super::{AuthClaims, AuthError, TokenValidator};

/// Capabilities a route demands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    /// At least one of these permissions.
    AnyPermission(Vec<String>),
    /// At least one of these roles.
    AnyRole(Vec<String>),
}

impl Requirement {
    pub fn permissions(required: &[&str]) -> Self {
        Self::AnyPermission(required.iter().map(|s| s.to_string()).collect())
    }

    pub fn roles(required: &[&str]) -> Self {
        Self::AnyRole(required.iter().map(|s| s.to_string()).collect())
    }

    /// Accept or reject already-verified claims.
    pub fn check(&self, claims: &AuthClaims) -> Result<(), AuthError> {
        match self {
            Self::AnyPermission(required) if claims.has_any_permission(required) => Ok(()),
            Self::AnyPermission(_) => Err(AuthError::INSUFFICIENT_PERMISSIONS),
            Self::AnyRole(required) if claims.has_any_role(required) => Ok(()),
            Self::AnyRole(_) => Err(AuthError::INSUFFICIENT_ROLES),
        }
    }
}

/// A verified caller plus the credential they presented.
///
/// The raw `Authorization` value is kept so it can be forwarded unchanged
/// to downstream services.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub claims: AuthClaims,
    pub authorization: String,
}

/// Token validation composed with a capability requirement.
#[derive(Clone)]
pub struct Guard {
    validator: Arc<TokenValidator>,
    requirement: Arc<Requirement>,
}

impl Guard {
    pub fn new(validator: Arc<TokenValidator>, requirement: Requirement) -> Self {
        Self {
            validator,
            requirement: Arc::new(requirement),
        }
    }

    /// Guard accepting callers holding any of `required` permissions.
    pub fn require_permissions(validator: Arc<TokenValidator>, required: &[&str]) -> Self {
        Self::new(validator, Requirement::permissions(required))
    }

    /// Guard accepting callers holding any of `required` roles.
    pub fn require_roles(validator: Arc<TokenValidator>, required: &[&str]) -> Self {
        Self::new(validator, Requirement::roles(required))
    }

    /// Authenticate the `Authorization` header value, then authorize.
    ///
    /// Validation always runs first; its failure short-circuits before any
    /// capability is looked at.
    pub fn authorize(&self, authorization: Option<&str>) -> Result<AuthContext, AuthError> {
        let header = authorization.ok_or(AuthError::NOT_AUTHENTICATED)?;
        let token = bearer_token(header).ok_or(AuthError::NOT_AUTHENTICATED)?;

        let claims = self.validator.validate(token)?;
        if let Err(e) = self.requirement.check(&claims) {
            debug!(
                user_id = claims.user_id,
                requirement = ?self.requirement,
                "request rejected by guard"
            );
            return Err(e);
        }

        Ok(AuthContext {
            claims,
            authorization: header.to_string(),
        })
    }
}

/// Extract the credential from a `Bearer <token>` header value.
///
/// The scheme is matched case-insensitively; an empty credential yields `None`.
pub fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use jsonwebtoken::{EncodingKey, Header};
    use serde_json::json;

    use super::*;

    const SECRET: &str = "guard-secret";

    fn token(permissions: &[&str], roles: &[&str], exp_minutes: i64) -> String {
        let claims = json!({
            "username": "clerk",
            "user_id": 42,
            "roles": roles,
            "permissions": permissions,
            "exp": (Utc::now() + Duration::minutes(exp_minutes)).timestamp(),
        });
        jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    fn validator() -> Arc<TokenValidator> {
        Arc::new(TokenValidator::new(SECRET))
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(bearer_token("bearer  abc "), Some("abc"));
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("Bearer"), None);
        assert_eq!(bearer_token("Bearer   "), None);
    }

    #[test]
    fn test_permission_guard_accepts_any_listed_permission() {
        let guard = Guard::require_permissions(validator(), &["manage_orders", "view_orders"]);
        let header = format!("Bearer {}", token(&["view_orders"], &[], 5));

        let ctx = guard.authorize(Some(&header)).unwrap();

        assert_eq!(ctx.claims.user_id, 42);
        assert_eq!(ctx.authorization, header);
    }

    #[test]
    fn test_permission_guard_rejects_missing_permission() {
        let guard = Guard::require_permissions(validator(), &["manage_orders"]);
        let header = format!("Bearer {}", token(&["view_orders"], &["Manager"], 5));

        let err = guard.authorize(Some(&header)).unwrap_err();

        assert_eq!(err, AuthError::INSUFFICIENT_PERMISSIONS);
    }

    #[test]
    fn test_role_guard() {
        let guard = Guard::require_roles(validator(), &["Admin", "Manager"]);

        let ok = format!("Bearer {}", token(&[], &["Manager"], 5));
        assert!(guard.authorize(Some(&ok)).is_ok());

        let denied = format!("Bearer {}", token(&["manage_orders"], &["Clerk"], 5));
        assert_eq!(
            guard.authorize(Some(&denied)).unwrap_err(),
            AuthError::INSUFFICIENT_ROLES
        );
    }

    #[test]
    fn test_missing_header_is_unauthenticated() {
        let guard = Guard::require_permissions(validator(), &["manage_orders"]);
        assert_eq!(
            guard.authorize(None).unwrap_err(),
            AuthError::NOT_AUTHENTICATED
        );
        assert_eq!(
            guard.authorize(Some("Basic dXNlcjpwdw==")).unwrap_err(),
            AuthError::NOT_AUTHENTICATED
        );
    }

    #[test]
    fn test_validation_failure_wins_over_capability_check() {
        // Expired token lacking the permission still reports the token problem.
        let guard = Guard::require_permissions(validator(), &["manage_orders"]);
        let header = format!("Bearer {}", token(&[], &[], -5));

        assert_eq!(
            guard.authorize(Some(&header)).unwrap_err(),
            AuthError::TOKEN_EXPIRED
        );
    }
}
