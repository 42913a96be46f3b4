//! Bearer token validation and route authorization.
//!
//! Tokens are issued elsewhere; this module only verifies them with the
//! shared secret and checks their embedded roles and permissions.

mod claims;
mod guard;
mod validator;

pub use claims::AuthClaims;
pub use guard::{bearer_token, AuthContext, Guard, Requirement};
pub use validator::{TokenValidator, SIGNING_ALGORITHM};

/// Permission granting order creation and reads.
pub const MANAGE_ORDERS: &str = "manage_orders";
/// Permission granting order reads.
pub const VIEW_ORDERS: &str = "view_orders";

/// Errors produced while authenticating or authorizing a request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("{0}")]
    Unauthenticated(&'static str),

    #[error("{0}")]
    Forbidden(&'static str),
}

impl AuthError {
    pub const NOT_AUTHENTICATED: Self = Self::Unauthenticated("not authenticated");
    pub const INVALID_TOKEN: Self = Self::Unauthenticated("invalid or expired token");
    pub const INVALID_PAYLOAD: Self = Self::Unauthenticated("invalid token payload");
    pub const TOKEN_EXPIRED: Self = Self::Unauthenticated("token expired");
    pub const INSUFFICIENT_PERMISSIONS: Self = Self::Forbidden("insufficient permissions");
    pub const INSUFFICIENT_ROLES: Self = Self::Forbidden("insufficient roles");
}
