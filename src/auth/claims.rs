use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

/// Identity and capabilities extracted from a verified token.
///
/// Rebuilt from the token on every request and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthClaims {
    pub user_id: i64,
    pub username: String,
    pub roles: BTreeSet<String>,
    pub permissions: BTreeSet<String>,
    pub expires_at: DateTime<Utc>,
}

impl AuthClaims {
    /// True if any of `required` is among the granted permissions.
    pub fn has_any_permission<S: AsRef<str>>(&self, required: &[S]) -> bool {
        required
            .iter()
            .any(|p| self.permissions.contains(p.as_ref()))
    }

    /// True if any of `required` is among the granted roles.
    pub fn has_any_role<S: AsRef<str>>(&self, required: &[S]) -> bool {
        required.iter().any(|r| self.roles.contains(r.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(permissions: &[&str], roles: &[&str]) -> AuthClaims {
        AuthClaims {
            user_id: 7,
            username: "clerk".to_string(),
            roles: roles.iter().map(|s| s.to_string()).collect(),
            permissions: permissions.iter().map(|s| s.to_string()).collect(),
            expires_at: Utc::now(),
        }
    }

    #[test]
    fn test_any_permission_is_or_semantics() {
        let c = claims(&["view_orders"], &[]);
        assert!(c.has_any_permission(&["manage_orders", "view_orders"]));
        assert!(!c.has_any_permission(&["manage_orders"]));
    }

    #[test]
    fn test_empty_requirement_never_matches() {
        let c = claims(&["view_orders"], &["Manager"]);
        assert!(!c.has_any_permission::<&str>(&[]));
        assert!(!c.has_any_role::<&str>(&[]));
    }

    #[test]
    fn test_roles_match_exactly() {
        let c = claims(&[], &["Manager"]);
        assert!(c.has_any_role(&["Admin", "Manager"]));
        assert!(!c.has_any_role(&["manager"]));
    }
}
