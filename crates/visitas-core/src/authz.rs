//! The one place role decisions are made.

use crate::error::VisitasError;
use crate::model::user::{Role, User};

#[must_use]
pub fn is_admin(user: &User) -> bool {
    user.role == Role::Admin
}

/// Fail with `PermissionDenied` naming `action` unless `user` is an admin.
pub fn require_admin(user: &User, action: &'static str) -> Result<(), VisitasError> {
    if is_admin(user) {
        Ok(())
    } else {
        Err(VisitasError::PermissionDenied { action })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn members_are_denied_admin_actions() {
        let member = User::member("rui@example.com");
        let err = require_admin(&member, "listing users").unwrap_err();
        assert_eq!(err.error_code(), ErrorCode::PermissionDenied);
        assert_eq!(err.to_string(), "listing users requires the admin role");
    }

    #[test]
    fn admins_pass() {
        let admin = User {
            email: "ana@example.com".into(),
            display_name: "Ana".into(),
            role: Role::Admin,
        };
        assert!(is_admin(&admin));
        assert!(require_admin(&admin, "import").is_ok());
    }
}
