//! User directory: who is acting, and who addresses can be assigned to.

use crate::model::user::User;

/// Source of the current user and the assignable users.
pub trait Directory {
    fn current_user(&self) -> Option<User>;
    fn list_users(&self) -> Vec<User>;

    fn find(&self, email: &str) -> Option<User> {
        self.list_users().into_iter().find(|user| user.email == email)
    }
}

/// Directory built from the `[[users]]` table of the project config and a
/// resolved current email.
#[derive(Debug, Clone, Default)]
pub struct ConfigDirectory {
    current_email: Option<String>,
    users: Vec<User>,
}

impl ConfigDirectory {
    #[must_use]
    pub fn new(current_email: Option<String>, users: Vec<User>) -> Self {
        Self {
            current_email: current_email.filter(|email| !email.trim().is_empty()),
            users,
        }
    }
}

impl Directory for ConfigDirectory {
    /// The directory entry for the current email, or a plain member when the
    /// email is not listed.
    fn current_user(&self) -> Option<User> {
        let email = self.current_email.as_deref()?;
        Some(self.find(email).unwrap_or_else(|| User::member(email)))
    }

    fn list_users(&self) -> Vec<User> {
        self.users.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::user::Role;

    fn users() -> Vec<User> {
        vec![User {
            email: "ana@example.com".into(),
            display_name: "Ana".into(),
            role: Role::Admin,
        }]
    }

    #[test]
    fn listed_email_resolves_with_its_role() {
        let dir = ConfigDirectory::new(Some("ana@example.com".into()), users());
        let me = dir.current_user().unwrap();
        assert_eq!(me.role, Role::Admin);
        assert_eq!(me.display_name, "Ana");
    }

    #[test]
    fn unlisted_email_is_a_member() {
        let dir = ConfigDirectory::new(Some("rui@example.com".into()), users());
        let me = dir.current_user().unwrap();
        assert_eq!(me.role, Role::Member);
        assert_eq!(me.display_name, "rui@example.com");
    }

    #[test]
    fn blank_email_means_no_identity() {
        let dir = ConfigDirectory::new(Some("  ".into()), users());
        assert!(dir.current_user().is_none());
        assert!(ConfigDirectory::default().current_user().is_none());
    }
}
