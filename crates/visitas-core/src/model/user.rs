use serde::{Deserialize, Serialize};
use std::fmt;

/// Directory role. Admins see and assign every address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    Member,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Member => "member",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An entry in the user directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub role: Role,
}

impl User {
    /// A user known only by email, e.g. one missing from the directory.
    #[must_use]
    pub fn member(email: impl Into<String>) -> Self {
        let email = email.into();
        Self {
            display_name: email.clone(),
            email,
            role: Role::Member,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        if self.display_name.is_empty() {
            &self.email
        } else {
            &self.display_name
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_defaults_to_member() {
        let user: User = toml::from_str("email = \"ana@example.com\"").unwrap();
        assert_eq!(user.role, Role::Member);
        assert_eq!(user.name(), "ana@example.com");
    }

    #[test]
    fn admin_role_parses_lowercase() {
        let user: User =
            toml::from_str("email = \"a@x\"\ndisplay_name = \"Admin\"\nrole = \"admin\"").unwrap();
        assert_eq!(user.role, Role::Admin);
        assert_eq!(user.name(), "Admin");
    }
}
