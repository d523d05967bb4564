use serde::{Deserialize, Serialize};
use validator::Validate;

/// Role of a platform identity. Admins operate the platform;
/// farmers own farms and the devices deployed on them.
/// Roles are immutable after registration.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role")]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Farmer,
}

impl Role {
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match *self {
            Role::Admin => "admin",
            Role::Farmer => "farmer",
        };
        f.write_str(s)
    }
}

/// RegisterUser is the body of `POST /auth/register`.
/// Exactly one login key is populated, determined by the role:
/// email for admins, phone number for farmers.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterUser {
    #[validate(length(min = 1, message = "Name is required."))]
    pub name: String,
    pub role: Role,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[validate(length(min = 8, message = "Password must be at least 8 characters."))]
    pub password: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl RegisterUser {
    /// Returns the error message for a missing role-conditional login key,
    /// or None if the required key is present.
    pub fn login_key_error(&self) -> Option<&'static str> {
        match self.role {
            Role::Admin if self.email.as_deref().map_or(true, str::is_empty) => {
                Some("Email is required for admin registration.")
            }
            Role::Farmer if self.phone_number.as_deref().map_or(true, str::is_empty) => {
                Some("Phone number is required for farmer registration.")
            }
            _ => None,
        }
    }

    /// The login key this registration will be stored under.
    pub fn login_key(&self) -> Option<&str> {
        match self.role {
            Role::Admin => self.email.as_deref(),
            Role::Farmer => self.phone_number.as_deref(),
        }
    }
}

/// LoginRequest is the body of `POST /auth/login`. Callers supply
/// whichever login key their role registered with.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[validate(length(min = 1, message = "Password is required."))]
    pub password: String,
}

impl LoginRequest {
    pub fn login_key(&self) -> Option<&str> {
        self.email
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.phone_number.as_deref().filter(|s| !s.is_empty()))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn registration(role: Role) -> RegisterUser {
        RegisterUser {
            name: "Rosa Vance".to_string(),
            role,
            email: None,
            phone_number: None,
            password: "correct-horse-battery".to_string(),
            address: None,
            latitude: None,
            longitude: None,
        }
    }

    #[test]
    fn farmer_registration_requires_a_phone_number() {
        let mut reg = registration(Role::Farmer);
        assert_eq!(
            reg.login_key_error(),
            Some("Phone number is required for farmer registration.")
        );

        reg.phone_number = Some("+15550100".to_string());
        assert_eq!(reg.login_key_error(), None);
        assert_eq!(reg.login_key(), Some("+15550100"));
    }

    #[test]
    fn admin_registration_requires_an_email() {
        let mut reg = registration(Role::Admin);
        reg.phone_number = Some("+15550100".to_string());
        assert_eq!(
            reg.login_key_error(),
            Some("Email is required for admin registration.")
        );

        reg.email = Some("ops@verdant.ag".to_string());
        assert_eq!(reg.login_key_error(), None);
        assert_eq!(reg.login_key(), Some("ops@verdant.ag"));
    }

    #[test]
    fn empty_login_keys_are_treated_as_missing() {
        let mut reg = registration(Role::Admin);
        reg.email = Some(String::new());
        assert!(reg.login_key_error().is_some());
    }

    #[test]
    fn login_request_prefers_email_over_phone() {
        let req = LoginRequest {
            email: Some("ops@verdant.ag".to_string()),
            phone_number: Some("+15550100".to_string()),
            password: "pw".to_string(),
        };
        assert_eq!(req.login_key(), Some("ops@verdant.ag"));

        let req = LoginRequest {
            email: None,
            phone_number: Some("+15550100".to_string()),
            password: "pw".to_string(),
        };
        assert_eq!(req.login_key(), Some("+15550100"));
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        assert_eq!(serde_json::to_string(&Role::Farmer).unwrap(), "\"farmer\"");
        assert!(serde_json::from_str::<Role>("\"superuser\"").is_err());
    }
}
