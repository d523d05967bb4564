use crate::{Id, Role};

/// AccessClaims are claims encoded within platform access tokens.
///
/// Tokens are stateless: nothing is persisted at issuance, and validity
/// is determined purely by signature and expiry at verification time.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AccessClaims {
    // Unix timestamp, in seconds, at which the token was issued.
    pub iat: u64,
    // Unix timestamp, in seconds, at which the token expires.
    pub exp: u64,
    // Authorized user id.
    pub sub: Id,
    // Role of the authorized user.
    pub role: Role,
    // The login key the token was issued against: email for admins,
    // phone number for farmers.
    pub login_key: String,
}

impl AccessClaims {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// The record-visibility scope this identity reads under.
    pub fn scope(&self) -> Scope {
        match self.role {
            Role::Admin => Scope::Unrestricted,
            Role::Farmer => Scope::Farmer(self.sub),
        }
    }
}

/// Scope is the subset of records an identity is permitted to read.
/// It is always applied before any caller-supplied filter.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Scope {
    /// Admins read everything.
    Unrestricted,
    /// Farmers read records related to them directly or through farm
    /// or device ownership.
    Farmer(Id),
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn claims_round_trip() {
        let claims = AccessClaims {
            iat: 1_700_000_000,
            exp: 1_700_003_600,
            sub: Id::new(7),
            role: Role::Farmer,
            login_key: "+15550100".to_string(),
        };
        let encoded = serde_json::to_value(&claims).unwrap();
        assert_eq!(encoded["sub"], 7);
        assert_eq!(encoded["role"], "farmer");

        let decoded: AccessClaims = serde_json::from_value(encoded).unwrap();
        assert_eq!(decoded.sub, Id::new(7));
        assert!(!decoded.is_admin());
    }

    #[test]
    fn unknown_roles_fail_to_decode() {
        let result = serde_json::from_value::<AccessClaims>(serde_json::json!({
            "iat": 0,
            "exp": 3600,
            "sub": 1,
            "role": "superuser",
            "login_key": "x",
        }));
        assert!(result.is_err());
    }
}
