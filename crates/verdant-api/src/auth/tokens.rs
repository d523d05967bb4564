//! Issuance and verification of platform access tokens.

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use models::{authorizations::AccessClaims, Id, Role};

/// Fixed token lifetime. There is no refresh mechanism: clients log in
/// again when the token expires.
pub const TOKEN_TTL_SECONDS: u64 = 3600;

/// Reasons token verification fails. Expiry is reported distinctly
/// because clients use it to force a logout; everything else collapses
/// into Invalid so a forged token learns nothing.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("invalid token")]
    Invalid,
}

/// TokenAuthority signs and verifies access tokens. The signing secret
/// is injected at construction so verification is testable without
/// touching process environment.
pub struct TokenAuthority {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenAuthority {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::default();
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Issue a token for the given identity, expiring in
    /// [`TOKEN_TTL_SECONDS`].
    pub fn issue(
        &self,
        sub: Id,
        role: Role,
        login_key: &str,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        self.issue_at(sub, role, login_key, jsonwebtoken::get_current_timestamp())
    }

    pub(crate) fn issue_at(
        &self,
        sub: Id,
        role: Role,
        login_key: &str,
        iat: u64,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let claims = AccessClaims {
            iat,
            exp: iat + TOKEN_TTL_SECONDS,
            sub,
            role,
            login_key: login_key.to_string(),
        };
        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding)
    }

    /// Verify signature and expiry, returning the embedded claims.
    pub fn verify(&self, token: &str) -> Result<AccessClaims, TokenError> {
        jsonwebtoken::decode::<AccessClaims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn authority() -> TokenAuthority {
        TokenAuthority::new(b"a-test-signing-secret")
    }

    #[test]
    fn issued_tokens_verify_with_the_stored_role() {
        let tokens = authority();
        let token = tokens
            .issue(Id::new(7), Role::Farmer, "+15550100")
            .unwrap();

        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.sub, Id::new(7));
        assert_eq!(claims.role, Role::Farmer);
        assert_eq!(claims.login_key, "+15550100");
        assert_eq!(claims.exp, claims.iat + TOKEN_TTL_SECONDS);
    }

    #[test]
    fn tokens_older_than_the_ttl_fail_as_expired() {
        let tokens = authority();
        let iat = jsonwebtoken::get_current_timestamp() - 2 * TOKEN_TTL_SECONDS;
        let token = tokens
            .issue_at(Id::new(7), Role::Farmer, "+15550100", iat)
            .unwrap();

        assert_eq!(tokens.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn forged_and_garbage_tokens_fail_as_invalid() {
        let tokens = authority();
        let other = TokenAuthority::new(b"a-different-secret");
        let forged = other.issue(Id::new(7), Role::Admin, "ops@verdant.ag").unwrap();

        assert_eq!(tokens.verify(&forged), Err(TokenError::Invalid));
        assert_eq!(tokens.verify("not.a.token"), Err(TokenError::Invalid));
        assert_eq!(tokens.verify(""), Err(TokenError::Invalid));
    }

    #[test]
    fn expired_and_forged_tokens_are_distinguished() {
        // An expired token signed with the wrong key is still Invalid:
        // the expiry-specific error never leaks for unverified tokens.
        let tokens = authority();
        let other = TokenAuthority::new(b"a-different-secret");
        let iat = jsonwebtoken::get_current_timestamp() - 2 * TOKEN_TTL_SECONDS;
        let forged_expired = other
            .issue_at(Id::new(7), Role::Farmer, "+15550100", iat)
            .unwrap();

        assert_eq!(tokens.verify(&forged_expired), Err(TokenError::Invalid));
    }
}
