//! Password hashing and verification using argon2id.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use std::sync::OnceLock;

/// Hash a password using argon2id with a random salt, producing a PHC
/// string that embeds the salt and parameters.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a password against a stored PHC string. A stored hash that
/// fails to parse verifies as false rather than surfacing an error:
/// login failures must stay indistinguishable to the caller.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// A hash of a throwaway password, verified against when a login names
/// an unknown user so that both failure arms do comparable work.
pub fn dummy_hash() -> &'static str {
    static DUMMY: OnceLock<String> = OnceLock::new();
    DUMMY.get_or_init(|| {
        hash_password("verdant-unknown-user").expect("argon2 hashing with default params succeeds")
    })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn hash_and_verify() {
        let hash = hash_password("tractor-shed-42").unwrap();
        assert!(verify_password("tractor-shed-42", &hash));
        assert!(!verify_password("tractor-shed-43", &hash));
    }

    #[test]
    fn salts_differ_across_hashes() {
        let h1 = hash_password("same-password").unwrap();
        let h2 = hash_password("same-password").unwrap();
        assert_ne!(h1, h2);
    }

    #[test]
    fn unparseable_stored_hash_verifies_false() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }

    #[test]
    fn dummy_hash_never_verifies_a_real_password() {
        assert!(!verify_password("hunter2", dummy_hash()));
    }
}
