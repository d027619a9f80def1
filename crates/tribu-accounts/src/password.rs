use anyhow::{anyhow, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

/// Hash a password with Argon2id.
///
/// `m_cost` is the memory cost in KB. A fresh random salt is generated per
/// call, so hashing the same plaintext twice yields different PHC strings.
/// One fixed configuration (Argon2id, t=3, p=1, 32-byte output) is used for
/// every account, including the seeded default admin.
pub fn hash_password(password: &str, m_cost: u32) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let params =
        Params::new(m_cost, 3, 1, Some(32)).map_err(|e| anyhow!("argon2 params: {}", e))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!("hash_password: {}", e))?;
    Ok(hash.to_string())
}

/// Verify a password against a stored Argon2id hash.
///
/// Never errors: a malformed or truncated hash simply verifies as false.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::{hash_password, verify_password};

    // Low memory cost so tests stay fast.
    const TEST_M_COST: u32 = 4096;

    #[test]
    fn hash_differs_per_call_but_both_verify() {
        let a = hash_password("p1", TEST_M_COST).expect("hash");
        let b = hash_password("p1", TEST_M_COST).expect("hash");
        assert_ne!(a, b, "salt must differ per call");
        assert!(verify_password("p1", &a));
        assert!(verify_password("p1", &b));
    }

    #[test]
    fn stored_hash_is_never_the_plaintext() {
        let hash = hash_password("password123", TEST_M_COST).expect("hash");
        assert_ne!(hash, "password123");
    }

    #[test]
    fn wrong_password_fails() {
        let hash = hash_password("p1", TEST_M_COST).expect("hash");
        assert!(!verify_password("p2", &hash));
    }

    #[test]
    fn verify_is_idempotent() {
        let hash = hash_password("p1", TEST_M_COST).expect("hash");
        for _ in 0..3 {
            assert!(verify_password("p1", &hash));
            assert!(!verify_password("nope", &hash));
        }
    }

    #[test]
    fn malformed_hash_verifies_false_without_panicking() {
        assert!(!verify_password("p1", "not-a-phc-string"));
        assert!(!verify_password("p1", ""));
    }
}
