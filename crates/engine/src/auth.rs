//! Password hashing.
//!
//! Hashes are stored as `pbkdf2-sha256$<iterations>$<salt>$<digest>` with
//! base64-encoded salt and digest, so the iteration count can be raised
//! later without invalidating existing records.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use sha2::Sha256;

const SCHEME: &str = "pbkdf2-sha256";
const ITERATIONS: u32 = 100_000;
const SALT_LEN: usize = 16;
const DIGEST_LEN: usize = 32;

pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; SALT_LEN];
    rand::rngs::OsRng.fill_bytes(&mut salt);
    let digest = derive(password, &salt, ITERATIONS);
    format!(
        "{SCHEME}${ITERATIONS}${}${}",
        BASE64.encode(salt),
        BASE64.encode(digest)
    )
}

/// Check `password` against a stored hash. Malformed hashes verify as false.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let mut parts = stored.split('$');
    let (Some(scheme), Some(iterations), Some(salt), Some(digest)) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    if scheme != SCHEME || parts.next().is_some() {
        return false;
    }
    let Ok(iterations) = iterations.parse::<u32>() else {
        return false;
    };
    let (Ok(salt), Ok(expected)) = (BASE64.decode(salt), BASE64.decode(digest)) else {
        return false;
    };
    let actual = derive(password, &salt, iterations);
    // Fold the comparison over every byte to keep it constant-time.
    expected.len() == actual.len()
        && expected
            .iter()
            .zip(actual.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}

fn derive(password: &str, salt: &[u8], iterations: u32) -> [u8; DIGEST_LEN] {
    let mut digest = [0u8; DIGEST_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut digest);
    digest
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_password() {
        let hash = hash_password("hunter2");
        assert!(hash.starts_with("pbkdf2-sha256$100000$"));
        assert!(verify_password("hunter2", &hash));
        assert!(!verify_password("hunter3", &hash));
    }

    #[test]
    fn salts_differ_between_hashes() {
        assert_ne!(hash_password("same"), hash_password("same"));
    }

    #[test]
    fn rejects_malformed_hashes() {
        assert!(!verify_password("pw", "plaintext"));
        assert!(!verify_password("pw", "md5$1$abc$def"));
        assert!(!verify_password("pw", "pbkdf2-sha256$x$!!$!!"));
    }
}
