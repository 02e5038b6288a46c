//! Argon2id password hashes and random password generation.

use super::AuthError;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::seq::SliceRandom;
use rand::{Rng, RngCore};

const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &[u8] = b"0123456789";
const SPECIALS: &[u8] = b"!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

/// Hashes `password` with Argon2id and a fresh 16-byte salt.
///
/// The result is a PHC string (`$argon2id$v=19$...`) carrying its own parameters and salt.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let mut salt = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut salt);
    let salt = SaltString::encode_b64(&salt).map_err(|e| AuthError::Hashing(e.to_string()))?;
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hashing(e.to_string()))
}

/// Checks `password` against a PHC string produced by [`hash_password`].
///
/// The digest comparison inside `verify_password` is constant-time. A stored value that does not
/// parse never matches.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Random password of `length` letters, optionally mixed with digits and special characters.
///
/// Each requested class appears at least once, so the result is longer than `length` only when
/// `length` is smaller than the number of classes.
pub fn generate_password(length: usize, with_special: bool, with_digits: bool) -> String {
    let mut rng = rand::thread_rng();
    let mut pool = LETTERS.to_vec();
    let mut password = Vec::with_capacity(length);

    for (wanted, class) in [(with_special, SPECIALS), (with_digits, DIGITS)] {
        if wanted {
            pool.extend_from_slice(class);
            password.push(class[rng.gen_range(0..class.len())]);
        }
    }
    while password.len() < length {
        password.push(pool[rng.gen_range(0..pool.len())]);
    }
    password.shuffle(&mut rng);

    password.into_iter().map(char::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_round_trip_and_salt() {
        let first = hash_password("s3cret").unwrap();
        let second = hash_password("s3cret").unwrap();
        assert_ne!(first, second);
        assert!(first.starts_with("$argon2id$"));
        assert!(verify_password("s3cret", &first));
        assert!(verify_password("s3cret", &second));
        assert!(!verify_password("S3cret", &first));
        assert!(!verify_password("s3cret", "garbage"));
        assert!(!verify_password("s3cret", ""));
    }

    #[test]
    fn test_generated_password_has_requested_classes() {
        for _ in 0..50 {
            let password = generate_password(12, true, true);
            assert_eq!(password.len(), 12);
            assert!(password.bytes().any(|b| DIGITS.contains(&b)));
            assert!(password.bytes().any(|b| SPECIALS.contains(&b)));
        }
        let letters_only = generate_password(8, false, false);
        assert!(letters_only.bytes().all(|b| LETTERS.contains(&b)));
    }

    #[test]
    fn test_short_length_still_covers_classes() {
        let password = generate_password(1, true, true);
        assert_eq!(password.len(), 2);
    }
}
