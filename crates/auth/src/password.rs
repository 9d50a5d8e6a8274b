//! Password verification for stored operator credentials.
//!
//! A stored `password_hash` value is accepted in one of three forms, tried
//! in this order:
//!
//! 1. A self-describing hash `$<algorithm>$<salt>$<digest>`, recomputed
//!    with the stated algorithm and salt. `sha256` digests are keyed
//!    HMAC-SHA256 hex; `argon2*` values are PHC strings verified through
//!    the `argon2` crate.
//! 2. A literal [`PLAINTEXT_MARKER`] prefix for intentionally unhashed
//!    test passwords; the remainder of the field is the plaintext.
//! 3. A configured allow-list of email/password pairs reserved for
//!    test and emergency access.
//!
//! A value starting with `$` is settled entirely by the hash branch. It
//! never falls through to the marker or allow-list checks, so a malformed
//! hash can only ever fail verification.

use argon2::password_hash::{PasswordHash, PasswordVerifier};
use argon2::Argon2;
use hmac::{Hmac, Mac};
use rand::distr::Alphanumeric;
use rand::Rng;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Prefix marking an intentionally unhashed test password.
pub const PLAINTEXT_MARKER: &str = "plaintext:";

/// Length of the random salt embedded in generated hashes.
const SALT_LENGTH: usize = 16;

// ---------------------------------------------------------------------------
// Verification
// ---------------------------------------------------------------------------

/// Check a candidate password against the stored `password_hash` value.
///
/// `email` is only consulted by the allow-list branch, where it is matched
/// case-insensitively against the configured pairs.
pub fn verify_password(
    password: &str,
    stored: &str,
    email: &str,
    allow_list: &[(String, String)],
) -> bool {
    if stored.starts_with('$') {
        return verify_hash(password, stored);
    }
    if let Some(expected) = stored.strip_prefix(PLAINTEXT_MARKER) {
        return expected == password;
    }
    allow_list.iter().any(|(allowed_email, allowed_password)| {
        allowed_email.eq_ignore_ascii_case(email) && allowed_password == password
    })
}

/// Verify a self-describing `$...` hash. Malformed values fail closed.
fn verify_hash(password: &str, stored: &str) -> bool {
    if stored.starts_with("$argon2") {
        let Ok(parsed) = PasswordHash::new(stored) else {
            return false;
        };
        return Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok();
    }

    let parts: Vec<&str> = stored.split('$').collect();
    if parts.len() != 4 || parts[1] != "sha256" {
        return false;
    }
    sha256_digest(parts[2], password) == parts[3]
}

// ---------------------------------------------------------------------------
// Hash generation
// ---------------------------------------------------------------------------

/// Hash a password into the self-describing `$sha256$<salt>$<digest>` form
/// with a fresh random salt.
pub fn hash_password(password: &str) -> String {
    let salt: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(SALT_LENGTH)
        .map(char::from)
        .collect();
    let digest = sha256_digest(&salt, password);
    format!("$sha256${salt}${digest}")
}

/// Lowercase-hex HMAC-SHA256 of the password, keyed by the salt.
fn sha256_digest(salt: &str, password: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(salt.as_bytes()).expect("HMAC accepts any key length");
    mac.update(password.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

mod hex {
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        bytes.as_ref().iter().map(|b| format!("{b:02x}")).collect()
    }
}
