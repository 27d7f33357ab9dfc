use rand::Rng;
use rand::distributions::Alphanumeric;
use regex::Regex;
use sha2::{Digest, Sha256};

/// Login identifiers are exactly ten numeric digits.
pub fn validate_mobile(mobile: &str) -> bool {
    let re = Regex::new(r"^\d{10}$").unwrap();
    re.is_match(mobile)
}

pub fn validate_email(email: &str) -> bool {
    let re = Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap();
    re.is_match(email)
}

/// Six-digit numeric login code. `thread_rng` is a CSPRNG, so codes are not
/// guessable from earlier ones.
pub fn generate_otp() -> String {
    let mut rng = rand::thread_rng();
    let otp: u32 = rng.gen_range(100000..=999999);
    otp.to_string()
}

/// Eight-character alphanumeric shared secret for returning-device logins.
pub fn generate_passkey() -> String {
    let rng = rand::thread_rng();
    rng.sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect()
}

/// Passkeys are stored and compared as hex SHA-256 digests, never plaintext.
pub fn hash_secret(secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mobile_must_be_exactly_ten_digits() {
        assert!(validate_mobile("9876543210"));
        assert!(validate_mobile("0123456789"));
        assert!(!validate_mobile("987654321"));
        assert!(!validate_mobile("98765432100"));
        assert!(!validate_mobile("98765a3210"));
        assert!(!validate_mobile("+919876543210"));
        assert!(!validate_mobile(""));
    }

    #[test]
    fn email_validation_accepts_common_shapes() {
        assert!(validate_email("ravi@example.com"));
        assert!(validate_email("ravi.kumar+jobs@mail.co.in"));
        assert!(!validate_email("ravi@"));
        assert!(!validate_email("not-an-email"));
    }

    #[test]
    fn generated_otp_is_six_numeric_digits() {
        for _ in 0..50 {
            let otp = generate_otp();
            assert_eq!(otp.len(), 6);
            assert!(otp.chars().all(|c| c.is_ascii_digit()));
            assert_ne!(otp.chars().next(), Some('0'));
        }
    }

    #[test]
    fn generated_passkey_is_eight_alphanumerics() {
        for _ in 0..20 {
            let key = generate_passkey();
            assert_eq!(key.len(), 8);
            assert!(key.chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }

    #[test]
    fn secret_hash_is_stable_and_hex_encoded() {
        let a = hash_secret("Xy12Ab34");
        let b = hash_secret("Xy12Ab34");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, hash_secret("Xy12Ab35"));
    }
}
