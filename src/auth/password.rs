use bcrypt::{DEFAULT_COST, hash, verify};

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    HashingFailed(bcrypt::BcryptError),
    #[error("Password verification failed: {0}")]
    VerificationFailed(bcrypt::BcryptError),
}

pub const MIN_PASSWORD_LENGTH: usize = 8;

pub struct PasswordManager;

impl PasswordManager {
    pub fn hash(password: &str) -> Result<String, PasswordError> {
        hash(password, DEFAULT_COST).map_err(PasswordError::HashingFailed)
    }

    pub fn verify(password: &str, hash: &str) -> Result<bool, PasswordError> {
        verify(password, hash).map_err(PasswordError::VerificationFailed)
    }

    /// Au moins 8 caractères avec majuscule, minuscule et chiffre
    pub fn is_strong(password: &str) -> bool {
        if password.chars().count() < MIN_PASSWORD_LENGTH {
            return false;
        }
        let (mut upper, mut lower, mut digit) = (false, false, false);
        for c in password.chars() {
            upper |= c.is_uppercase();
            lower |= c.is_lowercase();
            digit |= c.is_ascii_digit();
        }
        upper && lower && digit
    }
}

#[cfg(test)]
mod tests {
    use super::PasswordManager;

    #[test]
    fn verify_returns_true_when_password_matches() {
        let password = "secure_password_@123P";
        let hashed = PasswordManager::hash(password).expect("Hashing failed");

        assert!(PasswordManager::verify(password, &hashed).expect("Verification failed"));
        assert!(!PasswordManager::verify("secure_password_@123p", &hashed).unwrap());
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert!(PasswordManager::verify("whatever", "not-a-bcrypt-hash").is_err());
    }

    #[test]
    fn strength_requires_length_and_character_classes() {
        assert!(PasswordManager::is_strong("Travel2026"));
        assert!(!PasswordManager::is_strong("Tr4vel"));
        assert!(!PasswordManager::is_strong("travel2026"));
        assert!(!PasswordManager::is_strong("TRAVEL2026"));
        assert!(!PasswordManager::is_strong("TravelTravel"));
    }
}
