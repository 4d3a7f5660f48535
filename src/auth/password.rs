use super::AuthError;

/// bcrypt hashing with a configurable work factor.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn hash(&self, password: &str) -> Result<String, AuthError> {
        bcrypt::hash(password, self.cost).map_err(AuthError::Hash)
    }

    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        bcrypt::verify(password, hash).map_err(AuthError::Hash)
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

/// Require at least eight characters, including a letter and a digit.
pub fn check_strength(password: &str) -> Result<(), &'static str> {
    if password.chars().count() < 8 {
        return Err("Password must be at least 8 characters long");
    }

    let has_letter = password.chars().any(char::is_alphabetic);
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if !has_letter || !has_digit {
        return Err("Password must contain at least one letter and one number");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_verifies_only_original_password() {
        let hasher = PasswordHasher::new(4);
        let hash = hasher.hash("hunter22").unwrap();

        assert!(hasher.verify("hunter22", &hash).unwrap());
        assert!(!hasher.verify("hunter23", &hash).unwrap());
    }

    #[test]
    fn strength_rules() {
        assert!(check_strength("abc12345").is_ok());
        assert!(check_strength("abc123").is_err());
        assert!(check_strength("abcdefgh").is_err());
        assert!(check_strength("12345678").is_err());
    }
}
