use crate::SaltmineError;

/// Length of the salt prefix keying the crypt primitive.
pub const SALT_LENGTH: usize = 2;

/// Length of the cipher text the primitive produces. The first
/// [`SALT_LENGTH`] characters repeat the salt.
pub const CIPHER_LENGTH: usize = 13;

/// A salt character is ASCII alphabetic, a digit, `.` or `/` (code points
/// 46..=57 plus the letters).
pub fn is_salt_char(c: char) -> bool {
    c.is_ascii_alphabetic() || matches!(c, '.' | '/' | '0'..='9')
}

/// A validated two-character salt. Parsing is the only constructor, so a
/// held `Salt` always satisfies the character-set constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Salt(String);

impl Salt {
    /// Validates `candidate` as a salt: exactly two characters, each from
    /// the salt alphabet.
    pub fn parse(candidate: &str) -> Option<Salt> {
        if candidate.chars().count() != SALT_LENGTH {
            return None;
        }
        if !candidate.chars().all(is_salt_char) {
            return None;
        }
        Some(Salt(candidate.to_string()))
    }

    /// Extracts the salt from the front of a cipher text, requiring the
    /// full [`CIPHER_LENGTH`] and a valid two-character prefix.
    pub fn from_cipher(cipher: &str) -> Option<Salt> {
        if cipher.len() != CIPHER_LENGTH {
            return None;
        }
        Salt::parse(&cipher.chars().take(SALT_LENGTH).collect::<String>())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The hash primitive seam: a pure, reentrant `H(word, salt) -> cipher`.
///
/// Sessions and crack workers only ever reach the primitive through this
/// trait, so tests can substitute a deterministic stand-in.
pub trait CryptEngine: Send + Sync {
    /// Hashes `word` under `salt`, producing a [`CIPHER_LENGTH`]-character
    /// cipher text whose first two characters repeat the salt.
    ///
    /// # Errors
    ///
    /// Returns [`SaltmineError::Crypt`] if the underlying primitive rejects
    /// the input; unreachable for a validated [`Salt`].
    fn hash(&self, word: &str, salt: &Salt) -> Result<String, SaltmineError>;
}

/// Production engine: the classic DES-based crypt(3).
#[derive(Debug, Default)]
pub struct DesCrypt;

impl CryptEngine for DesCrypt {
    fn hash(&self, word: &str, salt: &Salt) -> Result<String, SaltmineError> {
        pwhash::unix_crypt::hash_with(salt.as_str(), word)
            .map_err(|e| SaltmineError::Crypt(e.to_string()))
    }
}
