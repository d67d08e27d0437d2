//! Opaque tokens used in public verification links.

use std::fmt;

use rand::RngCore;
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const TOKEN_BYTES: usize = 16;

/// Length of the hex-encoded token.
pub const TOKEN_LENGTH: usize = TOKEN_BYTES * 2;

/// Errors raised when parsing a token supplied by a caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerificationTokenError {
    #[error("verification token must be {TOKEN_LENGTH} characters")]
    Length,
    #[error("verification token must be hexadecimal")]
    NotHex,
}

/// 128-bit random token, hex encoded to 32 lowercase characters.
///
/// Tokens are never derived from certificate content and never regenerated.
///
/// # Examples
/// ```
/// use achievement_ledger::domain::VerificationToken;
///
/// let token = VerificationToken::generate();
/// assert_eq!(token.as_str().len(), 32);
/// assert!(VerificationToken::parse("not-a-token").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VerificationToken(String);

impl VerificationToken {
    /// Generate a token from the operating system RNG.
    pub fn generate() -> Self {
        Self::generate_with(&mut OsRng)
    }

    /// Generate a token from the supplied RNG.
    pub fn generate_with<R: RngCore + ?Sized>(rng: &mut R) -> Self {
        let mut bytes = [0_u8; TOKEN_BYTES];
        rng.fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    /// Parse a token from an untrusted source, normalising to lowercase.
    pub fn parse(raw: &str) -> Result<Self, VerificationTokenError> {
        if raw.len() != TOKEN_LENGTH {
            return Err(VerificationTokenError::Length);
        }
        if !raw.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(VerificationTokenError::NotHex);
        }
        Ok(Self(raw.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for VerificationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<VerificationToken> for String {
    fn from(value: VerificationToken) -> Self {
        value.0
    }
}

impl TryFrom<String> for VerificationToken {
    type Error = VerificationTokenError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}
