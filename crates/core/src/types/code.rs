//! Guest check-in code type.
//!
//! Every guest is issued a short code at registration time. The code is the
//! payload of the guest's QR symbol and the token staff enter for manual
//! verification, so it lives here in core where both the server and the CLI
//! seeder can use it.

use core::fmt;

use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Errors that can occur when parsing a [`CheckInCode`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CodeError {
    /// The input is not exactly [`CheckInCode::LENGTH`] characters.
    #[error("code must be exactly {expected} characters (got {got})")]
    WrongLength {
        /// Required length.
        expected: usize,
        /// Length of the input.
        got: usize,
    },
    /// The input contains a character outside `A-Z0-9`.
    #[error("code may only contain A-Z and 0-9 (found {found:?})")]
    InvalidCharacter {
        /// The offending character.
        found: char,
    },
}

/// A guest's unique check-in code.
///
/// Four characters drawn from `A-Z0-9` (36 symbols, ~1.68M combinations).
/// Uniqueness across guests is enforced by the database, not by this type.
///
/// Parsing uppercases ASCII lowercase input so manually typed codes match
/// regardless of how the entry field was typed, but any other character is
/// rejected:
///
/// ```
/// use gatecheck_core::CheckInCode;
///
/// let code: CheckInCode = "7k2q".parse().unwrap();
/// assert_eq!(code.as_str(), "7K2Q");
/// assert!("7K2".parse::<CheckInCode>().is_err());
/// assert!("7K2!".parse::<CheckInCode>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CheckInCode([u8; Self::LENGTH]);

/// Alphabet codes are drawn from, uniformly.
const ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

impl CheckInCode {
    /// Number of characters in a code.
    pub const LENGTH: usize = 4;

    /// Generate a random code using the given RNG.
    ///
    /// Each character is drawn independently and uniformly from `A-Z0-9`.
    /// No collision check is performed here; the guest repository retries
    /// on a unique-constraint conflict instead.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut bytes = [0u8; Self::LENGTH];
        for b in &mut bytes {
            let idx = rng.random_range(0..ALPHABET.len());
            *b = ALPHABET[idx];
        }
        Self(bytes)
    }

    /// Parse a code from user input.
    ///
    /// ASCII lowercase letters are uppercased; anything else outside the
    /// alphabet is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`CodeError::WrongLength`] or [`CodeError::InvalidCharacter`].
    pub fn parse(s: &str) -> Result<Self, CodeError> {
        let got = s.chars().count();
        if got != Self::LENGTH {
            return Err(CodeError::WrongLength {
                expected: Self::LENGTH,
                got,
            });
        }

        let mut bytes = [0u8; Self::LENGTH];
        for (slot, c) in bytes.iter_mut().zip(s.chars()) {
            let upper = c.to_ascii_uppercase();
            if !upper.is_ascii_uppercase() && !upper.is_ascii_digit() {
                return Err(CodeError::InvalidCharacter { found: c });
            }
            *slot = upper as u8;
        }

        Ok(Self(bytes))
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        // Invariant: bytes are always ASCII from the alphabet
        std::str::from_utf8(&self.0).unwrap_or("????")
    }
}

impl fmt::Display for CheckInCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CheckInCode {
    type Err = CodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for CheckInCode {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Serialize for CheckInCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for CheckInCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for CheckInCode {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for CheckInCode {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::parse(&s)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for CheckInCode {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <&str as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.as_str(), buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_alphabet_and_length() {
        let mut rng = rand::rng();
        for _ in 0..1000 {
            let code = CheckInCode::generate(&mut rng);
            assert_eq!(code.as_str().len(), CheckInCode::LENGTH);
            assert!(
                code.as_str()
                    .chars()
                    .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
            );
        }
    }

    #[test]
    fn test_parse_uppercases_input() {
        let code = CheckInCode::parse("7k2q").unwrap();
        assert_eq!(code.as_str(), "7K2Q");
        assert_eq!(code, CheckInCode::parse("7K2Q").unwrap());
    }

    #[test]
    fn test_parse_wrong_length() {
        assert_eq!(
            CheckInCode::parse("ABC"),
            Err(CodeError::WrongLength {
                expected: 4,
                got: 3
            })
        );
        assert!(CheckInCode::parse("ABCDE").is_err());
        assert!(CheckInCode::parse("").is_err());
    }

    #[test]
    fn test_parse_invalid_character() {
        assert_eq!(
            CheckInCode::parse("AB-1"),
            Err(CodeError::InvalidCharacter { found: '-' })
        );
        assert!(CheckInCode::parse("AB 1").is_err());
        assert!(CheckInCode::parse("ÅBCD").is_err());
    }

    #[test]
    fn test_display_roundtrip() {
        let code = CheckInCode::parse("X9Y0").unwrap();
        assert_eq!(code.to_string(), "X9Y0");
        assert_eq!(code.to_string().parse::<CheckInCode>().unwrap(), code);
    }

    #[test]
    fn test_serde() {
        let code = CheckInCode::parse("7K2Q").unwrap();
        let json = serde_json::to_string(&code).unwrap();
        assert_eq!(json, "\"7K2Q\"");
        let parsed: CheckInCode = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, code);
        assert!(serde_json::from_str::<CheckInCode>("\"nope!\"").is_err());
    }
}
