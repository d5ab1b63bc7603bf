//! Customer contact values collected by every order form.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors produced when validating contact fields.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ContactError {
    #[error("value is required")]
    Missing,
    #[error("value must have at least {min} characters")]
    TooShort { min: usize },
    #[error("value must have at most {max} characters")]
    TooLong { max: usize },
    #[error("phone number may only contain digits, spaces and + ( ) -")]
    InvalidPhoneCharacters,
}

/// Customer's full name, trimmed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct CustomerName(String);

impl CustomerName {
    pub const MIN_LENGTH: usize = 2;
    pub const MAX_LENGTH: usize = 255;

    /// # Errors
    ///
    /// Returns [`ContactError`] if the trimmed name is empty or out of bounds.
    pub fn parse(s: &str) -> Result<Self, ContactError> {
        let s = s.trim();
        let len = s.chars().count();
        if len == 0 {
            return Err(ContactError::Missing);
        }
        if len < Self::MIN_LENGTH {
            return Err(ContactError::TooShort {
                min: Self::MIN_LENGTH,
            });
        }
        if len > Self::MAX_LENGTH {
            return Err(ContactError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        Ok(Self(s.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CustomerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Phone number as entered by the customer.
///
/// Formatting is preserved (`+420 777 123 456` stays as is); only the
/// character set and the length are checked.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Phone(String);

impl Phone {
    pub const MIN_LENGTH: usize = 9;
    pub const MAX_LENGTH: usize = 50;

    /// # Errors
    ///
    /// Returns [`ContactError`] for blank, too short/long input or for
    /// characters outside `0-9 + ( ) -` and spaces.
    pub fn parse(s: &str) -> Result<Self, ContactError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ContactError::Missing);
        }
        if s.len() < Self::MIN_LENGTH {
            return Err(ContactError::TooShort {
                min: Self::MIN_LENGTH,
            });
        }
        if s.len() > Self::MAX_LENGTH {
            return Err(ContactError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        if !s
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | ' ' | '(' | ')' | '-'))
        {
            return Err(ContactError::InvalidPhoneCharacters);
        }
        Ok(Self(s.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_is_trimmed() {
        assert_eq!(
            CustomerName::parse("  Jana Nováková ").map(|n| n.as_str().to_owned()),
            Ok("Jana Nováková".to_owned())
        );
    }

    #[test]
    fn test_name_length_counts_characters() {
        assert_eq!(CustomerName::parse(""), Err(ContactError::Missing));
        assert_eq!(
            CustomerName::parse("J"),
            Err(ContactError::TooShort { min: 2 })
        );
        // Two characters, four bytes
        assert!(CustomerName::parse("Ťá").is_ok());
    }

    #[test]
    fn test_phone_accepts_common_formats() {
        assert!(Phone::parse("777123456").is_ok());
        assert!(Phone::parse("+420 777 123 456").is_ok());
        assert!(Phone::parse("(+420) 777-123-456").is_ok());
    }

    #[test]
    fn test_phone_rejections() {
        assert_eq!(Phone::parse(" "), Err(ContactError::Missing));
        assert_eq!(Phone::parse("12345"), Err(ContactError::TooShort { min: 9 }));
        assert_eq!(
            Phone::parse("777 123 45x"),
            Err(ContactError::InvalidPhoneCharacters)
        );
    }
}
