//! Admin identity validation

use arrayvec::ArrayString;
use thiserror::Error;

/// Longest identity the ledger schema accepts.
pub const MAX_IDENTITY_LEN: usize = 32;

/// Validated admin identity (SteamID64), stored inline (no heap allocation).
pub type AdminId = ArrayString<MAX_IDENTITY_LEN>;

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Identity cannot be empty")]
    IdentityEmpty,

    #[error("Identity too long (max 32 characters, got {0})")]
    IdentityTooLong(usize),

    #[error("Identity must be numeric")]
    IdentityNotNumeric,
}

/// Validates an external identity and converts it to an [`AdminId`]
///
/// Rules:
/// - Cannot be empty
/// - Max 32 characters
/// - Only ASCII digits
pub fn parse_admin_id(identity: &str) -> Result<AdminId, ValidationError> {
    if identity.is_empty() {
        return Err(ValidationError::IdentityEmpty);
    }

    if identity.len() > MAX_IDENTITY_LEN {
        return Err(ValidationError::IdentityTooLong(identity.len()));
    }

    if !identity.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::IdentityNotNumeric);
    }

    AdminId::from(identity).map_err(|_| ValidationError::IdentityTooLong(identity.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_steam_id() {
        let id = parse_admin_id("76561198000000001").unwrap();
        assert_eq!(id.as_str(), "76561198000000001");
    }

    #[test]
    fn test_empty_identity() {
        assert_eq!(parse_admin_id(""), Err(ValidationError::IdentityEmpty));
    }

    #[test]
    fn test_identity_too_long() {
        let long = "1".repeat(33);
        assert_eq!(
            parse_admin_id(&long),
            Err(ValidationError::IdentityTooLong(33))
        );
        assert!(parse_admin_id(&"1".repeat(32)).is_ok());
    }

    #[test]
    fn test_non_numeric_identity() {
        assert_eq!(
            parse_admin_id("STEAM_0:1:12345"),
            Err(ValidationError::IdentityNotNumeric)
        );
        assert_eq!(
            parse_admin_id("BOT"),
            Err(ValidationError::IdentityNotNumeric)
        );
        assert_eq!(
            parse_admin_id(" 7656"),
            Err(ValidationError::IdentityNotNumeric)
        );
    }
}
