//! Session identity.

use crate::error::ValidationError;

/// Minimum display name length, in characters, after trimming.
pub const MIN_NAME_LEN: usize = 2;

/// Maximum display name length, in characters, after trimming.
pub const MAX_NAME_LEN: usize = 32;

/// Who we are for the lifetime of one session.
///
/// Created at join time and never mutated. The controller drops it on leave,
/// rejection or transport loss, so a new join always starts from fresh input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    name: String,
    password: Option<String>,
}

impl Identity {
    /// Validate and build an identity.
    ///
    /// The name is trimmed. An empty password is treated as no password;
    /// non-empty passwords are kept byte for byte.
    pub fn new(name: &str, password: Option<&str>) -> Result<Self, ValidationError> {
        let name = validate_name(name)?;
        let password = password.filter(|p| !p.is_empty()).map(str::to_owned);
        Ok(Self { name: name.to_owned(), password })
    }

    /// Trimmed display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Password, if one was given.
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }
}

/// Trim `name` and check it against the length limits.
pub fn validate_name(name: &str) -> Result<&str, ValidationError> {
    let trimmed = name.trim();
    let len = trimmed.chars().count();

    if len == 0 {
        return Err(ValidationError::Empty);
    }
    if len < MIN_NAME_LEN {
        return Err(ValidationError::TooShort { len, min: MIN_NAME_LEN });
    }
    if len > MAX_NAME_LEN {
        return Err(ValidationError::TooLong { len, max: MAX_NAME_LEN });
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_name() {
        let identity = Identity::new("  Al  ", None).unwrap();
        assert_eq!(identity.name(), "Al");
    }

    #[test]
    fn rejects_blank_and_short_names() {
        assert_eq!(Identity::new("", None), Err(ValidationError::Empty));
        assert_eq!(Identity::new("   ", None), Err(ValidationError::Empty));
        assert_eq!(
            Identity::new(" A ", None),
            Err(ValidationError::TooShort { len: 1, min: MIN_NAME_LEN })
        );
    }

    #[test]
    fn rejects_long_names() {
        let name = "x".repeat(MAX_NAME_LEN + 1);
        assert_eq!(
            Identity::new(&name, None),
            Err(ValidationError::TooLong { len: MAX_NAME_LEN + 1, max: MAX_NAME_LEN })
        );
    }

    #[test]
    fn counts_characters_not_bytes() {
        // Two characters, four bytes
        assert!(Identity::new("éé", None).is_ok());
        // One character, two bytes
        assert!(Identity::new("é", None).is_err());
    }

    #[test]
    fn empty_password_is_absent() {
        let identity = Identity::new("Al", Some("")).unwrap();
        assert_eq!(identity.password(), None);

        let identity = Identity::new("Al", Some(" pw ")).unwrap();
        assert_eq!(identity.password(), Some(" pw "));
    }
}
