use validator::ValidationError;

use crate::error::{Error, Result};

pub const MAX_USER_ID_LEN: usize = 64;

/// Identifiers come from the SSO collaborator: printable ASCII, no spaces.
pub fn validate_user_id(user_id: &str) -> Result<()> {
    if user_id.is_empty() || user_id.len() > MAX_USER_ID_LEN {
        return Err(Error::Validation(format!(
            "User id must be between 1 and {} characters",
            MAX_USER_ID_LEN
        )));
    }
    if !user_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '@'))
    {
        return Err(Error::Validation(format!(
            "User id '{}' contains unsupported characters",
            user_id
        )));
    }
    Ok(())
}

pub fn option_label(value: &str) -> std::result::Result<(), ValidationError> {
    match value {
        "A" | "B" | "C" | "D" => Ok(()),
        _ => Err(ValidationError::new("option_label")),
    }
}
