use entity::{DESCRIPTION_LEN, SHORT_TEXT_LEN};

use crate::{DirectoryError, DirectoryResult};

/// Trimmed, lowercased email. Lookups and uniqueness use this form.
pub(crate) fn normalize_email(value: &str) -> DirectoryResult<String> {
    let normalized = value.trim().to_lowercase();
    if normalized.is_empty() || !normalized.contains('@') {
        return Err(DirectoryError::InvalidInput("invalid email address".into()));
    }
    check_len("email", &normalized, SHORT_TEXT_LEN)?;
    Ok(normalized)
}

pub(crate) fn required_text(field: &str, value: &str) -> DirectoryResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DirectoryError::InvalidInput(format!("{field} is required")));
    }
    check_len(field, trimmed, SHORT_TEXT_LEN)?;
    Ok(trimmed.to_string())
}

/// Usernames share the login namespace with emails, so `@` is reserved.
pub(crate) fn username(value: &str) -> DirectoryResult<String> {
    let username = required_text("username", value)?;
    if username.contains('@') {
        return Err(DirectoryError::InvalidInput(
            "username must not contain '@'".into(),
        ));
    }
    Ok(username)
}

/// Blank descriptions are stored as NULL.
pub(crate) fn description(value: Option<&str>) -> DirectoryResult<Option<String>> {
    let Some(trimmed) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    check_len("description", trimmed, DESCRIPTION_LEN)?;
    Ok(Some(trimmed.to_string()))
}

fn check_len(field: &str, value: &str, max: usize) -> DirectoryResult<()> {
    if value.chars().count() > max {
        return Err(DirectoryError::InvalidInput(format!(
            "{field} must be <= {max} characters"
        )));
    }
    Ok(())
}
