use std::borrow::Cow;

use validator::ValidationError;

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::from(message));
    error
}

pub fn validate_required(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(error("is_required", "This field is required"))
    } else {
        Ok(())
    }
}

/// `#rrggbb` colour used by tags.
pub fn validate_hex_color(value: &str) -> Result<(), ValidationError> {
    let valid = value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit());
    if valid {
        Ok(())
    } else {
        Err(error("invalid_color", "Color must look like #1a2b3c"))
    }
}

/// Lowercase letters, digits and single hyphens.
pub fn validate_slug(value: &str) -> Result<(), ValidationError> {
    let valid = !value.is_empty()
        && !value.starts_with('-')
        && !value.ends_with('-')
        && !value.contains("--")
        && value
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if valid {
        Ok(())
    } else {
        Err(error(
            "invalid_slug",
            "Slug may only contain lowercase letters, digits and hyphens",
        ))
    }
}

pub fn validate_username(value: &str) -> Result<(), ValidationError> {
    let valid = value
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | '-' | '@' | '+'));
    if valid && !value.trim().is_empty() {
        Ok(())
    } else {
        Err(error(
            "invalid_username",
            "Username may only contain letters, digits and @/./+/-/_",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_rejects_whitespace() {
        assert!(validate_required("   ").is_err());
        assert!(validate_required("x").is_ok());
    }

    #[test]
    fn hex_color() {
        assert!(validate_hex_color("#007bff").is_ok());
        assert!(validate_hex_color("007bff").is_err());
        assert!(validate_hex_color("#xyz123").is_err());
    }

    #[test]
    fn slug_shape() {
        assert!(validate_slug("hello-world-2").is_ok());
        assert!(validate_slug("Hello").is_err());
        assert!(validate_slug("a--b").is_err());
        assert!(validate_slug("-a").is_err());
    }

    #[test]
    fn username_charset() {
        assert!(validate_username("jane.doe_99").is_ok());
        assert!(validate_username("jane doe").is_err());
    }
}
