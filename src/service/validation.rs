use crate::error::{Error, Result};

pub const MAX_GROUP_NAME_LEN: usize = 100;
pub const MAX_PAGE_TITLE_LEN: usize = 200;
pub const MAX_DESCRIPTION_LEN: usize = 500;
pub const MAX_EMAIL_LEN: usize = 254;

pub const MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024;
pub const MAX_IMAGE_SIZE: usize = 5 * 1024 * 1024;

const ALLOWED_UPLOAD_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "application/pdf",
    "text/plain",
    "application/json",
];

const ALLOWED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Trims `value` and checks it holds between 1 and `max_len` characters.
pub fn required_text(value: &str, field: &str, max_len: usize) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::validation(format!("{field} is required")));
    }
    if trimmed.chars().count() > max_len {
        return Err(Error::validation(format!(
            "{field} cannot exceed {max_len} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Trims `value`; blank becomes `None`.
pub fn optional_text(value: Option<&str>, field: &str, max_len: usize) -> Result<Option<String>> {
    let Some(trimmed) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    if trimmed.chars().count() > max_len {
        return Err(Error::validation(format!(
            "{field} cannot exceed {max_len} characters"
        )));
    }
    Ok(Some(trimmed.to_string()))
}

/// Normalizes an optional reference (id or URL): trimmed, blank is `None`.
#[must_use]
pub fn optional_ref(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

pub fn optional_email(value: Option<&str>) -> Result<Option<String>> {
    let Some(email) = optional_ref(value) else {
        return Ok(None);
    };
    if email.len() > MAX_EMAIL_LEN || !email.contains('@') || email.chars().any(char::is_whitespace)
    {
        return Err(Error::validation("Email address is not valid"));
    }
    Ok(Some(email))
}

fn mime_essence(mime_type: &str) -> String {
    mime_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

pub fn validate_upload(size: usize, mime_type: &str) -> Result<()> {
    if size == 0 {
        return Err(Error::validation("No file provided"));
    }
    if size > MAX_UPLOAD_SIZE {
        return Err(Error::validation("File size must be under 10MB"));
    }

    let essence = mime_essence(mime_type);
    if !ALLOWED_UPLOAD_TYPES.contains(&essence.as_str()) && !essence.starts_with("text/") {
        return Err(Error::validation(format!(
            "Allowed types: images, PDF, text/JSON. Got: {mime_type}"
        )));
    }
    Ok(())
}

pub fn validate_image(size: usize, mime_type: &str) -> Result<()> {
    if size == 0 {
        return Err(Error::validation("No file provided"));
    }
    if size > MAX_IMAGE_SIZE {
        return Err(Error::validation("Image size must be under 5MB"));
    }

    let essence = mime_essence(mime_type);
    if !ALLOWED_IMAGE_TYPES.contains(&essence.as_str()) {
        return Err(Error::validation(format!(
            "Allowed image types: JPEG, PNG, GIF, WebP. Got: {mime_type}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text() {
        assert_eq!(required_text("  Eng ", "Name", 100).unwrap(), "Eng");
        assert!(matches!(
            required_text("   ", "Name", 100),
            Err(Error::Validation(msg)) if msg == "Name is required"
        ));
        assert!(required_text(&"x".repeat(100), "Name", 100).is_ok());
        assert!(required_text(&"x".repeat(101), "Name", 100).is_err());
        // Counted in characters, not bytes.
        assert!(required_text(&"é".repeat(100), "Name", 100).is_ok());
    }

    #[test]
    fn test_optional_text() {
        assert_eq!(optional_text(None, "Description", 500).unwrap(), None);
        assert_eq!(optional_text(Some("  "), "Description", 500).unwrap(), None);
        assert_eq!(
            optional_text(Some(" hi "), "Description", 500).unwrap().as_deref(),
            Some("hi")
        );
        assert!(optional_text(Some(&"x".repeat(501)), "Description", 500).is_err());
    }

    #[test]
    fn test_optional_email() {
        assert_eq!(optional_email(Some("")).unwrap(), None);
        assert_eq!(
            optional_email(Some(" a@b.co ")).unwrap().as_deref(),
            Some("a@b.co")
        );
        assert!(optional_email(Some("nope")).is_err());
        assert!(optional_email(Some("a b@c.d")).is_err());
    }

    #[test]
    fn test_validate_upload() {
        assert!(validate_upload(2 * 1024 * 1024, "application/pdf").is_ok());
        assert!(validate_upload(10, "text/markdown").is_ok());
        assert!(validate_upload(10, "text/plain; charset=utf-8").is_ok());
        assert!(validate_upload(MAX_UPLOAD_SIZE, "image/png").is_ok());
        assert!(validate_upload(MAX_UPLOAD_SIZE + 1, "image/png").is_err());
        assert!(validate_upload(0, "image/png").is_err());
        assert!(validate_upload(10, "application/zip").is_err());
    }

    #[test]
    fn test_validate_image() {
        assert!(validate_image(10, "image/webp").is_ok());
        assert!(validate_image(MAX_IMAGE_SIZE + 1, "image/png").is_err());
        assert!(validate_image(10, "application/pdf").is_err());
        assert!(validate_image(10, "image/svg+xml").is_err());
    }
}
