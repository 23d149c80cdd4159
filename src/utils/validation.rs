use crate::utils::error::{HelperError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

const DATABASE_SCHEMES: &[&str] = &["mysql", "sqlite"];

pub fn validate_database_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(HelperError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: String::new(),
            reason: "Database URL cannot be empty".to_string(),
        });
    }

    // Never echo the URL back, it usually carries a password.
    match Url::parse(url_str) {
        Ok(url) if DATABASE_SCHEMES.contains(&url.scheme()) => Ok(()),
        Ok(url) => Err(HelperError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: format!("{}://…", url.scheme()),
            reason: format!(
                "Unsupported database scheme. Supported schemes: {}",
                DATABASE_SCHEMES.join(", ")
            ),
        }),
        Err(e) => Err(HelperError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: "<redacted>".to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_parameter_name(field_name: &str, name: &str) -> Result<()> {
    validate_non_empty_string(field_name, name)?;

    if name.len() > 2048 {
        return Err(HelperError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: name.to_string(),
            reason: "Parameter name cannot exceed 2048 characters".to_string(),
        });
    }

    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-' | '/'))
    {
        return Err(HelperError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: name.to_string(),
            reason: "Parameter name can only contain letters, numbers, and _ . - /".to_string(),
        });
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(HelperError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(HelperError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}
