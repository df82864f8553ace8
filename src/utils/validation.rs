use crate::utils::error::{Result, TollError};
use regex::Regex;
use std::sync::OnceLock;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(TollError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(TollError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(TollError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_positive_number(field_name: &str, value: u64, min_value: u64) -> Result<()> {
    if value < min_value {
        return Err(TollError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(TollError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_non_empty_list(field_name: &str, values: &[String]) -> Result<()> {
    if values.is_empty() {
        return Err(TollError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: "[]".to_string(),
            reason: "List must contain at least one entry".to_string(),
        });
    }
    for value in values {
        validate_non_empty_string(field_name, value)?;
    }
    Ok(())
}

fn cell_reference_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Z]{1,3}[1-9][0-9]*$").expect("valid cell reference regex"))
}

/// A1-style reference such as `K5`; absolute (`$K$5`) and sheet-qualified forms are rejected.
pub fn validate_cell_reference(field_name: &str, reference: &str) -> Result<()> {
    if !cell_reference_re().is_match(reference) {
        return Err(TollError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: reference.to_string(),
            reason: "Expected an A1-style cell reference like K5".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("portal.login_url", "https://example.com").is_ok());
        assert!(validate_url("portal.login_url", "http://example.com").is_ok());
        assert!(validate_url("portal.login_url", "").is_err());
        assert!(validate_url("portal.login_url", "invalid-url").is_err());
        assert!(validate_url("portal.login_url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("portal.timeout_seconds", 30, 1).is_ok());
        assert!(validate_positive_number("portal.timeout_seconds", 0, 1).is_err());
    }

    #[test]
    fn test_validate_cell_reference() {
        assert!(validate_cell_reference("expense_report.start_date_cell", "K5").is_ok());
        assert!(validate_cell_reference("expense_report.total_cell", "AB120").is_ok());
        assert!(validate_cell_reference("expense_report.total_cell", "k5").is_err());
        assert!(validate_cell_reference("expense_report.total_cell", "F0").is_err());
        assert!(validate_cell_reference("expense_report.total_cell", "$F$10").is_err());
    }

    #[test]
    fn test_validate_non_empty_list() {
        assert!(validate_non_empty_list("extract.allowed_headers", &["Amount".to_string()]).is_ok());
        assert!(validate_non_empty_list("extract.allowed_headers", &[]).is_err());
        assert!(validate_non_empty_list("extract.allowed_headers", &[" ".to_string()]).is_err());
    }
}
