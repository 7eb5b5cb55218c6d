use crate::utils::error::{HeroError, Result};
use std::fmt::Display;
use std::path::Path;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field: &str, value: impl Display, reason: impl Into<String>) -> HeroError {
    HeroError::InvalidConfigValueError {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// Catalogs are JSON arrays on disk; anything else is a misconfiguration
/// caught before the loader runs.
pub fn validate_catalog_path(field: &str, path: &str) -> Result<()> {
    if path.trim().is_empty() {
        return Err(invalid(field, path, "Catalog path cannot be empty"));
    }
    if path.contains('\0') {
        return Err(invalid(field, path, "Path contains null bytes"));
    }

    match Path::new(path).extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(()),
        Some(ext) => Err(invalid(
            field,
            path,
            format!("Catalog must be a .json file, got .{}", ext),
        )),
        None => Err(invalid(field, path, "Catalog must be a .json file")),
    }
}

/// Chat completion endpoint: absolute http(s) URL with a host.
pub fn validate_endpoint(field: &str, endpoint: &str) -> Result<()> {
    let url = Url::parse(endpoint)
        .map_err(|e| invalid(field, endpoint, format!("Invalid URL format: {}", e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(
            field,
            endpoint,
            format!("Unsupported URL scheme: {}", url.scheme()),
        ));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(invalid(field, endpoint, "URL has no host"));
    }
    Ok(())
}

pub fn validate_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(field, value, "Value cannot be empty or whitespace-only"));
    }
    Ok(())
}

pub fn validate_at_least<T: PartialOrd + Display>(field: &str, value: T, min: T) -> Result<()> {
    if value < min {
        return Err(invalid(field, &value, format!("Value must be at least {}", min)));
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + Display>(field: &str, value: T, min: T, max: T) -> Result<()> {
    if value < min || value > max {
        return Err(invalid(
            field,
            &value,
            format!("Value must be between {} and {}", min, max),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_catalog_path() {
        assert!(validate_catalog_path("catalog.path", "data/empreendimentos.json").is_ok());
        assert!(validate_catalog_path("catalog.path", "/srv/hero/CATALOGO.JSON").is_ok());
        assert!(validate_catalog_path("catalog.path", "").is_err());
        assert!(validate_catalog_path("catalog.path", "data/empreendimentos.xlsx").is_err());
        assert!(validate_catalog_path("catalog.path", "data/empreendimentos").is_err());
    }

    const DEFAULT_TEST_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

    #[test]
    fn test_validate_endpoint() {
        assert!(validate_endpoint("generator.endpoint", DEFAULT_TEST_ENDPOINT).is_ok());
        assert!(validate_endpoint("generator.endpoint", "http://localhost:8080/v1").is_ok());
        assert!(validate_endpoint("generator.endpoint", "").is_err());
        assert!(validate_endpoint("generator.endpoint", "not-a-url").is_err());
        assert!(validate_endpoint("generator.endpoint", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_at_least() {
        assert!(validate_at_least("session.max_entries", 5usize, 1).is_ok());
        assert!(validate_at_least("session.ttl_seconds", 0u64, 1).is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("generator.temperature", 0.0, 0.0, 2.0).is_ok());
        let err = validate_range("generator.temperature", 2.5, 0.0, 2.0).unwrap_err();
        assert!(matches!(
            err,
            HeroError::InvalidConfigValueError { ref field, .. } if field == "generator.temperature"
        ));
    }
}
