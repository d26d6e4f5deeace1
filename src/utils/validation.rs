use crate::utils::error::{Result, TechVaultError};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field: &str, value: impl ToString, reason: impl Into<String>) -> TechVaultError {
    TechVaultError::InvalidConfigValueError {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// API 基底網址：端點路徑會接在其後，因此不可帶 query 或 fragment
pub fn validate_api_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.trim().is_empty() {
        return Err(invalid(field_name, url_str, "TechVault API base URL is required"));
    }

    let url = Url::parse(url_str)
        .map_err(|e| invalid(field_name, url_str, format!("not a usable API address ({})", e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(
            field_name,
            url_str,
            format!("TechVault API must be served over http or https, not {}", url.scheme()),
        ));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(invalid(
            field_name,
            url_str,
            "API base URL cannot carry a query string or fragment",
        ));
    }
    Ok(())
}

/// 選取狀態檔案路徑
pub fn validate_store_path(field_name: &str, path: &str) -> Result<()> {
    if path.trim().is_empty() {
        return Err(invalid(field_name, path, "selection store needs a file path"));
    }
    if path.contains('\0') {
        return Err(invalid(field_name, path, "selection store path contains a NUL byte"));
    }
    if path.ends_with('/') || path.ends_with('\\') {
        return Err(invalid(
            field_name,
            path,
            "selection store path names a directory, expected a file",
        ));
    }
    Ok(())
}

/// 會被放進 URL 路徑的記錄 id
pub fn validate_record_id(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(field_name, value, "record id is blank"));
    }
    if value.contains('/') {
        return Err(invalid(field_name, value, "record id cannot contain '/'"));
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
        return Err(invalid(
            field_name,
            value,
            format!("allowed range is {}..={}", min, max),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reason(result: Result<()>) -> String {
        match result {
            Err(TechVaultError::InvalidConfigValueError { reason, .. }) => reason,
            other => panic!("expected invalid value, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_api_url() {
        assert!(validate_api_url("api.base_url", "https://vault.example.com/api").is_ok());
        assert!(validate_api_url("api.base_url", "http://localhost:8000").is_ok());
        assert!(validate_api_url("api.base_url", "").is_err());
        assert!(validate_api_url("api.base_url", "not a url").is_err());
        assert!(reason(validate_api_url("api.base_url", "ftp://example.com")).contains("ftp"));
        assert!(validate_api_url("api.base_url", "https://vault.example.com/api?v=2").is_err());
    }

    #[test]
    fn test_validate_store_path() {
        assert!(validate_store_path("storage.path", "./state/selection.json").is_ok());
        assert!(validate_store_path("storage.path", "").is_err());
        assert!(validate_store_path("storage.path", "bad\0path").is_err());
        assert!(reason(validate_store_path("storage.path", "/var/lib/techvault/"))
            .contains("directory"));
    }

    #[test]
    fn test_validate_range_and_record_id() {
        assert!(validate_range("api.timeout_seconds", 30u64, 1, 300).is_ok());
        assert!(validate_range("api.timeout_seconds", 0u64, 1, 300).is_err());
        assert_eq!(
            reason(validate_range("api.timeout_seconds", 301u64, 1, 300)),
            "allowed range is 1..=300"
        );

        assert!(validate_record_id("id", "7").is_ok());
        assert!(validate_record_id("id", "   ").is_err());
        assert!(validate_record_id("id", "7/../admin").is_err());
    }
}
