use crate::utils::error::{BallotError, Result};
use std::path::Path;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field_name: &str, value: impl ToString, reason: impl Into<String>) -> BallotError {
    BallotError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

/// 後端位址：http(s)、有主機，且不帶 query 或 fragment（端點是接在路徑後面）
pub fn validate_backend_url(field_name: &str, url_str: &str) -> Result<()> {
    let url = Url::parse(url_str.trim())
        .map_err(|e| invalid(field_name, url_str, format!("Invalid URL format: {}", e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(
            field_name,
            url_str,
            format!("Unsupported URL scheme: {}", url.scheme()),
        ));
    }
    if url.host_str().is_none() {
        return Err(invalid(field_name, url_str, "URL has no host"));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(invalid(
            field_name,
            url_str,
            "Backend URL cannot carry a query string or fragment",
        ));
    }
    Ok(())
}

/// 工作階段檔案不能是空路徑或既有的資料夾
pub fn validate_session_path(field_name: &str, path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(invalid(field_name, "", "Session file path cannot be empty"));
    }
    if path.is_dir() {
        return Err(invalid(
            field_name,
            path.display(),
            "Session file path points to a directory",
        ));
    }
    Ok(())
}

/// 投票類型名稱在比對前會去除空白，因此不能只有空白
pub fn validate_label(field_name: &str, label: &str) -> Result<()> {
    if label.trim().is_empty() {
        return Err(invalid(field_name, label, "Label cannot be empty"));
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
            format!("Value must be between {} and {}", min, max),
        ));
    }
    Ok(())
}

/// DNI：剛好 8 位數字
pub fn validate_dni(field_name: &str, dni: &str) -> Result<()> {
    if dni.len() != 8 {
        return Err(invalid(
            field_name,
            dni,
            "El DNI debe tener exactamente 8 dígitos",
        ));
    }
    if !dni.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid(field_name, dni, "El DNI solo debe contener números"));
    }
    Ok(())
}
