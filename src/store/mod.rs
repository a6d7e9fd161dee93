//! Browser cookie store access

pub mod chromium;
pub mod firefox;

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::config::{Browser, StoreConfig};
use crate::error::{JarcatError, Result};

/// A cookie row read from a browser store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieRecord {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
    pub secure: bool,
    pub http_only: bool,
    /// Expiry as Unix seconds; None for session cookies
    pub expires: Option<i64>,
}

/// Reads cookies from a configured browser store
pub struct StoreReader {
    config: StoreConfig,
}

impl StoreReader {
    pub fn new(config: StoreConfig) -> Self {
        StoreReader { config }
    }

    /// Read every cookie in the store
    pub fn read_all(&self) -> Result<Vec<CookieRecord>> {
        match self.config.browser {
            Browser::Firefox => firefox::read_cookies(&self.config),
            _ => chromium::read_cookies(&self.config),
        }
    }

    /// Read the cookies the browser would send to the given URL
    pub fn read_for_url(&self, url: &str) -> Result<Vec<CookieRecord>> {
        let records = self.read_all()?;
        matching_for_url(records, url)
    }
}

/// Filter store records down to the ones a request to `url` would carry,
/// ordered longest path first as a browser would send them
pub fn matching_for_url(records: Vec<CookieRecord>, url: &str) -> Result<Vec<CookieRecord>> {
    let parsed = url::Url::parse(url)
        .map_err(|e| JarcatError::InvalidUrl(format!("Invalid URL '{}': {}", url, e)))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| JarcatError::InvalidUrl(format!("URL '{}' has no host", url)))?
        .to_string();
    let request_path = if parsed.path().is_empty() {
        "/"
    } else {
        parsed.path()
    };
    let is_https = parsed.scheme() == "https";
    let now = now_epoch();

    let mut matched: Vec<CookieRecord> = records
        .into_iter()
        .filter(|record| {
            if record.secure && !is_https {
                return false;
            }
            if let Some(expires) = record.expires {
                if expires <= now {
                    return false;
                }
            }
            domain_matches(&record.domain, &host) && path_matches(&record.path, request_path)
        })
        .collect();

    // Stable sort keeps store order for equal path lengths
    matched.sort_by_key(|record| std::cmp::Reverse(record.path.len()));
    Ok(matched)
}

/// Reassemble records into a raw Cookie header string
pub fn raw_cookie_header(records: &[CookieRecord]) -> String {
    records
        .iter()
        .map(|record| format!("{}={}", record.name, record.value))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Domain matching: a leading dot marks a domain cookie that also
/// covers subdomains, otherwise the cookie is host-only
pub fn domain_matches(cookie_domain: &str, host: &str) -> bool {
    if let Some(parent) = cookie_domain.strip_prefix('.') {
        host == parent || host.ends_with(&format!(".{}", parent))
    } else {
        host == cookie_domain
    }
}

/// Path matching per RFC 6265 section 5.1.4
pub fn path_matches(cookie_path: &str, request_path: &str) -> bool {
    if cookie_path == request_path {
        return true;
    }
    if let Some(rest) = request_path.strip_prefix(cookie_path) {
        return cookie_path.ends_with('/') || rest.starts_with('/');
    }
    false
}

pub(crate) fn now_epoch() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// Copy a cookie database aside before opening it, so a running browser
/// holding the file lock does not block us
pub(crate) fn snapshot_db(db_path: &Path) -> Result<(tempfile::TempDir, PathBuf)> {
    if !db_path.exists() {
        return Err(JarcatError::FileNotFound(format!(
            "Cookie database not found: {}",
            db_path.display()
        )));
    }

    let temp_dir = tempfile::tempdir()
        .map_err(|e| JarcatError::Store(format!("Failed to create temp directory: {}", e)))?;
    let copy_path = temp_dir.path().join("cookies.sqlite");
    std::fs::copy(db_path, &copy_path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::PermissionDenied {
            JarcatError::PermissionDenied(format!(
                "Cannot read cookie database {}: {}",
                db_path.display(),
                e
            ))
        } else {
            JarcatError::Store(format!(
                "Failed to copy cookie database {}: {}",
                db_path.display(),
                e
            ))
        }
    })?;

    Ok((temp_dir, copy_path))
}
