//! Utility functions for jarcat

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{JarcatError, Result};

/// URL utilities
pub struct UrlUtils;

impl UrlUtils {
    /// Validate and normalize a URL, prefixing https:// when no scheme
    /// is present
    pub fn validate_url(url: &str) -> Result<String> {
        let trimmed = url.trim();
        if trimmed.is_empty() {
            return Err(JarcatError::InvalidUrl("URL is empty".to_string()));
        }

        let normalized = if trimmed.contains("://") {
            trimmed.to_string()
        } else {
            format!("https://{}", trimmed)
        };

        let parsed = url::Url::parse(&normalized)
            .map_err(|e| JarcatError::InvalidUrl(format!("Invalid URL '{}': {}", trimmed, e)))?;

        match parsed.scheme() {
            "http" | "https" => Ok(normalized),
            scheme => Err(JarcatError::InvalidUrl(format!(
                "Unsupported URL scheme '{}': only http and https are supported",
                scheme
            ))),
        }
    }

    /// Extract the host portion of an already validated URL
    pub fn host_of(url: &str) -> Result<String> {
        let parsed = url::Url::parse(url)
            .map_err(|e| JarcatError::InvalidUrl(format!("Invalid URL '{}': {}", url, e)))?;
        parsed
            .host_str()
            .map(|h| h.to_string())
            .ok_or_else(|| JarcatError::InvalidUrl(format!("URL '{}' has no host", url)))
    }
}

/// File utilities
pub struct FileUtils;

impl FileUtils {
    /// Expand a leading `~` to the user's home directory
    pub fn expand_path(path: &str) -> PathBuf {
        if let Some(stripped) = path.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(stripped);
            }
        } else if path == "~" {
            if let Some(home) = dirs::home_dir() {
                return home;
            }
        }
        PathBuf::from(path)
    }

    /// Heuristic for whether a profile argument names a filesystem path
    /// rather than a profile directory name
    pub fn is_path_like(value: &str) -> bool {
        value.contains('/') || value.contains('\\') || value.starts_with('~')
    }
}

/// String utilities
pub struct StringUtils;

impl StringUtils {
    /// Parse a timeout value with optional s/m/h suffix into a Duration
    pub fn parse_timeout(value: &str) -> Result<Duration> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(JarcatError::Config("Timeout value is empty".to_string()));
        }

        let (number, multiplier) = match trimmed.chars().last() {
            Some('s') => (&trimmed[..trimmed.len() - 1], 1),
            Some('m') => (&trimmed[..trimmed.len() - 1], 60),
            Some('h') => (&trimmed[..trimmed.len() - 1], 3600),
            _ => (trimmed, 1),
        };

        let seconds = number
            .parse::<u64>()
            .map_err(|_| JarcatError::Config(format!("Invalid timeout value: {}", value)))?;

        Ok(Duration::from_secs(seconds * multiplier))
    }
}
