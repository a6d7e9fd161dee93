//! Configuration management for jarcat

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{JarcatError, Result};

/// Browsers whose cookie stores can be read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Browser {
    Chrome,
    Chromium,
    Edge,
    Brave,
    Firefox,
}

impl FromStr for Browser {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "chrome" => Ok(Browser::Chrome),
            "chromium" => Ok(Browser::Chromium),
            "edge" => Ok(Browser::Edge),
            "brave" => Ok(Browser::Brave),
            "firefox" => Ok(Browser::Firefox),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Browser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Browser::Chrome => "chrome",
            Browser::Chromium => "chromium",
            Browser::Edge => "edge",
            Browser::Brave => "brave",
            Browser::Firefox => "firefox",
        };
        write!(f, "{}", name)
    }
}

/// Cookie store selection
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub browser: Browser,
    pub profile: Option<String>,
    pub keyring: Option<String>,
}

impl StoreConfig {
    /// Parse from yt-dlp style format: BROWSER[+KEYRING][:PROFILE]
    ///
    /// PROFILE may be a profile directory name or a direct path to a
    /// cookie database file.
    pub fn parse(input: &str) -> Result<Self> {
        let mut browser_profile_parts = input.splitn(2, ':');
        let browser_keyring_part = browser_profile_parts.next().unwrap_or(input);
        let profile = browser_profile_parts.next().map(|s| s.to_string());

        let mut browser_keyring_split = browser_keyring_part.splitn(2, '+');
        let browser_str = browser_keyring_split.next().unwrap_or(browser_keyring_part);
        let keyring = browser_keyring_split.next().map(|s| s.to_string());

        let browser = browser_str
            .parse::<Browser>()
            .map_err(|_| JarcatError::Config(format!("Unsupported browser: {}", browser_str)))?;

        Ok(StoreConfig {
            browser,
            profile,
            keyring,
        })
    }
}

/// Export format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Report,
    Json,
    Header,
    Netscape,
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExportFormat::Report => "report",
            ExportFormat::Json => "json",
            ExportFormat::Header => "header",
            ExportFormat::Netscape => "netscape",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for ExportFormat {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "report" | "text" => Ok(ExportFormat::Report),
            "json" => Ok(ExportFormat::Json),
            "header" | "raw" => Ok(ExportFormat::Header),
            "netscape" | "cookies.txt" => Ok(ExportFormat::Netscape),
            _ => Err(()),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub file: Option<PathBuf>,
    pub verbose: bool,
    pub silent: bool,
}

/// Main configuration struct
#[derive(Debug, Clone)]
pub struct Config {
    pub url: String,
    pub store: Option<StoreConfig>,
    pub cookie_string: Option<String>,
    pub format: ExportFormat,
    pub endpoint: Option<String>,
    pub output: OutputConfig,
    pub user_agent: Option<String>,
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            url: String::new(),
            store: Some(StoreConfig {
                browser: Browser::Chrome,
                profile: None,
                keyring: None,
            }),
            cookie_string: None,
            format: ExportFormat::Report,
            endpoint: None,
            output: OutputConfig {
                file: None,
                verbose: false,
                silent: false,
            },
            user_agent: Some(format!("jarcat/{}", crate::VERSION)),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}
