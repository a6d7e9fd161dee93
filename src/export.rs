//! Export rendering for extracted cookies
//!
//! Three consumers, three shapes: a labeled text report for humans, a
//! JSON payload for a collector endpoint, and Netscape `cookies.txt`
//! lines for curl/wget. The report and payload layouts are fixed;
//! downstream tooling parses them.

use serde::{Deserialize, Serialize};

use crate::cookie::{self, CookiePair};
use crate::error::Result;
use crate::store::CookieRecord;

const REPORT_DIVIDER: &str = "-------------------------";

/// Render the human-readable export report.
///
/// Layout: a header naming the source URL, the raw string with a line
/// break after every `;` for readability, then the raw string verbatim.
pub fn text_report(raw: &str, source_url: &str) -> String {
    let mut report = String::new();
    report.push_str(&format!("--- Cookies for URL: {} ---\n\n", source_url));
    report.push_str(&raw.replace(';', ";\n"));
    report.push_str("\n\n--- Raw Cookie String ---\n");
    report.push_str(raw);
    report.push_str(&format!("\n\n{}\n", REPORT_DIVIDER));
    report
}

/// The fixed subset of well-known cookie names the collector expects.
/// Names absent from the header are sent as empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WellKnownCookies {
    pub session: String,
    pub user: String,
    pub expires: String,
}

impl WellKnownCookies {
    fn from_pairs(pairs: &[CookiePair]) -> Self {
        let lookup = |name| cookie::value_of(pairs, name).unwrap_or("").to_string();
        Self {
            session: lookup("session"),
            user: lookup("user"),
            expires: lookup("expires"),
        }
    }
}

/// The JSON body POSTed to a collector endpoint.
///
/// Serialization goes through serde, so cookie values containing quotes
/// or control characters arrive escaped rather than corrupting the body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectorPayload {
    pub data: WellKnownCookies,
    pub raw_cookies_string: String,
    pub source_url: String,
}

impl CollectorPayload {
    pub fn new(raw: &str, source_url: &str) -> Self {
        let pairs = cookie::parse_raw_header(raw);
        Self {
            data: WellKnownCookies::from_pairs(&pairs),
            raw_cookies_string: raw.to_string(),
            source_url: source_url.to_string(),
        }
    }

    /// Compact serialization, used as the request body.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Pretty serialization, used for terminal and file output.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Render store records as a Netscape cookie file (curl/wget format).
///
/// One tab-separated line per cookie:
/// `domain  include_subdomains  path  secure  expiry  name  value`.
/// Domains with a leading dot cover subdomains; session cookies carry
/// expiry 0.
pub fn netscape_export(records: &[CookieRecord]) -> String {
    let mut lines = vec![
        "# Netscape HTTP Cookie File".to_string(),
        "# https://curl.se/docs/http-cookies.html".to_string(),
        "# This file was generated by jarcat".to_string(),
        String::new(),
    ];

    for record in records {
        let include_subdomains = if record.domain.starts_with('.') {
            "TRUE"
        } else {
            "FALSE"
        };
        let secure = if record.secure { "TRUE" } else { "FALSE" };
        let expiry = record.expires.unwrap_or(0);
        lines.push(format!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            record.domain, include_subdomains, record.path, secure, expiry, record.name,
            record.value
        ));
    }

    lines.join("\n")
}
