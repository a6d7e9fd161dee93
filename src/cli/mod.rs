//! CLI argument parsing and application entry point

use clap::{Arg, ArgMatches, Command};

use crate::config::{Config, ExportFormat, StoreConfig};
use crate::cookie;
use crate::error::{JarcatError, Result};
use crate::exit_code::exit_code_for_error;
use crate::export::{self, CollectorPayload};
use crate::http::{self, CollectorClient};
use crate::i18n;
use crate::output::OutputWriter;
use crate::store::{self, CookieRecord, StoreReader};
use crate::utils::{FileUtils, StringUtils, UrlUtils};

/// Main entry point for the CLI application
pub fn run() {
    crate::logging::init();

    let app = create_app();
    let matches = app.get_matches();

    match run_with_args(&matches) {
        Ok(()) => {}
        Err(e) => {
            eprintln!("jarcat: error: {}", i18n::localize_error(&e));
            std::process::exit(exit_code_for_error(&e));
        }
    }
}

fn run_with_args(matches: &ArgMatches) -> Result<()> {
    let config = build_config_from_args(matches)?;
    execute(&config)
}

fn execute(config: &Config) -> Result<()> {
    let writer = OutputWriter::new(config.output.clone());

    // Store access stays synchronous; only collector POSTs need a runtime
    let (raw_cookies, records) = collect_cookies(config, &writer)?;

    if raw_cookies.trim().is_empty() {
        let status = if config.endpoint.is_some() {
            format!("No cookies found for {} to POST to API.", config.url)
        } else {
            format!("No cookies found for {} to extract.", config.url)
        };
        writer.write_status(&status)?;
        return Ok(());
    }

    if let Some(ref endpoint) = config.endpoint {
        return post_payload(config, &writer, endpoint, &raw_cookies);
    }

    writer.write_verbose(&format!("Rendering {} export", config.format))?;
    let mut rendered = match config.format {
        ExportFormat::Report => export::text_report(&raw_cookies, &config.url),
        ExportFormat::Json => CollectorPayload::new(&raw_cookies, &config.url).to_json_pretty()?,
        ExportFormat::Header => raw_cookies.clone(),
        ExportFormat::Netscape => export::netscape_export(&records),
    };
    if !rendered.ends_with('\n') {
        rendered.push('\n');
    }
    writer.write(&rendered)?;

    if let Some(ref file) = config.output.file {
        let example = raw_cookies.split(';').next().unwrap_or("");
        writer.write_status(&format!(
            "Cookies extracted & saved to:\n{}\n\nExample: {}",
            file.display(),
            example
        ))?;
    }
    Ok(())
}

/// Resolve the raw Cookie header and its records from the configured source
fn collect_cookies(config: &Config, writer: &OutputWriter) -> Result<(String, Vec<CookieRecord>)> {
    if let Some(ref raw) = config.cookie_string {
        writer.write_verbose("Using cookie string from the command line")?;
        let host = UrlUtils::host_of(&config.url)?;
        let records = cookie::parse_raw_header(raw)
            .into_iter()
            .map(|pair| CookieRecord {
                name: pair.name,
                value: pair.value,
                domain: host.clone(),
                path: "/".to_string(),
                secure: false,
                http_only: false,
                expires: None,
            })
            .collect();
        return Ok((raw.clone(), records));
    }

    let store_config = config
        .store
        .clone()
        .ok_or_else(|| JarcatError::Config("No cookie source configured".to_string()))?;
    writer.write_verbose(&format!(
        "Reading cookies from the {} store",
        store_config.browser
    ))?;

    let reader = StoreReader::new(store_config);
    let records = reader.read_for_url(&config.url)?;
    writer.write_verbose(&format!(
        "Matched {} cookies for {}",
        records.len(),
        config.url
    ))?;

    let raw = store::raw_cookie_header(&records);
    Ok((raw, records))
}

fn post_payload(
    config: &Config,
    writer: &OutputWriter,
    endpoint: &str,
    raw_cookies: &str,
) -> Result<()> {
    let payload = CollectorPayload::new(raw_cookies, &config.url);
    writer.write_verbose(&format!("POSTing cookie payload to {}", endpoint))?;

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| JarcatError::Config(format!("Failed to create async runtime: {}", e)))?;
    let outcome = rt.block_on(async {
        let client = CollectorClient::new(config)?;
        client.post(endpoint, &payload).await
    })?;
    writer.write_verbose(&format!("Collector responded with HTTP {}", outcome.status))?;

    writer.write_status(&format!(
        "Cookies POSTED successfully!\nResponse: {}",
        http::response_preview(&outcome.body)
    ))?;
    Ok(())
}

/// Create the CLI application structure
fn create_app() -> Command {
    Command::new("jarcat")
        .version(crate::VERSION)
        .about("Read the cookies a browser would send to a URL and export or ship them")
        .arg(
            Arg::new("url")
                .help("The URL whose cookies to read")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("from-browser")
                .short('b')
                .long("from-browser")
                .value_name("BROWSER[+KEYRING][:PROFILE]")
                .help("Browser store to read: chrome, chromium, edge, brave, firefox"),
        )
        .arg(
            Arg::new("cookie-string")
                .long("cookie-string")
                .value_name("COOKIES")
                .conflicts_with("from-browser")
                .help("Use a raw Cookie header instead of reading a browser store"),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .value_name("FORMAT")
                .default_value("report")
                .help("Export format: report, json, header, netscape"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .help("Write the export to a file"),
        )
        .arg(
            Arg::new("post")
                .long("post")
                .value_name("URL")
                .conflicts_with_all(["format", "output"])
                .help("POST the cookie payload to a collector endpoint"),
        )
        .arg(
            Arg::new("user-agent")
                .short('A')
                .long("user-agent")
                .value_name("STRING")
                .help("User-Agent header for collector requests"),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .value_name("SECONDS")
                .help("Maximum time for collector requests")
                .default_value("30"),
        )
        .arg(
            Arg::new("connect-timeout")
                .long("connect-timeout")
                .value_name("SECONDS")
                .help("Maximum time for connecting to the collector")
                .default_value("10"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Verbose output")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("silent")
                .short('s')
                .long("silent")
                .help("Silent mode")
                .action(clap::ArgAction::SetTrue),
        )
}

/// Build configuration from command line arguments
fn build_config_from_args(matches: &ArgMatches) -> Result<Config> {
    let mut config = Config::default();

    if let Some(url_str) = matches.get_one::<String>("url") {
        config.url = UrlUtils::validate_url(url_str)?;
    }

    if let Some(cookie_string) = matches.get_one::<String>("cookie-string") {
        config.cookie_string = Some(cookie_string.clone());
        config.store = None;
    }

    if let Some(store_str) = matches.get_one::<String>("from-browser") {
        config.store = Some(StoreConfig::parse(store_str)?);
    }

    if let Some(format_str) = matches.get_one::<String>("format") {
        config.format = format_str.parse::<ExportFormat>().map_err(|_| {
            JarcatError::Config(format!("Unknown export format: {}", format_str))
        })?;
    }

    if let Some(endpoint) = matches.get_one::<String>("post") {
        config.endpoint = Some(UrlUtils::validate_url(endpoint)?);
    }

    config.output.verbose = matches.get_flag("verbose");
    config.output.silent = matches.get_flag("silent");

    if let Some(output_file) = matches.get_one::<String>("output") {
        config.output.file = Some(FileUtils::expand_path(output_file));
    }

    if let Some(timeout_str) = matches.get_one::<String>("timeout") {
        config.timeout = StringUtils::parse_timeout(timeout_str)?;
    }

    if let Some(connect_timeout_str) = matches.get_one::<String>("connect-timeout") {
        config.connect_timeout = StringUtils::parse_timeout(connect_timeout_str)?;
    }

    if let Some(user_agent) = matches.get_one::<String>("user-agent") {
        config.user_agent = Some(user_agent.clone());
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::{build_config_from_args, create_app};
    use crate::config::{Browser, ExportFormat};
    use crate::error::JarcatError;

    fn matches_for(args: &[&str]) -> clap::ArgMatches {
        create_app()
            .try_get_matches_from(args)
            .expect("arguments parse")
    }

    #[test]
    fn defaults_to_chrome_store_and_report_format() {
        let matches = matches_for(&["jarcat", "example.com"]);
        let config = build_config_from_args(&matches).expect("config");

        assert_eq!(config.url, "https://example.com");
        assert_eq!(config.format, ExportFormat::Report);
        let store = config.store.expect("default store");
        assert_eq!(store.browser, Browser::Chrome);
        assert!(config.cookie_string.is_none());
    }

    #[test]
    fn cookie_string_replaces_store_source() {
        let matches = matches_for(&[
            "jarcat",
            "https://example.com",
            "--cookie-string",
            "session=abc; user=u42",
        ]);
        let config = build_config_from_args(&matches).expect("config");

        assert!(config.store.is_none());
        assert_eq!(config.cookie_string.as_deref(), Some("session=abc; user=u42"));
    }

    #[test]
    fn rejects_unknown_export_format() {
        let matches = matches_for(&["jarcat", "example.com", "--format", "yaml"]);
        let err = build_config_from_args(&matches).expect_err("unknown format");
        assert!(matches!(err, JarcatError::Config(_)));
    }

    #[test]
    fn post_conflicts_with_output_file() {
        let result = create_app().try_get_matches_from([
            "jarcat",
            "example.com",
            "--post",
            "https://collector.example.com/v1/cookies",
            "-o",
            "out.txt",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn parses_browser_selector_with_profile() {
        let matches = matches_for(&[
            "jarcat",
            "example.com",
            "-b",
            "firefox:/tmp/profile/cookies.sqlite",
        ]);
        let config = build_config_from_args(&matches).expect("config");

        let store = config.store.expect("store");
        assert_eq!(store.browser, Browser::Firefox);
        assert_eq!(
            store.profile.as_deref(),
            Some("/tmp/profile/cookies.sqlite")
        );
    }
}
