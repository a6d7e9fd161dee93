//! Firefox cookie store reader

use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::{Connection, OpenFlags};

use crate::config::StoreConfig;
use crate::error::{JarcatError, Result};
use crate::store::CookieRecord;
use crate::utils::FileUtils;

const MAX_SUPPORTED_DB_SCHEMA_VERSION: i64 = 17;
/// Schema 16 stores expiry in milliseconds instead of seconds
const MILLISECOND_EXPIRY_SCHEMA_VERSION: i64 = 16;

/// Read all cookies from a Firefox store
pub fn read_cookies(config: &StoreConfig) -> Result<Vec<CookieRecord>> {
    let roots = search_roots(config.profile.as_deref())?;
    let db_path = newest_path(find_cookie_dbs(&roots)).ok_or_else(|| {
        JarcatError::FileNotFound("Firefox cookie database not found".to_string())
    })?;
    log::debug!("Reading firefox cookies from {}", db_path.display());

    let (_snapshot_guard, snapshot_path) = super::snapshot_db(&db_path)?;
    let conn = Connection::open_with_flags(&snapshot_path, OpenFlags::SQLITE_OPEN_READ_ONLY)
        .map_err(|e| JarcatError::Store(format!("Failed to open cookie database: {}", e)))?;

    let schema_version = read_schema_version(&conn);
    if schema_version > MAX_SUPPORTED_DB_SCHEMA_VERSION {
        log::warn!(
            "Firefox cookie DB schema version {} may be unsupported",
            schema_version
        );
    }

    let (expiry_column, secure_column, http_only_column) = cookie_columns(&conn)?;
    let sql = format!(
        "SELECT host, name, value, path, {}, {}, {} FROM moz_cookies",
        expiry_column, secure_column, http_only_column
    );
    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| JarcatError::Store(format!("Failed to query cookie table: {}", e)))?;

    let records = stmt
        .query_map([], |row| {
            Ok(CookieRecord {
                domain: row.get(0)?,
                name: row.get(1)?,
                value: row.get(2)?,
                path: row.get(3)?,
                expires: convert_expiry(row.get(4)?, schema_version),
                secure: row.get::<_, i64>(5)? != 0,
                http_only: row.get::<_, i64>(6)? != 0,
            })
        })
        .map_err(|e| JarcatError::Store(format!("Failed to read cookie rows: {}", e)))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| JarcatError::Store(format!("Failed to read cookie row: {}", e)))?;

    log::debug!("Read {} cookies from store", records.len());
    Ok(records)
}

fn search_roots(profile: Option<&str>) -> Result<Vec<PathBuf>> {
    if let Some(profile) = profile {
        if FileUtils::is_path_like(profile) {
            return Ok(vec![FileUtils::expand_path(profile)]);
        }
        return Ok(profile_bases()?
            .into_iter()
            .map(|base| base.join(profile))
            .collect());
    }
    profile_bases()
}

#[cfg(target_os = "linux")]
fn profile_bases() -> Result<Vec<PathBuf>> {
    let home = dirs::home_dir()
        .ok_or_else(|| JarcatError::Store("Could not determine home directory".to_string()))?;
    Ok(vec![
        home.join(".mozilla/firefox"),
        home.join("snap/firefox/common/.mozilla/firefox"),
    ])
}

#[cfg(target_os = "macos")]
fn profile_bases() -> Result<Vec<PathBuf>> {
    let home = dirs::home_dir()
        .ok_or_else(|| JarcatError::Store("Could not determine home directory".to_string()))?;
    Ok(vec![home.join("Library/Application Support/Firefox/Profiles")])
}

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
fn profile_bases() -> Result<Vec<PathBuf>> {
    Err(JarcatError::Unsupported(
        "Firefox store discovery is not supported on this platform; pass a database path as the profile".to_string(),
    ))
}

fn find_cookie_dbs(roots: &[PathBuf]) -> Vec<PathBuf> {
    let mut results = Vec::new();
    for root in roots {
        if root.is_file() {
            results.push(root.clone());
            continue;
        }
        if root.exists() {
            results.extend(find_files(root, "cookies.sqlite"));
        }
    }
    results
}

fn find_files(root: &Path, filename: &str) -> Vec<PathBuf> {
    let mut matches = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(_) => continue,
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
            } else if path.file_name().and_then(|name| name.to_str()) == Some(filename) {
                matches.push(path);
            }
        }
    }
    matches
}

fn newest_path(paths: Vec<PathBuf>) -> Option<PathBuf> {
    paths
        .into_iter()
        .filter_map(|path| {
            let modified = fs::metadata(&path).ok()?.modified().ok()?;
            Some((modified, path))
        })
        .max_by_key(|(modified, _)| *modified)
        .map(|(_, path)| path)
}

fn read_schema_version(conn: &Connection) -> i64 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap_or(0)
}

fn cookie_columns(conn: &Connection) -> Result<(String, String, String)> {
    let mut stmt = conn
        .prepare("PRAGMA table_info(moz_cookies)")
        .map_err(|e| JarcatError::Store(format!("Failed to read cookie schema: {}", e)))?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))
        .map_err(|e| JarcatError::Store(format!("Failed to read cookie schema: {}", e)))?
        .collect::<std::result::Result<Vec<String>, _>>()
        .map_err(|e| JarcatError::Store(format!("Failed to read cookie schema: {}", e)))?;

    let expiry_column = if columns.iter().any(|c| c == "expiry") {
        "expiry"
    } else if columns.iter().any(|c| c == "expires") {
        "expires"
    } else {
        return Err(JarcatError::Store(
            "Firefox cookies table missing expiry column".to_string(),
        ));
    };
    let secure_column = if columns.iter().any(|c| c == "is_secure") {
        "is_secure"
    } else {
        "isSecure"
    };
    let http_only_column = if columns.iter().any(|c| c == "isHttpOnly") {
        "isHttpOnly"
    } else if columns.iter().any(|c| c == "is_http_only") {
        "is_http_only"
    } else {
        "0"
    };

    Ok((
        expiry_column.to_string(),
        secure_column.to_string(),
        http_only_column.to_string(),
    ))
}

fn convert_expiry(expiry: Option<i64>, schema_version: i64) -> Option<i64> {
    let expiry = expiry?;
    let seconds = if schema_version >= MILLISECOND_EXPIRY_SCHEMA_VERSION {
        expiry / 1000
    } else {
        expiry
    };
    if seconds > 0 {
        Some(seconds)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Browser;
    use rusqlite::params;

    fn fixture_config(profile: &Path) -> StoreConfig {
        StoreConfig {
            browser: Browser::Firefox,
            profile: Some(profile.to_string_lossy().to_string()),
            keyring: None,
        }
    }

    fn create_store(db_path: &Path, user_version: i64) -> Connection {
        let conn = Connection::open(db_path).expect("open fixture db");
        conn.execute_batch(&format!(
            "PRAGMA user_version = {};
             CREATE TABLE moz_cookies (
                 id INTEGER PRIMARY KEY,
                 originAttributes TEXT NOT NULL DEFAULT '',
                 name TEXT,
                 value TEXT,
                 host TEXT,
                 path TEXT,
                 expiry INTEGER,
                 isSecure INTEGER,
                 isHttpOnly INTEGER
             );",
            user_version
        ))
        .expect("create schema");
        conn
    }

    fn insert_cookie(conn: &Connection, host: &str, name: &str, value: &str, expiry: i64) {
        conn.execute(
            "INSERT INTO moz_cookies (name, value, host, path, expiry, isSecure, isHttpOnly)
             VALUES (?1, ?2, ?3, '/', ?4, 0, 1)",
            params![name, value, host, expiry],
        )
        .expect("insert cookie");
    }

    #[test]
    fn reads_cookies_from_explicit_db_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let db_path = dir.path().join("cookies.sqlite");
        let conn = create_store(&db_path, 15);
        insert_cookie(&conn, ".example.com", "session", "abc123", 1_900_000_000);
        insert_cookie(&conn, "example.com", "transient", "x", 0);
        drop(conn);

        let records = read_cookies(&fixture_config(&db_path)).expect("read cookies");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "session");
        assert_eq!(records[0].domain, ".example.com");
        assert_eq!(records[0].expires, Some(1_900_000_000));
        assert!(records[0].http_only);
        assert_eq!(records[1].expires, None);
    }

    #[test]
    fn divides_millisecond_expiry_on_new_schemas() {
        let dir = tempfile::tempdir().expect("tempdir");
        let db_path = dir.path().join("cookies.sqlite");
        let conn = create_store(&db_path, 16);
        insert_cookie(&conn, "example.com", "session", "abc", 1_900_000_000_000);
        drop(conn);

        let records = read_cookies(&fixture_config(&db_path)).expect("read cookies");
        assert_eq!(records[0].expires, Some(1_900_000_000));
    }

    #[test]
    fn discovers_database_under_profile_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let profile_dir = dir.path().join("abcd1234.default-release");
        std::fs::create_dir_all(&profile_dir).expect("create profile dir");
        let conn = create_store(&profile_dir.join("cookies.sqlite"), 15);
        insert_cookie(&conn, "example.com", "found", "yes", 1_900_000_000);
        drop(conn);

        let records = read_cookies(&fixture_config(dir.path())).expect("read cookies");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "found");
    }

    #[test]
    fn missing_database_is_reported_as_file_not_found() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = read_cookies(&fixture_config(dir.path())).expect_err("empty profile dir");
        assert!(matches!(err, JarcatError::FileNotFound(_)));
    }
}
