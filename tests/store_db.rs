use std::path::Path;

use assert_cmd::Command;
use rusqlite::{params, Connection};

fn jarcat() -> Command {
    Command::cargo_bin("jarcat").expect("jarcat binary")
}

/// Far-future Chromium timestamp (microseconds since 1601)
fn chromium_expiry_far_future() -> i64 {
    (4_102_444_800 + 11_644_473_600) * 1_000_000
}

fn create_chromium_store(db_path: &Path) -> Connection {
    let conn = Connection::open(db_path).expect("open fixture db");
    conn.execute_batch(
        "CREATE TABLE meta (key LONGVARCHAR NOT NULL PRIMARY KEY, value LONGVARCHAR);
         INSERT INTO meta (key, value) VALUES ('version', '23');
         CREATE TABLE cookies (
             host_key TEXT NOT NULL,
             name TEXT NOT NULL,
             value TEXT NOT NULL,
             encrypted_value BLOB NOT NULL,
             path TEXT NOT NULL,
             expires_utc INTEGER NOT NULL,
             is_secure INTEGER NOT NULL,
             is_httponly INTEGER NOT NULL
         );",
    )
    .expect("create chromium schema");
    conn
}

fn insert_chromium_cookie(
    conn: &Connection,
    host: &str,
    name: &str,
    value: &str,
    path: &str,
    expires_utc: i64,
    secure: bool,
) {
    conn.execute(
        "INSERT INTO cookies VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0)",
        params![
            host,
            name,
            value,
            Vec::<u8>::new(),
            path,
            expires_utc,
            secure as i64
        ],
    )
    .expect("insert cookie");
}

fn create_firefox_store(db_path: &Path) -> Connection {
    let conn = Connection::open(db_path).expect("open fixture db");
    conn.execute_batch(
        "PRAGMA user_version = 15;
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
    )
    .expect("create firefox schema");
    conn
}

#[test]
fn chromium_store_export_matches_url() {
    let dir = tempfile::tempdir().expect("tempdir");
    let db_path = dir.path().join("Cookies");
    let conn = create_chromium_store(&db_path);
    insert_chromium_cookie(
        &conn,
        ".example.com",
        "session",
        "abc123",
        "/",
        chromium_expiry_far_future(),
        false,
    );
    insert_chromium_cookie(&conn, ".example.com", "user", "john_doe", "/", 0, false);
    insert_chromium_cookie(&conn, "other.com", "foreign", "nope", "/", 0, false);
    drop(conn);

    let output = jarcat()
        .arg("https://example.com/")
        .arg("-b")
        .arg(format!("chrome:{}", db_path.display()))
        .arg("--format")
        .arg("header")
        .output()
        .expect("run jarcat");

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "session=abc123; user=john_doe\n"
    );
}

#[test]
fn chromium_secure_cookies_are_withheld_from_http_urls() {
    let dir = tempfile::tempdir().expect("tempdir");
    let db_path = dir.path().join("Cookies");
    let conn = create_chromium_store(&db_path);
    insert_chromium_cookie(&conn, "example.com", "secure_token", "s3cret", "/", 0, true);
    insert_chromium_cookie(&conn, "example.com", "plain", "ok", "/", 0, false);
    drop(conn);

    let selector = format!("chrome:{}", db_path.display());

    let output = jarcat()
        .arg("http://example.com/")
        .arg("-b")
        .arg(&selector)
        .arg("--format")
        .arg("header")
        .output()
        .expect("run jarcat");
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "plain=ok\n");

    let output = jarcat()
        .arg("https://example.com/")
        .arg("-b")
        .arg(&selector)
        .arg("--format")
        .arg("header")
        .output()
        .expect("run jarcat");
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "secure_token=s3cret; plain=ok\n"
    );
}

#[test]
fn chromium_path_scoped_cookies_order_longest_first() {
    let dir = tempfile::tempdir().expect("tempdir");
    let db_path = dir.path().join("Cookies");
    let conn = create_chromium_store(&db_path);
    insert_chromium_cookie(&conn, "example.com", "root", "r", "/", 0, false);
    insert_chromium_cookie(&conn, "example.com", "deep", "d", "/account", 0, false);
    insert_chromium_cookie(&conn, "example.com", "other", "o", "/admin", 0, false);
    drop(conn);

    let output = jarcat()
        .arg("https://example.com/account/settings")
        .arg("-b")
        .arg(format!("chrome:{}", db_path.display()))
        .arg("--format")
        .arg("header")
        .output()
        .expect("run jarcat");

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "deep=d; root=r\n");
}

#[test]
fn store_with_no_matches_reports_no_cookies() {
    let dir = tempfile::tempdir().expect("tempdir");
    let db_path = dir.path().join("Cookies");
    let conn = create_chromium_store(&db_path);
    insert_chromium_cookie(&conn, "other.com", "foreign", "nope", "/", 0, false);
    drop(conn);

    let output = jarcat()
        .arg("https://example.com/")
        .arg("-b")
        .arg(format!("chrome:{}", db_path.display()))
        .output()
        .expect("run jarcat");

    assert!(output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No cookies found for https://example.com/ to extract."));
}

#[test]
fn missing_store_database_exits_37() {
    let output = jarcat()
        .arg("https://example.com/")
        .arg("-b")
        .arg("chrome:/nonexistent/profile/Cookies")
        .output()
        .expect("run jarcat");

    assert_eq!(output.status.code(), Some(37));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("jarcat: error:"));
}

#[test]
fn firefox_store_export_matches_url() {
    let dir = tempfile::tempdir().expect("tempdir");
    let db_path = dir.path().join("cookies.sqlite");
    let conn = create_firefox_store(&db_path);
    conn.execute(
        "INSERT INTO moz_cookies (name, value, host, path, expiry, isSecure, isHttpOnly)
         VALUES ('session', 'ff_abc', '.example.com', '/', 4102444800, 0, 0)",
        [],
    )
    .expect("insert cookie");
    conn.execute(
        "INSERT INTO moz_cookies (name, value, host, path, expiry, isSecure, isHttpOnly)
         VALUES ('foreign', 'nope', 'other.com', '/', 4102444800, 0, 0)",
        [],
    )
    .expect("insert cookie");
    drop(conn);

    let output = jarcat()
        .arg("https://shop.example.com/")
        .arg("-b")
        .arg(format!("firefox:{}", db_path.display()))
        .arg("--format")
        .arg("header")
        .output()
        .expect("run jarcat");

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "session=ff_abc\n");
}

#[test]
fn firefox_netscape_export_round_trips_store_fields() {
    let dir = tempfile::tempdir().expect("tempdir");
    let db_path = dir.path().join("cookies.sqlite");
    let conn = create_firefox_store(&db_path);
    conn.execute(
        "INSERT INTO moz_cookies (name, value, host, path, expiry, isSecure, isHttpOnly)
         VALUES ('session', 'ff_abc', '.example.com', '/', 4102444800, 1, 0)",
        [],
    )
    .expect("insert cookie");
    drop(conn);

    let output = jarcat()
        .arg("https://example.com/")
        .arg("-b")
        .arg(format!("firefox:{}", db_path.display()))
        .arg("--format")
        .arg("netscape")
        .output()
        .expect("run jarcat");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(".example.com\tTRUE\t/\tTRUE\t4102444800\tsession\tff_abc"));
}
