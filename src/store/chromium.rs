//! Chromium-family cookie store reader (Chrome, Chromium, Edge, Brave)

use std::path::PathBuf;

use rusqlite::{Connection, OpenFlags};

use crate::config::{Browser, StoreConfig};
use crate::error::{JarcatError, Result};
use crate::store::CookieRecord;
use crate::utils::FileUtils;

const KEY_LENGTH: usize = 16;
const IV: [u8; KEY_LENGTH] = [b' '; KEY_LENGTH];
#[cfg(any(target_os = "linux", target_os = "macos"))]
const SALT: &[u8] = b"saltysalt";
#[cfg(target_os = "linux")]
const PBKDF2_ITERATIONS: u32 = 1;
#[cfg(target_os = "macos")]
const PBKDF2_ITERATIONS: u32 = 1003;
#[cfg(target_os = "linux")]
const V10_PASSWORD: &[u8] = b"peanuts";

/// Microseconds-since-1601 to Unix seconds offset
const WINDOWS_EPOCH_OFFSET: i64 = 11_644_473_600;

/// From this schema version on, decrypted values carry a 32 byte
/// SHA-256 of the host key before the actual value
const HASHED_VALUE_META_VERSION: i64 = 24;
const VALUE_HASH_LENGTH: usize = 32;

/// Read all cookies from a Chromium-family store
pub fn read_cookies(config: &StoreConfig) -> Result<Vec<CookieRecord>> {
    let db_path = resolve_db_path(config)?;
    log::debug!(
        "Reading {} cookies from {}",
        config.browser,
        db_path.display()
    );

    let (_snapshot_guard, snapshot_path) = super::snapshot_db(&db_path)?;
    let conn = Connection::open_with_flags(&snapshot_path, OpenFlags::SQLITE_OPEN_READ_ONLY)
        .map_err(|e| JarcatError::Store(format!("Failed to open cookie database: {}", e)))?;

    let meta_version = read_meta_version(&conn);
    let columns = table_columns(&conn, "cookies")?;
    let secure_column = pick_column(&columns, "is_secure", "secure");
    let httponly_column = pick_column(&columns, "is_httponly", "httponly");

    let sql = format!(
        "SELECT host_key, name, value, encrypted_value, path, expires_utc, {}, {} FROM cookies",
        secure_column, httponly_column
    );
    let mut stmt = conn
        .prepare(&sql)
        .map_err(|e| JarcatError::Store(format!("Failed to query cookie table: {}", e)))?;

    struct RawRow {
        host_key: String,
        name: String,
        value: String,
        encrypted: Vec<u8>,
        path: String,
        expires_utc: i64,
        secure: bool,
        http_only: bool,
    }

    let rows = stmt
        .query_map([], |row| {
            Ok(RawRow {
                host_key: row.get(0)?,
                name: row.get(1)?,
                value: row.get(2)?,
                encrypted: row.get(3)?,
                path: row.get(4)?,
                expires_utc: row.get(5)?,
                secure: row.get::<_, i64>(6)? != 0,
                http_only: row.get::<_, i64>(7)? != 0,
            })
        })
        .map_err(|e| JarcatError::Store(format!("Failed to read cookie rows: {}", e)))?;

    let mut decryptor = ValueDecryptor::new(config);
    let mut records = Vec::new();
    let mut skipped = 0usize;

    for row in rows {
        let raw = row.map_err(|e| JarcatError::Store(format!("Failed to read cookie row: {}", e)))?;

        let value = if !raw.value.is_empty() {
            raw.value
        } else if raw.encrypted.is_empty() {
            String::new()
        } else {
            match decryptor.decrypt(&raw.encrypted, meta_version) {
                Ok(Some(plaintext)) => plaintext,
                Ok(None) => {
                    skipped += 1;
                    continue;
                }
                Err(JarcatError::Unsupported(_)) => {
                    skipped += 1;
                    continue;
                }
                Err(e) => return Err(e),
            }
        };

        records.push(CookieRecord {
            name: raw.name,
            value,
            domain: raw.host_key,
            path: raw.path,
            secure: raw.secure,
            http_only: raw.http_only,
            expires: convert_expiry(raw.expires_utc),
        });
    }

    if skipped > 0 {
        log::warn!(
            "Skipped {} cookies whose encryption is not supported on this platform",
            skipped
        );
    }
    log::debug!("Read {} cookies from store", records.len());
    Ok(records)
}

/// Locate the cookie database for the configured browser and profile
fn resolve_db_path(config: &StoreConfig) -> Result<PathBuf> {
    if let Some(ref profile) = config.profile {
        if FileUtils::is_path_like(profile) {
            return Ok(FileUtils::expand_path(profile));
        }
    }

    let base = user_data_dir(config.browser)?;
    let profile_dir = base.join(config.profile.as_deref().unwrap_or("Default"));

    // Newer Chromium keeps the database under Network/
    let candidates = [
        profile_dir.join("Network").join("Cookies"),
        profile_dir.join("Cookies"),
    ];
    for candidate in &candidates {
        if candidate.exists() {
            return Ok(candidate.clone());
        }
    }

    Err(JarcatError::FileNotFound(format!(
        "No cookie database found under {}",
        profile_dir.display()
    )))
}

#[cfg(target_os = "linux")]
fn user_data_dir(browser: Browser) -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| JarcatError::Store("Could not determine config directory".to_string()))?;
    let dir = match browser {
        Browser::Chrome => config_dir.join("google-chrome"),
        Browser::Chromium => {
            let primary = config_dir.join("chromium");
            if primary.exists() {
                primary
            } else if let Some(home) = dirs::home_dir() {
                home.join("snap/chromium/common/chromium")
            } else {
                primary
            }
        }
        Browser::Edge => config_dir.join("microsoft-edge"),
        Browser::Brave => config_dir.join("BraveSoftware/Brave-Browser"),
        Browser::Firefox => {
            return Err(JarcatError::Store(
                "Firefox stores are handled by the Firefox reader".to_string(),
            ))
        }
    };
    Ok(dir)
}

#[cfg(target_os = "macos")]
fn user_data_dir(browser: Browser) -> Result<PathBuf> {
    let support_dir = dirs::config_dir()
        .ok_or_else(|| JarcatError::Store("Could not determine config directory".to_string()))?;
    let dir = match browser {
        Browser::Chrome => support_dir.join("Google/Chrome"),
        Browser::Chromium => support_dir.join("Chromium"),
        Browser::Edge => support_dir.join("Microsoft Edge"),
        Browser::Brave => support_dir.join("BraveSoftware/Brave-Browser"),
        Browser::Firefox => {
            return Err(JarcatError::Store(
                "Firefox stores are handled by the Firefox reader".to_string(),
            ))
        }
    };
    Ok(dir)
}

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
fn user_data_dir(_browser: Browser) -> Result<PathBuf> {
    Err(JarcatError::Unsupported(
        "Browser store discovery is not supported on this platform; pass a database path as the profile".to_string(),
    ))
}

fn read_meta_version(conn: &Connection) -> i64 {
    conn.query_row("SELECT value FROM meta WHERE key = 'version'", [], |row| {
        row.get::<_, String>(0)
    })
    .ok()
    .and_then(|value| value.parse::<i64>().ok())
    .unwrap_or(0)
}

fn table_columns(conn: &Connection, table: &str) -> Result<Vec<String>> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({})", table))
        .map_err(|e| JarcatError::Store(format!("Failed to inspect cookie table: {}", e)))?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(1))
        .map_err(|e| JarcatError::Store(format!("Failed to inspect cookie table: {}", e)))?
        .collect::<std::result::Result<Vec<String>, _>>()
        .map_err(|e| JarcatError::Store(format!("Failed to inspect cookie table: {}", e)))?;
    Ok(names)
}

/// Older Chrome schemas used `secure`/`httponly` column names
fn pick_column<'a>(columns: &[String], preferred: &'a str, fallback: &'a str) -> &'a str {
    if columns.iter().any(|c| c == preferred) {
        preferred
    } else {
        fallback
    }
}

fn convert_expiry(expires_utc: i64) -> Option<i64> {
    if expires_utc <= 0 {
        return None;
    }
    let seconds = expires_utc / 1_000_000 - WINDOWS_EPOCH_OFFSET;
    if seconds <= 0 {
        None
    } else {
        Some(seconds)
    }
}

/// Decrypts `encrypted_value` blobs, deriving keys lazily so stores
/// with only plaintext values never touch the keyring
struct ValueDecryptor {
    browser: Browser,
    keyring: Option<String>,
    v10_key: Option<[u8; KEY_LENGTH]>,
    v11_key: Option<[u8; KEY_LENGTH]>,
}

impl ValueDecryptor {
    fn new(config: &StoreConfig) -> Self {
        ValueDecryptor {
            browser: config.browser,
            keyring: config.keyring.clone(),
            v10_key: None,
            v11_key: None,
        }
    }

    /// Returns Ok(None) for encryption schemes this build cannot handle
    fn decrypt(&mut self, encrypted: &[u8], meta_version: i64) -> Result<Option<String>> {
        if encrypted.len() <= 3 {
            return Ok(None);
        }
        let (prefix, payload) = encrypted.split_at(3);
        let key = match prefix {
            b"v10" => self.v10_key()?,
            b"v11" => self.v11_key()?,
            _ => return Ok(None),
        };
        decrypt_with_key(&key, payload, meta_version).map(Some)
    }

    #[cfg(target_os = "linux")]
    fn v10_key(&mut self) -> Result<[u8; KEY_LENGTH]> {
        if let Some(key) = self.v10_key {
            return Ok(key);
        }
        let key = derive_key(V10_PASSWORD, PBKDF2_ITERATIONS);
        self.v10_key = Some(key);
        Ok(key)
    }

    #[cfg(target_os = "macos")]
    fn v10_key(&mut self) -> Result<[u8; KEY_LENGTH]> {
        if let Some(key) = self.v10_key {
            return Ok(key);
        }
        let password = keychain_password(self.browser)?;
        let key = derive_key(&password, PBKDF2_ITERATIONS);
        self.v10_key = Some(key);
        Ok(key)
    }

    #[cfg(not(any(target_os = "linux", target_os = "macos")))]
    fn v10_key(&mut self) -> Result<[u8; KEY_LENGTH]> {
        Err(JarcatError::Unsupported(
            "Cookie decryption is not supported on this platform".to_string(),
        ))
    }

    #[cfg(target_os = "linux")]
    fn v11_key(&mut self) -> Result<[u8; KEY_LENGTH]> {
        if let Some(key) = self.v11_key {
            return Ok(key);
        }
        let password = match self.keyring.as_deref() {
            Some("basic") | Some("basictext") => V10_PASSWORD.to_vec(),
            None | Some("gnome") | Some("gnomekeyring") => keyring_password(self.browser)?,
            Some(other) => {
                return Err(JarcatError::Config(format!(
                    "Keyring '{}' is not supported",
                    other
                )))
            }
        };
        let key = derive_key(&password, PBKDF2_ITERATIONS);
        self.v11_key = Some(key);
        Ok(key)
    }

    #[cfg(not(target_os = "linux"))]
    fn v11_key(&mut self) -> Result<[u8; KEY_LENGTH]> {
        Err(JarcatError::Unsupported(
            "v11 encrypted cookies are only used on Linux".to_string(),
        ))
    }
}

#[cfg(any(target_os = "linux", target_os = "macos"))]
fn derive_key(password: &[u8], iterations: u32) -> [u8; KEY_LENGTH] {
    let mut key = [0u8; KEY_LENGTH];
    pbkdf2::pbkdf2_hmac::<sha1::Sha1>(password, SALT, iterations, &mut key);
    key
}

fn decrypt_with_key(
    key: &[u8; KEY_LENGTH],
    payload: &[u8],
    meta_version: i64,
) -> Result<String> {
    use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, KeyIvInit};
    type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;

    let cipher = Aes128CbcDec::new_from_slices(key, &IV)
        .map_err(|e| JarcatError::Store(format!("Failed to initialize cookie cipher: {}", e)))?;
    let mut buf = payload.to_vec();
    let decrypted = cipher.decrypt_padded_mut::<Pkcs7>(&mut buf).map_err(|_| {
        JarcatError::Store(
            "Failed to decrypt cookie value; the keyring password may not match this profile"
                .to_string(),
        )
    })?;

    let plaintext = if meta_version >= HASHED_VALUE_META_VERSION
        && decrypted.len() >= VALUE_HASH_LENGTH
    {
        &decrypted[VALUE_HASH_LENGTH..]
    } else {
        decrypted
    };
    Ok(String::from_utf8_lossy(plaintext).to_string())
}

#[cfg(any(target_os = "linux", target_os = "macos"))]
fn product_name(browser: Browser) -> &'static str {
    match browser {
        Browser::Chrome => "Chrome",
        Browser::Chromium => "Chromium",
        Browser::Edge => "Microsoft Edge",
        Browser::Brave => "Brave",
        Browser::Firefox => "Firefox",
    }
}

#[cfg(target_os = "linux")]
fn keyring_password(browser: Browser) -> Result<Vec<u8>> {
    use secret_service::blocking::SecretService;
    use secret_service::EncryptionType;

    let service = SecretService::connect(EncryptionType::Dh)
        .map_err(|e| JarcatError::Store(format!("Failed to connect to Secret Service: {}", e)))?;
    let collection = service
        .get_default_collection()
        .or_else(|_| service.get_any_collection())
        .map_err(|e| JarcatError::Store(format!("Failed to open keyring collection: {}", e)))?;
    let items = collection
        .get_all_items()
        .map_err(|e| JarcatError::Store(format!("Failed to list keyring items: {}", e)))?;

    let label = format!("{} Safe Storage", product_name(browser));
    for item in items {
        if let Ok(item_label) = item.get_label() {
            if item_label == label {
                if item.is_locked().unwrap_or(false) {
                    item.unlock().map_err(|e| {
                        JarcatError::Store(format!("Failed to unlock keyring item: {}", e))
                    })?;
                }
                return item.get_secret().map_err(|e| {
                    JarcatError::Store(format!("Failed to read keyring secret: {}", e))
                });
            }
        }
    }

    Err(JarcatError::Store(format!(
        "No '{}' entry found in the keyring",
        label
    )))
}

#[cfg(target_os = "macos")]
fn keychain_password(browser: Browser) -> Result<Vec<u8>> {
    use security_framework::passwords::get_generic_password;

    let service = format!("{} Safe Storage", product_name(browser));
    get_generic_password(&service, product_name(browser))
        .map_err(|e| JarcatError::Store(format!("Failed to read '{}' from keychain: {}", service, e)))
}
