//! Persistence for the settings namespace.
//!
//! A store keeps one `ZohoConfig` per namespace name. Saves always replace the whole record, so
//! a reader never sees half of one save and half of another.

use crate::client_error::ClientError;
use crate::config::{Password, ZohoConfig};
use crate::vault::{PasswordVault, SealedPassword};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};
use tempfile::NamedTempFile;

/// Somewhere the settings can be saved and loaded from.
pub trait SettingsStore {
    /// Load the last saved settings, or `None` when nothing was ever saved under `name`.
    fn load(&self, name: &str) -> Result<Option<ZohoConfig>, ClientError>;

    /// Replace the settings saved under `name`.
    fn save(&self, name: &str, config: &ZohoConfig) -> Result<(), ClientError>;
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<T>, ClientError> {
    mutex
        .lock()
        .map_err(|_| ClientError::Storage(String::from("settings lock was poisoned")))
}

/// Settings kept in memory for the life of the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, ZohoConfig>>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }
}

impl SettingsStore for MemoryStore {
    fn load(&self, name: &str) -> Result<Option<ZohoConfig>, ClientError> {
        Ok(lock(&self.records)?.get(name).cloned())
    }

    fn save(&self, name: &str, config: &ZohoConfig) -> Result<(), ClientError> {
        lock(&self.records)?.insert(name.to_string(), config.clone());

        Ok(())
    }
}

/// One lock per settings file, shared by every store in the process.
fn namespace_lock(path: &Path) -> Result<Arc<Mutex<()>>, ClientError> {
    static LOCKS: OnceLock<Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>> = OnceLock::new();

    let mut locks = lock(LOCKS.get_or_init(Default::default))?;

    Ok(locks.entry(path.to_path_buf()).or_default().clone())
}

/// Layout of a settings file. The password is only ever written sealed.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct StoredConfig {
    zoho_api_authtoken: String,
    zoho_username_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    zoho_password: Option<SealedPassword>,
    generate_new_authtoken: Value,
}

/// Settings saved as one JSON file per namespace, `<dir>/<name>.json`.
///
/// The password is encrypted with the store's `PasswordVault`; the other fields are plain JSON.
/// Writes go to a fresh temp file in the same directory, created readable by the owner only,
/// which is then renamed over the old one.
pub struct JsonFileStore {
    dir: PathBuf,
    vault: PasswordVault,
}

impl JsonFileStore {
    pub fn new<P: Into<PathBuf>>(dir: P, vault: PasswordVault) -> JsonFileStore {
        JsonFileStore {
            dir: dir.into(),
            vault,
        }
    }

    /// Path of the file holding the given namespace.
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", name))
    }

    fn seal_config(&self, config: &ZohoConfig) -> Result<StoredConfig, ClientError> {
        let zoho_password = if config.password.is_empty() {
            None
        } else {
            Some(self.vault.seal(&config.password)?)
        };

        Ok(StoredConfig {
            zoho_api_authtoken: config.authtoken.clone(),
            zoho_username_email: config.username.clone(),
            zoho_password,
            generate_new_authtoken: config.generate_new_authtoken.clone(),
        })
    }

    fn open_config(&self, stored: StoredConfig) -> Result<ZohoConfig, ClientError> {
        let password = match &stored.zoho_password {
            Some(sealed) => self.vault.open(sealed)?,
            None => Password::default(),
        };

        Ok(ZohoConfig {
            authtoken: stored.zoho_api_authtoken,
            username: stored.zoho_username_email,
            password,
            generate_new_authtoken: stored.generate_new_authtoken,
        })
    }
}

impl SettingsStore for JsonFileStore {
    fn load(&self, name: &str) -> Result<Option<ZohoConfig>, ClientError> {
        let path = self.path(name);

        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&path)?;
        let stored: StoredConfig = serde_json::from_str(&contents)?;

        Ok(Some(self.open_config(stored)?))
    }

    fn save(&self, name: &str, config: &ZohoConfig) -> Result<(), ClientError> {
        let stored = self.seal_config(config)?;

        fs::create_dir_all(&self.dir)?;
        let path = fs::canonicalize(&self.dir)?.join(format!("{}.json", name));

        let namespace = namespace_lock(&path)?;
        let _guard = lock(&*namespace)?;

        write_atomic(&path, &stored)
    }
}

fn write_atomic(path: &Path, stored: &StoredConfig) -> Result<(), ClientError> {
    let json = serde_json::to_string_pretty(stored)?;
    let dir = path
        .parent()
        .ok_or_else(|| ClientError::Storage(String::from("settings path has no parent directory")))?;

    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(json.as_bytes())?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| e.error)?;

    debug!("Saved settings to {}", path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{JsonFileStore, MemoryStore, SettingsStore};
    use crate::config::{ZohoConfig, CONFIG_NAME};
    use crate::vault::PasswordVault;
    use serde_json::json;
    use std::path::Path;
    use std::thread;

    const TEST_KEY: [u8; 32] = [42u8; 32];

    fn sample_config() -> ZohoConfig {
        let mut config = ZohoConfig::new("T", "U", "P");
        config.generate_new_authtoken = json!("F");

        config
    }

    fn file_store(dir: &Path) -> JsonFileStore {
        JsonFileStore::new(dir, PasswordVault::from_key_bytes(&TEST_KEY).unwrap())
    }

    #[test]
    fn memory_store_starts_empty() {
        let store = MemoryStore::new();

        assert_eq!(store.load(CONFIG_NAME).unwrap(), None);
    }

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryStore::new();
        store.save(CONFIG_NAME, &sample_config()).unwrap();

        let loaded = store.load(CONFIG_NAME).unwrap().unwrap();

        assert_eq!(loaded, sample_config());
        assert_eq!(loaded.password.expose(), "P");
    }

    #[test]
    fn memory_store_keeps_namespaces_apart() {
        let store = MemoryStore::new();
        store.save(CONFIG_NAME, &sample_config()).unwrap();

        assert_eq!(store.load("other.config").unwrap(), None);
    }

    #[test]
    fn file_store_missing_file_is_unconfigured() {
        let dir = tempfile::tempdir().unwrap();

        assert_eq!(file_store(dir.path()).load(CONFIG_NAME).unwrap(), None);
    }

    #[test]
    fn file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        file_store(dir.path()).save(CONFIG_NAME, &sample_config()).unwrap();

        // A fresh store reads what the first one wrote.
        let loaded = file_store(dir.path()).load(CONFIG_NAME).unwrap().unwrap();

        assert_eq!(loaded, sample_config());
        assert_eq!(loaded.password.expose(), "P");
    }

    #[test]
    fn file_store_overwrites_previous_save() {
        let dir = tempfile::tempdir().unwrap();
        let store = file_store(dir.path());
        store.save(CONFIG_NAME, &ZohoConfig::new("old", "old", "old")).unwrap();
        store.save(CONFIG_NAME, &sample_config()).unwrap();

        assert_eq!(store.load(CONFIG_NAME).unwrap().unwrap(), sample_config());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn file_store_uses_namespace_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = file_store(dir.path());
        store.save(CONFIG_NAME, &sample_config()).unwrap();

        let raw = std::fs::read_to_string(store.path(CONFIG_NAME)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();

        assert_eq!(value["zoho_api_authtoken"], "T");
        assert_eq!(value["zoho_username_email"], "U");
        assert_eq!(value["generate_new_authtoken"], "F");
        assert!(value["zoho_password"]["nonce"].is_string());
        assert!(value["zoho_password"]["ciphertext"].is_string());
    }

    #[test]
    fn file_store_never_writes_plaintext_password() {
        let dir = tempfile::tempdir().unwrap();
        let store = file_store(dir.path());
        store.save(CONFIG_NAME, &ZohoConfig::new("T", "U", "hunter2-plaintext")).unwrap();

        let raw = std::fs::read_to_string(store.path(CONFIG_NAME)).unwrap();

        assert!(!raw.contains("hunter2-plaintext"));
    }

    #[test]
    fn file_store_empty_password_is_omitted() {
        let dir = tempfile::tempdir().unwrap();
        let store = file_store(dir.path());
        store.save(CONFIG_NAME, &ZohoConfig::new("T", "U", "")).unwrap();

        let raw = std::fs::read_to_string(store.path(CONFIG_NAME)).unwrap();

        assert!(!raw.contains("zoho_password"));
        assert!(store.load(CONFIG_NAME).unwrap().unwrap().password.is_empty());
    }

    #[test]
    fn file_store_needs_the_same_key() {
        let dir = tempfile::tempdir().unwrap();
        file_store(dir.path()).save(CONFIG_NAME, &sample_config()).unwrap();

        let other = JsonFileStore::new(dir.path(), PasswordVault::from_key_bytes(&[1u8; 32]).unwrap());

        assert!(other.load(CONFIG_NAME).is_err());
    }

    #[test]
    fn file_store_missing_keys_default_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = file_store(dir.path());
        std::fs::write(store.path(CONFIG_NAME), r#"{"zoho_api_authtoken":"token"}"#).unwrap();

        let loaded = store.load(CONFIG_NAME).unwrap().unwrap();

        assert_eq!(loaded.authtoken, "token");
        assert!(loaded.username.is_empty());
        assert!(loaded.password.is_empty());
        assert!(loaded.generate_new_authtoken.is_null());
    }

    #[cfg(unix)]
    #[test]
    fn file_store_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = file_store(dir.path());
        store.save(CONFIG_NAME, &sample_config()).unwrap();

        let mode = std::fs::metadata(store.path(CONFIG_NAME)).unwrap().permissions().mode();

        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn file_store_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = file_store(dir.path());
        std::fs::write(store.path(CONFIG_NAME), "not json").unwrap();

        assert!(store.load(CONFIG_NAME).is_err());
    }

    #[test]
    /// Several stores on one directory, each on its own thread, saving the same namespace.
    fn concurrent_stores_on_one_directory() {
        let dir = tempfile::tempdir().unwrap();

        let handles: Vec<_> = (0..4)
            .map(|id| {
                let path = dir.path().to_path_buf();

                thread::spawn(move || {
                    let store = file_store(&path);
                    let mut errors: usize = 0;

                    for n in 0..100 {
                        let config = ZohoConfig::new(format!("T{}-{}", id, n), String::from("U"), String::from("P"));

                        if store.save(CONFIG_NAME, &config).is_err() {
                            errors += 1;
                        }
                    }

                    errors
                })
            })
            .collect();

        let errors: usize = handles.into_iter().map(|handle| handle.join().unwrap()).sum();

        assert_eq!(errors, 0);

        let loaded = file_store(dir.path()).load(CONFIG_NAME).unwrap().unwrap();

        assert!(loaded.authtoken.starts_with('T'));
        assert_eq!(loaded.password.expose(), "P");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
