use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use color_eyre::eyre::{Result, WrapErr, eyre};

use crate::ports::accounts::PermissionGate;
use crate::ports::preferences::{PREF_KEY_ACCOUNT_ACCESS, PreferenceStore};

const ACCESS_GRANTED: &str = "granted";
const ACCESS_DENIED: &str = "denied";

/// Preferences kept as a flat TOML table, rewritten on every change.
pub struct TomlPreferences {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl TomlPreferences {
    /// Open the preferences file, a missing file is an empty store.
    pub fn open(path: &Path) -> Result<Self> {
        let values = if path.exists() {
            let contents = std::fs::read_to_string(path)
                .wrap_err(format!("Failed to read preferences: {}", path.display()))?;
            toml::from_str(&contents)
                .wrap_err(format!("Failed to parse preferences: {}", path.display()))?
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            path: path.to_path_buf(),
            values: Mutex::new(values),
        })
    }

    fn update(&self, change: impl FnOnce(&mut BTreeMap<String, String>)) -> Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| eyre!("Preferences lock poisoned"))?;
        let mut updated = values.clone();
        change(&mut updated);

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .wrap_err(format!("Failed to create {}", parent.display()))?;
        }
        let contents = toml::to_string(&updated).wrap_err("Failed to serialize preferences")?;
        std::fs::write(&self.path, contents)
            .wrap_err(format!("Failed to write preferences: {}", self.path.display()))?;

        *values = updated;
        Ok(())
    }
}

impl PreferenceStore for TomlPreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().ok()?.get(key).cloned()
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        self.update(|values| {
            values.insert(key.to_string(), value.to_string());
        })
    }

    fn clear(&self, key: &str) -> Result<()> {
        self.update(|values| {
            values.remove(key);
        })
    }
}

/// Account access grant remembered in the preference store.
///
/// When `required` is false the gate is open and nothing is ever asked.
pub struct StoredPermission<S: PreferenceStore> {
    preferences: Arc<S>,
    required: bool,
}

impl<S: PreferenceStore> StoredPermission<S> {
    pub fn new(preferences: Arc<S>, required: bool) -> Self {
        Self {
            preferences,
            required,
        }
    }
}

impl<S: PreferenceStore> PermissionGate for StoredPermission<S> {
    fn is_required(&self) -> bool {
        self.required
    }

    fn has_permission(&self) -> bool {
        !self.required
            || self.preferences.get(PREF_KEY_ACCOUNT_ACCESS).as_deref() == Some(ACCESS_GRANTED)
    }

    fn record(&self, granted: bool) -> Result<()> {
        let value = if granted { ACCESS_GRANTED } else { ACCESS_DENIED };
        self.preferences.put(PREF_KEY_ACCOUNT_ACCESS, value)
    }
}
