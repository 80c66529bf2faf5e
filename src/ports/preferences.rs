use color_eyre::eyre::Result;

pub const PREF_KEY_DEFAULT_ACCOUNT_NAME: &str = "default_account_name";
pub const PREF_KEY_ACCOUNT_ACCESS: &str = "account_access";

/// Small persistent key value store for user preferences.
#[cfg_attr(test, mockall::automock)]
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn put(&self, key: &str, value: &str) -> Result<()>;

    fn clear(&self, key: &str) -> Result<()>;
}
