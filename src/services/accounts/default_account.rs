use color_eyre::eyre::{Result, eyre};

use crate::ports::accounts::{ACCOUNT_TYPE_GOOGLE, AccountStore};
use crate::ports::preferences::{PREF_KEY_DEFAULT_ACCOUNT_NAME, PreferenceStore};

/// The stored default account, if it still exists.
pub fn default_account<A, S>(accounts: &A, preferences: &S) -> Option<String>
where
    A: AccountStore + ?Sized,
    S: PreferenceStore + ?Sized,
{
    let name = preferences.get(PREF_KEY_DEFAULT_ACCOUNT_NAME)?;
    accounts
        .list_accounts(ACCOUNT_TYPE_GOOGLE)
        .iter()
        .any(|account| account.name == name)
        .then_some(name)
}

pub fn set_default_account<A, S>(accounts: &A, preferences: &S, name: &str) -> Result<()>
where
    A: AccountStore + ?Sized,
    S: PreferenceStore + ?Sized,
{
    let known = accounts
        .list_accounts(ACCOUNT_TYPE_GOOGLE)
        .iter()
        .any(|account| account.name == name);
    if !known {
        return Err(eyre!(
            "Unknown account {}, log in with `watch-later login --account {}` first",
            name,
            name
        ));
    }
    preferences.put(PREF_KEY_DEFAULT_ACCOUNT_NAME, name)
}

pub fn clear_default_account<S: PreferenceStore + ?Sized>(preferences: &S) -> Result<()> {
    preferences.clear(PREF_KEY_DEFAULT_ACCOUNT_NAME)
}
