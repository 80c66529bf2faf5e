use std::collections::HashMap;
use std::sync::Mutex;

use color_eyre::eyre::Result;

use crate::ports::accounts::{Account, Token};
use crate::ports::preferences::PreferenceStore;
use crate::youtube_rs::types::{
    Channel, ChannelContentDetails, ChannelSnippet, InsertedItem, RelatedPlaylists,
};

/// In-memory preference store.
#[derive(Default)]
pub struct MemoryPreferences {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryPreferences {
    pub fn with(key: &str, value: &str) -> Self {
        let preferences = Self::default();
        preferences.put(key, value).unwrap();
        preferences
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(key).cloned()
    }

    fn put(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn clear(&self, key: &str) -> Result<()> {
        self.values.lock().unwrap().remove(key);
        Ok(())
    }
}

pub fn account(name: &str) -> Account {
    Account::google(name)
}

pub fn token(value: &str) -> Token {
    Token::new(value)
}

pub fn channel(title: Option<&str>, watch_later: Option<&str>) -> Channel {
    Channel {
        snippet: Some(ChannelSnippet {
            title: title.map(str::to_string),
        }),
        content_details: Some(ChannelContentDetails {
            related_playlists: RelatedPlaylists {
                watch_later: watch_later.map(str::to_string),
            },
        }),
    }
}

pub fn inserted(title: &str, description: &str) -> InsertedItem {
    InsertedItem {
        title: title.to_string(),
        description: description.to_string(),
    }
}
