//! User profile persistence.
//!
//! Profiles live in a small key-value store so the CLI keeps them in a JSON
//! file while tests use an in-memory map. Loading is tolerant: a missing or
//! corrupt entry yields the empty profile, storage failures are logged and
//! never abort an analysis.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use log::warn;

use crate::error::AnalysisError;
use crate::model::UserProfile;

const PROFILE_KEY: &str = "platelens_user_profile";

/// Minimal string key-value storage backing profile persistence
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String);
    fn remove(&self, key: &str);
}

/// Volatile store for tests and embedding
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: String) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }
}

/// Store keeping all entries in one JSON object file
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore { path: path.into() }
    }

    fn read_entries(&self) -> BTreeMap<String, String> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return BTreeMap::new(),
            Err(e) => {
                warn!("Failed to read {}: {}", self.path.display(), e);
                return BTreeMap::new();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Ignoring corrupt store file {}: {}", self.path.display(), e);
                BTreeMap::new()
            }
        }
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) {
        match serde_json::to_string_pretty(entries) {
            Ok(json) => {
                if let Err(e) = fs::write(&self.path, json) {
                    warn!("Failed to write {}: {}", self.path.display(), e);
                }
            }
            Err(e) => warn!("Failed to serialize store entries: {}", e),
        }
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.read_entries().get(key).cloned()
    }

    fn set(&self, key: &str, value: String) {
        let mut entries = self.read_entries();
        entries.insert(key.to_string(), value);
        self.write_entries(&entries);
    }

    fn remove(&self, key: &str) {
        let mut entries = self.read_entries();
        if entries.remove(key).is_some() {
            self.write_entries(&entries);
        }
    }
}

/// Validating load/save layer over a [`KeyValueStore`] for the user profile
pub struct ProfileManager<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> ProfileManager<S> {
    pub fn new(store: S) -> Self {
        ProfileManager { store }
    }

    /// Load the stored profile, or the empty profile when nothing usable is
    /// stored.
    pub fn load(&self) -> UserProfile {
        let Some(raw) = self.store.get(PROFILE_KEY) else {
            return UserProfile::default();
        };
        match serde_json::from_str(&raw) {
            Ok(profile) => profile,
            Err(e) => {
                warn!("Stored profile is not valid JSON, ignoring: {}", e);
                UserProfile::default()
            }
        }
    }

    /// Validate and persist the profile. Saving the empty profile removes
    /// the stored entry entirely.
    pub fn save(&self, profile: &UserProfile) -> Result<(), AnalysisError> {
        profile.validate()?;
        if profile.is_empty() {
            self.store.remove(PROFILE_KEY);
            return Ok(());
        }
        match serde_json::to_string(profile) {
            Ok(json) => self.store.set(PROFILE_KEY, json),
            Err(e) => warn!("Failed to serialize profile: {}", e),
        }
        Ok(())
    }

    pub fn clear(&self) {
        self.store.remove(PROFILE_KEY);
    }
}
