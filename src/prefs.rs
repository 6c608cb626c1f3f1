//! Preference persistence.
//!
//! The controller persists exactly one slot: the volume, as the string form
//! of the float (key [`VOLUME_KEY`]).  Read once at startup, written on
//! every volume change.  Missing or unparsable values fall back to 0.5.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::warn;

/// Preference slot holding the last volume.
pub const VOLUME_KEY: &str = "player_volume";

pub const DEFAULT_VOLUME: f32 = 0.5;

/// Single string-valued key-value slot store.
pub trait PreferenceStore: Send {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> anyhow::Result<()>;
}

/// Read the persisted volume, tolerating absence and garbage.
pub fn load_volume(store: &dyn PreferenceStore) -> f32 {
    store
        .get(VOLUME_KEY)
        .and_then(|s| s.parse::<f32>().ok())
        .unwrap_or(DEFAULT_VOLUME)
}

// ── file-backed store ─────────────────────────────────────────────────────────

/// JSON map persisted to a single file.  A missing or corrupt file is
/// treated as empty.
pub struct FilePreferences {
    path: PathBuf,
    slots: Mutex<HashMap<String, String>>,
}

impl FilePreferences {
    pub fn new(path: PathBuf) -> Self {
        let slots = Self::load_slots(&path);
        Self {
            path,
            slots: Mutex::new(slots),
        }
    }

    /// Store under the platform config dir, e.g. `~/.config/radio-player/prefs.json`.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("radio-player")
            .join("prefs.json")
    }

    fn load_slots(path: &PathBuf) -> HashMap<String, String> {
        if let Ok(content) = std::fs::read_to_string(path) {
            if let Ok(slots) = serde_json::from_str::<HashMap<String, String>>(&content) {
                return slots;
            }
            warn!("prefs: ignoring unreadable file {:?}", path);
        }
        HashMap::new()
    }

    fn save(&self, slots: &HashMap<String, String>) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(slots)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

impl PreferenceStore for FilePreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.slots.lock().expect("prefs lock poisoned").get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let mut slots = self.slots.lock().expect("prefs lock poisoned");
        slots.insert(key.to_string(), value.to_string());
        self.save(&slots)
    }
}

// ── in-memory store ───────────────────────────────────────────────────────────

/// Non-persistent store for tests and hosts that manage their own storage.
#[derive(Default)]
pub struct MemoryPreferences {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.slots.lock().expect("prefs lock poisoned").get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.slots
            .lock()
            .expect("prefs lock poisoned")
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
