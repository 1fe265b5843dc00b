use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::store::{Document, JsonStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ShadowMode {
    /// Usuwamy wiadomość.
    #[default]
    Delete,
    /// Usuwamy i publikujemy bzdurę "od" autora.
    Modify,
    /// Usuwamy, bez żadnego śladu na kanale.
    Invisible,
}

impl ShadowMode {
    pub const ALL: [ShadowMode; 3] = [ShadowMode::Delete, ShadowMode::Modify, ShadowMode::Invisible];

    pub fn as_str(self) -> &'static str {
        match self {
            ShadowMode::Delete => "delete",
            ShadowMode::Modify => "modify",
            ShadowMode::Invisible => "invisible",
        }
    }
}

impl fmt::Display for ShadowMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShadowMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "delete" => Ok(ShadowMode::Delete),
            "modify" => Ok(ShadowMode::Modify),
            "invisible" => Ok(ShadowMode::Invisible),
            other => Err(format!("unknown shadowban mode `{other}`")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShadowEntry {
    #[serde(default)]
    pub mode: ShadowMode,
    #[serde(with = "crate::store::timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub banned_by: u64,
}

#[derive(Debug)]
pub struct ShadowRegistry {
    store: JsonStore<ShadowEntry>,
    entries: Mutex<Document<ShadowEntry>>,
}

impl ShadowRegistry {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let store = JsonStore::new(path);
        let entries = store.load_or_init("shadowban");
        Self {
            store,
            entries: Mutex::new(entries),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Document<ShadowEntry>> {
        self.entries.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn persist(&self, doc: &Document<ShadowEntry>) {
        if let Err(e) = self.store.save(doc) {
            warn!(error = ?e, path = %self.store.path().display(), "shadowban registry save failed");
        }
    }

    /// Dodaje albo nadpisuje wpis.
    pub fn ban(&self, user_id: u64, mode: ShadowMode, banned_by: u64) {
        let mut doc = self.lock();
        doc.insert(
            user_id,
            ShadowEntry {
                mode,
                timestamp: Utc::now(),
                banned_by,
            },
        );
        self.persist(&doc);
    }

    pub fn unban(&self, user_id: u64) -> bool {
        let mut doc = self.lock();
        let existed = doc.remove(&user_id).is_some();
        if existed {
            self.persist(&doc);
        }
        existed
    }

    pub fn set_mode(&self, user_id: u64, mode: ShadowMode) -> bool {
        let mut doc = self.lock();
        let Some(entry) = doc.get_mut(&user_id) else {
            return false;
        };
        entry.mode = mode;
        self.persist(&doc);
        true
    }

    pub fn mode(&self, user_id: u64) -> Option<ShadowMode> {
        self.lock().get(&user_id).map(|e| e.mode)
    }

    pub fn list(&self) -> Vec<(u64, ShadowEntry)> {
        self.lock().iter().map(|(k, v)| (*k, v.clone())).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
