use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::store::{Document, JsonStore};

/// Co tyle prób rośnie poziom ostrzeżenia.
pub const ATTEMPTS_PER_WARNING: u32 = 3;

/// Nazwy pól zgodne z istniejącym `antiscam_db.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffenderRecord {
    #[serde(rename = "count")]
    pub attempt_count: u32,
    #[serde(rename = "first_scam", with = "crate::store::timestamp")]
    pub first_seen_at: DateTime<Utc>,
    #[serde(rename = "last_scam", with = "crate::store::timestamp")]
    pub last_seen_at: DateTime<Utc>,
    #[serde(rename = "warnings")]
    pub warning_level: u32,
}

/// Jedyny właściciel rekordów. Każda mutacja kończy się pełnym zapisem pliku;
/// błąd zapisu jest logowany, stan w pamięci działa dalej.
#[derive(Debug)]
pub struct OffenderLedger {
    store: JsonStore<OffenderRecord>,
    records: Mutex<Document<OffenderRecord>>,
}

impl OffenderLedger {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let store = JsonStore::new(path);
        let records = store.load_or_init("antiscam");
        Self {
            store,
            records: Mutex::new(records),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Document<OffenderRecord>> {
        // zatruty mutex = panika w innym handlerze; dane dalej są spójne
        self.records.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn persist(&self, doc: &Document<OffenderRecord>) {
        if let Err(e) = self.store.save(doc) {
            warn!(error = ?e, path = %self.store.path().display(), "antiscam ledger save failed");
        }
    }

    /// Zwraca licznik po inkrementacji.
    pub fn record_attempt(&self, user_id: u64) -> u32 {
        let now = Utc::now();
        let mut doc = self.lock();
        let rec = doc.entry(user_id).or_insert_with(|| OffenderRecord {
            attempt_count: 0,
            first_seen_at: now,
            last_seen_at: now,
            warning_level: 0,
        });
        rec.attempt_count += 1;
        rec.last_seen_at = now;
        let count = rec.attempt_count;
        self.persist(&doc);
        count
    }

    /// Podbija poziom dokładnie wtedy, gdy bieżący licznik jest wielokrotnością 3.
    /// Brak blokady przed ponownym wywołaniem dla tego samego licznika.
    pub fn maybe_escalate(&self, user_id: u64) -> (bool, u32) {
        let mut doc = self.lock();
        let Some(rec) = doc.get_mut(&user_id) else {
            return (false, 0);
        };
        if rec.attempt_count == 0 || rec.attempt_count % ATTEMPTS_PER_WARNING != 0 {
            return (false, rec.warning_level);
        }
        rec.warning_level += 1;
        let level = rec.warning_level;
        self.persist(&doc);
        (true, level)
    }

    pub fn warning_level(&self, user_id: u64) -> u32 {
        self.lock().get(&user_id).map(|r| r.warning_level).unwrap_or(0)
    }

    pub fn record(&self, user_id: u64) -> Option<OffenderRecord> {
        self.lock().get(&user_id).cloned()
    }

    pub fn reset(&self, user_id: u64) -> bool {
        let mut doc = self.lock();
        let existed = doc.remove(&user_id).is_some();
        if existed {
            self.persist(&doc);
            info!(user_id, "antiscam record reset");
        }
        existed
    }

    /// Najaktywniejsi wg liczby prób (remis → niższe ID).
    pub fn top(&self, n: usize) -> Vec<(u64, OffenderRecord)> {
        let doc = self.lock();
        let mut all: Vec<(u64, OffenderRecord)> =
            doc.iter().map(|(k, v)| (*k, v.clone())).collect();
        all.sort_by(|a, b| b.1.attempt_count.cmp(&a.1.attempt_count).then(a.0.cmp(&b.0)));
        all.truncate(n);
        all
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
