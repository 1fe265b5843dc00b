//! Płaski magazyn JSON: cały dokument `{ "<user_id>": rekord }` czytany i
//! zapisywany w całości. Bez blokad między procesami (last-writer-wins).

use std::collections::BTreeMap;
use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Serialize, de::DeserializeOwned};
use tracing::{info, warn};

use crate::error::GuardResult;

pub type Document<T> = BTreeMap<u64, T>;

#[derive(Debug, Clone)]
pub struct JsonStore<T> {
    path: PathBuf,
    _marker: PhantomData<fn() -> T>,
}

impl<T> JsonStore<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Brak pliku = pusty dokument.
    pub fn load(&self) -> GuardResult<Document<T>> {
        if !self.path.exists() {
            return Ok(Document::new());
        }
        let raw = fs::read_to_string(&self.path)?;
        if raw.trim().is_empty() {
            return Ok(Document::new());
        }
        Ok(serde_json::from_str(&raw)?)
    }

    /// Pełny zapis dokumentu (tmp + rename, żeby nie zostawić połówki pliku).
    pub fn save(&self, doc: &Document<T>) -> GuardResult<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }
        let body = serde_json::to_string_pretty(doc)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, body)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Start serwisu: wczytaj co się da. Uszkodzony plik → log + pusty stan,
    /// brak pliku → tworzymy pusty.
    pub fn load_or_init(&self, what: &str) -> Document<T> {
        if !self.path.exists() {
            let empty = Document::new();
            match self.save(&empty) {
                Ok(()) => info!(store = what, path = %self.path.display(), "created empty store"),
                Err(e) => warn!(error = ?e, store = what, "could not create store file"),
            }
            return empty;
        }
        match self.load() {
            Ok(doc) => {
                info!(store = what, entries = doc.len(), "store loaded");
                doc
            }
            Err(e) => {
                warn!(error = ?e, store = what, path = %self.path.display(), "store unreadable, starting empty");
                self.quarantine(what);
                Document::new()
            }
        }
    }

    /// Odkłada nieczytelny plik na bok, zanim pierwszy zapis go nadpisze.
    fn quarantine(&self, what: &str) {
        let mut name = self.path.clone().into_os_string();
        name.push(format!(".corrupt-{}", Utc::now().timestamp()));
        let aside = PathBuf::from(name);
        match fs::rename(&self.path, &aside) {
            Ok(()) => warn!(store = what, moved_to = %aside.display(), "unreadable store moved aside"),
            Err(e) => warn!(error = ?e, store = what, "could not move unreadable store aside"),
        }
    }
}

/// Znaczniki czasu w plikach: zapis RFC 3339 (UTC), odczyt także starego
/// formatu bez strefy (`2025-03-01T10:00:00.123456`), traktowanego jako UTC.
pub mod timestamp {
    use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        let raw = raw.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        NAIVE_FORMATS
            .iter()
            .find_map(|f| NaiveDateTime::parse_from_str(raw, f).ok())
            .map(|n| n.and_utc())
    }

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&dt.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw).ok_or_else(|| D::Error::custom(format!("unrecognised timestamp `{raw}`")))
    }
}
