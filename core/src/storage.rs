//! Storage collaborators for the segmentation engine.
//!
//! Responsibilities implemented here:
//! - `StorageBackend`: the async key -> candidate list contract the engine
//!   depends on. An unknown key is an empty list, not an error.
//! - `DictionaryRecord` / `DictionarySource`: what a bulk load consumes.
//! - `MemoryStore`: thread-safe in-memory backend used by tests and for
//!   dictionaries loaded straight from a data file.
//! - `RedbStore`: persistent backend on `redb`, keyed by the big-endian wire
//!   form of the `EncodedKey` with `bincode` payloads.
use crate::candidate::Candidate;
use crate::codec::EncodedKey;
use crate::error::StorageError;
use ahash::AHashMap;
use async_trait::async_trait;
use redb::{ReadableTable, TableDefinition};
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::info;

/// One dictionary entry: every candidate stored under one key, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryRecord {
    pub key: EncodedKey,
    pub candidates: Vec<Candidate>,
}

impl DictionaryRecord {
    pub fn new(key: EncodedKey, candidates: Vec<Candidate>) -> Self {
        Self { key, candidates }
    }
}

/// Anything that can yield dictionary records for a bulk load.
pub trait DictionarySource {
    fn records(self) -> Result<Vec<DictionaryRecord>, StorageError>;
}

impl DictionarySource for Vec<DictionaryRecord> {
    fn records(self) -> Result<Vec<DictionaryRecord>, StorageError> {
        Ok(self)
    }
}

/// Persistent pronunciation -> text dictionary, as seen by the engine.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Candidates stored under `key`, in storage order. Unknown keys yield an
    /// empty list.
    async fn lookup(&self, key: &EncodedKey) -> Result<Vec<Candidate>, StorageError>;

    /// Store every record, replacing any list already stored under its key.
    /// Returns the number of records written.
    async fn bulk_load(&self, records: Vec<DictionaryRecord>) -> Result<usize, StorageError>;

    /// Human-readable backend name (for logging).
    fn name(&self) -> &str;
}

/// A thread-safe in-memory dictionary.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<AHashMap<EncodedKey, Vec<Candidate>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from records; later records replace earlier ones.
    pub fn from_records(records: Vec<DictionaryRecord>) -> Self {
        let map = records.into_iter().map(|r| (r.key, r.candidates)).collect();
        Self {
            inner: RwLock::new(map),
        }
    }

    /// Insert or replace one key synchronously.
    pub fn insert(&self, key: EncodedKey, candidates: Vec<Candidate>) {
        if let Ok(mut map) = self.inner.write() {
            map.insert(key, candidates);
        }
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl StorageBackend for MemoryStore {
    async fn lookup(&self, key: &EncodedKey) -> Result<Vec<Candidate>, StorageError> {
        let map = self
            .inner
            .read()
            .map_err(|_| StorageError::Unavailable("memory store lock poisoned".into()))?;
        Ok(map.get(key).cloned().unwrap_or_default())
    }

    async fn bulk_load(&self, records: Vec<DictionaryRecord>) -> Result<usize, StorageError> {
        let mut map = self
            .inner
            .write()
            .map_err(|_| StorageError::Unavailable("memory store lock poisoned".into()))?;
        let count = records.len();
        for record in records {
            map.insert(record.key, record.candidates);
        }
        info!(count, "bulk-loaded memory store");
        Ok(count)
    }

    fn name(&self) -> &str {
        "memory"
    }
}

/// Redb-backed dictionary.
///
/// One table, `phrases`: key bytes are `EncodedKey::to_bytes`, values are the
/// bincode-encoded candidate list.
pub struct RedbStore {
    db: redb::Database,
    path: PathBuf,
}

impl RedbStore {
    const TABLE_DEF: TableDefinition<'static, &'static [u8], &'static [u8]> =
        TableDefinition::new("phrases");

    /// Create or open a redb database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        Self::open_db(path.as_ref()).map_err(StorageError::unavailable)
    }

    fn open_db(path: &Path) -> Result<Self, redb::Error> {
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        let db = redb::Database::create(path)?;
        // Make sure the table exists so read transactions never miss it.
        let write_txn = db.begin_write()?;
        write_txn.open_table(Self::TABLE_DEF)?;
        write_txn.commit()?;
        Ok(RedbStore {
            db,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_raw(&self, key: &EncodedKey) -> Result<Option<Vec<u8>>, redb::Error> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(Self::TABLE_DEF)?;
        let bytes = key.to_bytes();
        let value = table.get(bytes.as_slice())?;
        Ok(value.map(|v| v.value().to_vec()))
    }

    fn write_all(&self, encoded: &[(Vec<u8>, Vec<u8>)]) -> Result<(), redb::Error> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(Self::TABLE_DEF)?;
            for (key, payload) in encoded {
                table.insert(key.as_slice(), payload.as_slice())?;
            }
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Number of keys stored.
    pub fn key_count(&self) -> Result<usize, StorageError> {
        let count = || -> Result<usize, redb::Error> {
            let read_txn = self.db.begin_read()?;
            let table = read_txn.open_table(Self::TABLE_DEF)?;
            let mut n = 0;
            for item in table.iter()? {
                item?;
                n += 1;
            }
            Ok(n)
        };
        count().map_err(StorageError::unavailable)
    }
}

#[async_trait]
impl StorageBackend for RedbStore {
    async fn lookup(&self, key: &EncodedKey) -> Result<Vec<Candidate>, StorageError> {
        let raw = self.read_raw(key).map_err(StorageError::unavailable)?;
        match raw {
            Some(bytes) => bincode::deserialize(&bytes).map_err(|e| StorageError::Corrupt {
                key: key.to_string(),
                reason: e.to_string(),
            }),
            None => Ok(Vec::new()),
        }
    }

    async fn bulk_load(&self, records: Vec<DictionaryRecord>) -> Result<usize, StorageError> {
        let mut encoded = Vec::with_capacity(records.len());
        for record in &records {
            let payload = bincode::serialize(&record.candidates).map_err(|e| {
                StorageError::Corrupt {
                    key: record.key.to_string(),
                    reason: e.to_string(),
                }
            })?;
            encoded.push((record.key.to_bytes(), payload));
        }
        self.write_all(&encoded).map_err(StorageError::unavailable)?;
        info!(count = encoded.len(), path = %self.path.display(), "bulk-loaded redb store");
        Ok(encoded.len())
    }

    fn name(&self) -> &str {
        "redb"
    }
}
