use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::embedding::Embedding;
use crate::error::{Error, Result};

const STORE_FILE: &str = "identities.bin";
const STORE_TMP: &str = "identities.bin.tmp";

/// One persisted identity: key plus its reference embedding. Nothing else is
/// load-bearing for matching.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityRecord {
    pub key: String,
    pub embedding: Embedding,
}

/// Durable key-to-embedding store backed by a postcard file.
///
/// The full mapping is loaded and replaced as a unit; fine at small N, and the
/// seam where a real key-value backend would slot in at scale. Writers
/// serialize behind the internal lock so read-modify-write upserts cannot
/// clobber each other; saves go through a temp file plus rename so readers
/// never observe a torn store.
pub struct FaceStore {
    dir: PathBuf,
    lock: RwLock<()>,
}

impl FaceStore {
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            lock: RwLock::new(()),
        }
    }

    fn file(&self) -> PathBuf {
        self.dir.join(STORE_FILE)
    }

    /// Current contents, keyed in BTreeMap order so iteration is
    /// deterministic. Empty on first run.
    pub fn load(&self) -> Result<BTreeMap<String, Embedding>> {
        let _guard = self.lock.read().unwrap_or_else(PoisonError::into_inner);
        self.load_unlocked()
    }

    /// Atomically replace the persisted mapping.
    pub fn save(&self, records: &BTreeMap<String, Embedding>) -> Result<()> {
        let _guard = self.lock.write().unwrap_or_else(PoisonError::into_inner);
        self.save_unlocked(records)
    }

    /// Insert or overwrite one identity. Last write wins; the whole
    /// load-mutate-save runs under the write guard. Embeddings of a
    /// different dimensionality than the existing records are rejected,
    /// since they could never be matched against them.
    pub fn upsert(&self, key: &str, embedding: Embedding) -> Result<()> {
        let _guard = self.lock.write().unwrap_or_else(PoisonError::into_inner);
        let mut records = self.load_unlocked()?;
        if let Some(existing) = records.values().next() {
            if existing.len() != embedding.len() {
                return Err(Error::DimensionMismatch {
                    left: existing.len(),
                    right: embedding.len(),
                });
            }
        }
        records.insert(key.to_string(), embedding);
        self.save_unlocked(&records)
    }

    /// Administrative wipe of every registered identity.
    pub fn purge(&self) -> Result<()> {
        let _guard = self.lock.write().unwrap_or_else(PoisonError::into_inner);
        if self.dir.exists() {
            fs::remove_dir_all(&self.dir).map_err(|source| Error::Storage {
                path: self.dir.clone(),
                source,
            })?;
        }
        Ok(())
    }

    fn load_unlocked(&self) -> Result<BTreeMap<String, Embedding>> {
        let file = self.file();
        if !file.exists() {
            return Ok(BTreeMap::new());
        }
        let data = fs::read(&file).map_err(|source| Error::Storage {
            path: file.clone(),
            source,
        })?;
        let records: Vec<IdentityRecord> = postcard::from_bytes(&data)?;
        Ok(records
            .into_iter()
            .map(|r| (r.key, r.embedding))
            .collect())
    }

    fn save_unlocked(&self, records: &BTreeMap<String, Embedding>) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|source| Error::Storage {
            path: self.dir.clone(),
            source,
        })?;
        let flat: Vec<IdentityRecord> = records
            .iter()
            .map(|(key, embedding)| IdentityRecord {
                key: key.clone(),
                embedding: embedding.clone(),
            })
            .collect();
        let data = postcard::to_allocvec(&flat)?;
        let tmp = self.dir.join(STORE_TMP);
        fs::write(&tmp, data).map_err(|source| Error::Storage {
            path: tmp.clone(),
            source,
        })?;
        fs::rename(&tmp, self.file()).map_err(|source| Error::Storage {
            path: self.file(),
            source,
        })
    }
}
