//! Slot store: a sled tree keyed by varint-encoded slot indices.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SolverError};
use crate::reservoir::varint;

/// Tuning knobs passed through to the backing store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreOptions {
    /// Page cache size in bytes.
    pub cache_capacity: u64,
    /// Background flush period; `None` only flushes on demand.
    pub flush_every_ms: Option<u64>,
    /// Space versus write throughput trade-off.
    pub mode: StoreMode,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            cache_capacity: 64 * 1024 * 1024,
            flush_every_ms: Some(500),
            mode: StoreMode::HighThroughput,
        }
    }
}

/// Mirror of sled's storage modes, kept here so options can be persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StoreMode {
    /// Favor compact files.
    LowSpace,
    /// Favor write speed.
    #[default]
    HighThroughput,
}

impl From<StoreMode> for sled::Mode {
    fn from(mode: StoreMode) -> Self {
        match mode {
            StoreMode::LowSpace => sled::Mode::LowSpace,
            StoreMode::HighThroughput => sled::Mode::HighThroughput,
        }
    }
}

/// How to treat a missing store directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OpenMode {
    /// Create the store if needed.
    CreateIfMissing,
    /// Fail with [`SolverError::MissingStore`] unless a sled store already
    /// lives at the path.
    MustExist,
}

/// Durable map from slot index to encoded payload.
pub(crate) struct SlotStore {
    db: sled::Db,
}

impl SlotStore {
    pub(crate) fn open(path: &Path, options: &StoreOptions, mode: OpenMode) -> Result<Self> {
        if mode == OpenMode::MustExist && !Self::exists(path) {
            return Err(SolverError::MissingStore(path.to_path_buf()));
        }

        let db = sled::Config::new()
            .path(path)
            .cache_capacity(options.cache_capacity)
            .flush_every_ms(options.flush_every_ms)
            .mode(options.mode.into())
            .open()?;
        log::info!("opened slot store at {} ({:?})", path.display(), mode);
        Ok(Self { db })
    }

    /// Whether `path` holds a sled store, not merely a directory.
    ///
    /// sled opens any directory and creates its files on demand, so the
    /// presence of its config and data files is what marks a real store.
    fn exists(path: &Path) -> bool {
        path.join("conf").is_file() && path.join("db").is_file()
    }

    /// Insert or replace the payload of `slot`.
    pub(crate) fn put(&self, slot: u64, payload: Vec<u8>) -> Result<()> {
        self.db.insert(varint::encode(slot), payload)?;
        Ok(())
    }

    /// Every `(slot, payload)` pair, ordered by slot.
    ///
    /// Varint keys do not sort in numeric order (slot 128 encodes as
    /// `80 01`, before slot 1's `01`), so the scan is decoded and re-sorted.
    pub(crate) fn scan(&self) -> Result<Vec<(u64, sled::IVec)>> {
        let mut slots = Vec::new();
        for entry in self.db.iter() {
            let (key, value) = entry?;
            let slot = varint::decode(&key).ok_or_else(|| SolverError::CorruptSlotKey(key.to_vec()))?;
            slots.push((slot, value));
        }
        slots.sort_unstable_by_key(|&(slot, _)| slot);
        Ok(slots)
    }

    pub(crate) fn len(&self) -> usize {
        self.db.len()
    }

    pub(crate) fn flush(&self) -> Result<()> {
        self.db.flush()?;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn put_raw(&self, key: &[u8], payload: &[u8]) -> Result<()> {
        self.db.insert(key, payload)?;
        Ok(())
    }
}
