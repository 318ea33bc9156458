//! Disk-backed reservoir buffer.
//!
//! Uses Algorithm R (Vitter 1985): the first `capacity` samples fill slots
//! `0..capacity` in order; afterwards the `n`th sample replaces a uniformly
//! random slot with probability `capacity / n`. After `n` samples every one
//! of them is stored with probability `min(1, capacity / n)`.
//!
//! Samples live in a sled store, so the reservoir can outgrow memory and
//! survive restarts. Each slot holds one MessagePack record with named
//! fields, so a store written with a different sample type fails to decode
//! instead of yielding garbage. The running count lives in memory and is persisted
//! separately with [`ReservoirBuffer::save_metadata`]; the two are not
//! updated atomically together, so a crash between a slot write and the next
//! metadata save leaves them out of step.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::persist::{Header, RecordKind};
use crate::reservoir::store::{OpenMode, SlotStore, StoreOptions};

/// Everything needed to reopen a buffer and continue sampling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservoirMetadata {
    /// Directory of the backing store.
    pub path: PathBuf,
    /// Options the store was opened with.
    pub options: StoreOptions,
    /// Maximum number of stored samples.
    pub capacity: u64,
    /// Samples offered so far, stored or not.
    pub count: u64,
}

struct State {
    count: u64,
    rng: StdRng,
}

/// Fixed-capacity uniform sample of an unbounded stream, stored on disk.
///
/// `add_sample` may be called from many threads at once.
pub struct ReservoirBuffer<S> {
    path: PathBuf,
    options: StoreOptions,
    capacity: u64,
    state: Mutex<State>,
    store: SlotStore,
    _sample: PhantomData<fn() -> S>,
}

impl<S: Serialize + DeserializeOwned> ReservoirBuffer<S> {
    /// Open (or create) a store at `path` holding at most `capacity` samples.
    pub fn new<P: Into<PathBuf>>(path: P, options: StoreOptions, capacity: u64) -> Result<Self> {
        Self::open(path.into(), options, capacity, 0, StdRng::from_entropy(), OpenMode::CreateIfMissing)
    }

    /// Like [`ReservoirBuffer::new`], with reproducible replacement decisions.
    pub fn with_seed<P: Into<PathBuf>>(
        path: P,
        options: StoreOptions,
        capacity: u64,
        seed: u64,
    ) -> Result<Self> {
        Self::open(path.into(), options, capacity, 0, StdRng::seed_from_u64(seed), OpenMode::CreateIfMissing)
    }

    /// Reopen a buffer described by `metadata`, resuming its running count.
    ///
    /// Fails with [`crate::SolverError::MissingStore`] if the store is gone,
    /// rather than silently starting over with an empty reservoir.
    pub fn from_metadata(metadata: ReservoirMetadata) -> Result<Self> {
        let buffer = Self::open(
            metadata.path,
            metadata.options,
            metadata.capacity,
            metadata.count,
            StdRng::from_entropy(),
            OpenMode::MustExist,
        )?;
        if metadata.count > 0 && buffer.is_empty() {
            log::warn!(
                "reservoir at {} has seen {} samples but holds none",
                buffer.path.display(),
                metadata.count
            );
        } else {
            log::info!(
                "resumed reservoir: {} of {} slots filled after {} samples",
                buffer.len(),
                buffer.capacity,
                metadata.count
            );
        }
        Ok(buffer)
    }

    fn open(
        path: PathBuf,
        options: StoreOptions,
        capacity: u64,
        count: u64,
        rng: StdRng,
        mode: OpenMode,
    ) -> Result<Self> {
        let store = SlotStore::open(&path, &options, mode)?;
        Ok(Self {
            path,
            options,
            capacity,
            state: Mutex::new(State { count, rng }),
            store,
            _sample: PhantomData,
        })
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Offer one sample to the reservoir.
    ///
    /// Counting, the replacement decision and the slot write happen under one
    /// lock, so concurrent callers see a consistent count.
    pub fn add_sample(&self, sample: &S) -> Result<()> {
        let mut state = self.lock();
        state.count += 1;

        let slot = if state.count <= self.capacity {
            state.count - 1
        } else {
            let count = state.count;
            let m = state.rng.gen_range(0..count);
            if m >= self.capacity {
                return Ok(());
            }
            m
        };

        self.store.put(slot, rmp_serde::to_vec_named(sample)?)
    }

    /// Every stored sample, in slot order.
    pub fn get_samples(&self) -> Result<Vec<S>> {
        self.store
            .scan()?
            .into_iter()
            .map(|(_, payload)| -> Result<S> { Ok(rmp_serde::from_slice(&payload)?) })
            .collect()
    }

    /// Maximum number of stored samples.
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Samples offered so far.
    pub fn count(&self) -> u64 {
        self.lock().count
    }

    /// Number of filled slots.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Whether nothing has been stored yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Force pending slot writes to disk.
    pub fn flush(&self) -> Result<()> {
        self.store.flush()
    }

    /// Snapshot of the configuration and running count.
    pub fn metadata(&self) -> ReservoirMetadata {
        ReservoirMetadata {
            path: self.path.clone(),
            options: self.options,
            capacity: self.capacity,
            count: self.count(),
        }
    }

    /// Flush the store, then write the metadata record to `writer`.
    pub fn save_metadata<W: Write>(&self, mut writer: W) -> Result<()> {
        self.flush()?;
        Header::new(RecordKind::ReservoirMeta).write(&mut writer)?;
        bincode::serialize_into(&mut writer, &self.metadata())?;
        writer.flush()?;
        Ok(())
    }

    /// Write the metadata record to a file.
    pub fn save_metadata_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        log::info!("saving reservoir metadata to {}", path.display());
        self.save_metadata(BufWriter::new(File::create(path)?))
    }

    /// Read a metadata record written by [`ReservoirBuffer::save_metadata`]
    /// and reopen the buffer it describes.
    pub fn load<R: Read>(mut reader: R) -> Result<Self> {
        Header::expect(&mut reader, RecordKind::ReservoirMeta)?;
        let metadata: ReservoirMetadata = bincode::deserialize_from(&mut reader)?;
        Self::from_metadata(metadata)
    }

    /// Reopen the buffer whose metadata is stored at `path`.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load(BufReader::new(File::open(path)?))
    }
}

impl<S: Serialize + DeserializeOwned + Sync> ReservoirBuffer<S> {
    /// Offer many samples in parallel.
    pub fn add_samples(&self, samples: &[S]) -> Result<()> {
        samples.par_iter().try_for_each(|sample| self.add_sample(sample))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SolverError;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Sample {
        id: u32,
        advantages: Vec<f32>,
    }

    fn sample(id: u32) -> Sample {
        Sample {
            id,
            advantages: vec![id as f32, -0.5],
        }
    }

    fn temp_path(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("mccfr_reservoir_{}_{}", name, std::process::id()));
        std::fs::remove_dir_all(&path).ok();
        path
    }

    /// No background flusher, so a dropped store is released right away.
    fn options() -> StoreOptions {
        StoreOptions {
            flush_every_ms: None,
            ..StoreOptions::default()
        }
    }

    fn cleanup(path: &Path) {
        std::fs::remove_dir_all(path).ok();
    }

    #[test]
    fn test_keeps_everything_below_capacity() {
        let path = temp_path("below");
        let buffer = ReservoirBuffer::with_seed(&path, options(), 10, 1).unwrap();
        for id in 0..7 {
            buffer.add_sample(&sample(id)).unwrap();
        }
        let stored = buffer.get_samples().unwrap();
        assert_eq!(stored, (0..7).map(sample).collect::<Vec<_>>());
        assert_eq!(buffer.count(), 7);
        drop(buffer);
        cleanup(&path);
    }

    #[test]
    fn test_holds_exactly_capacity() {
        let path = temp_path("exact");
        let buffer = ReservoirBuffer::with_seed(&path, options(), 200, 2).unwrap();
        for id in 0..1_000 {
            buffer.add_sample(&sample(id)).unwrap();
        }
        let stored: Vec<Sample> = buffer.get_samples().unwrap();
        assert_eq!(stored.len(), 200);
        assert_eq!(buffer.len(), 200);
        assert_eq!(buffer.count(), 1_000);

        // Slot order crosses the one-byte varint boundary at 128.
        let mut ids: Vec<u32> = stored.iter().map(|s| s.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 200);
        drop(buffer);
        cleanup(&path);
    }

    #[test]
    fn test_retention_is_uniform() {
        // Each of N items should survive with probability C/N.
        let (capacity, n, trials) = (4u64, 20u32, 400);
        let mut kept = vec![0u32; n as usize];
        let path = temp_path("uniform");
        for trial in 0..trials {
            cleanup(&path);
            let buffer: ReservoirBuffer<u32> =
                ReservoirBuffer::with_seed(&path, options(), capacity, trial).unwrap();
            for id in 0..n {
                buffer.add_sample(&id).unwrap();
            }
            for id in buffer.get_samples().unwrap() {
                kept[id as usize] += 1;
            }
        }
        cleanup(&path);

        let expected = capacity as f64 / n as f64;
        for (id, &count) in kept.iter().enumerate() {
            let freq = count as f64 / trials as f64;
            assert!((freq - expected).abs() < 0.1, "item {} kept with frequency {}", id, freq);
        }
    }

    #[test]
    fn test_metadata_round_trip_resumes_count() {
        let path = temp_path("resume");
        let meta_path = std::env::temp_dir().join(format!("mccfr_reservoir_meta_{}.bin", std::process::id()));
        {
            let buffer = ReservoirBuffer::with_seed(&path, options(), 5, 3).unwrap();
            for id in 0..12 {
                buffer.add_sample(&sample(id)).unwrap();
            }
            buffer.save_metadata_to_file(&meta_path).unwrap();
        }

        let before: Vec<Sample> = {
            let buffer: ReservoirBuffer<Sample> = ReservoirBuffer::load_from_file(&meta_path).unwrap();
            assert_eq!(buffer.count(), 12);
            assert_eq!(buffer.capacity(), 5);
            assert_eq!(buffer.metadata().path, path);
            buffer.get_samples().unwrap()
        };
        assert_eq!(before.len(), 5);

        let buffer: ReservoirBuffer<Sample> = ReservoirBuffer::load_from_file(&meta_path).unwrap();
        assert_eq!(buffer.get_samples().unwrap(), before);
        buffer.add_sample(&sample(99)).unwrap();
        assert_eq!(buffer.count(), 13);
        assert_eq!(buffer.len(), 5);

        drop(buffer);
        std::fs::remove_file(&meta_path).ok();
        cleanup(&path);
    }

    #[test]
    fn test_reload_fails_without_store() {
        let metadata = ReservoirMetadata {
            path: temp_path("gone"),
            options: options(),
            capacity: 3,
            count: 10,
        };
        let result = ReservoirBuffer::<Sample>::from_metadata(metadata.clone());
        assert!(matches!(result, Err(SolverError::MissingStore(p)) if p == metadata.path));
        assert!(!metadata.path.exists());
    }

    #[test]
    fn test_reload_fails_on_empty_directory() {
        let path = temp_path("empty_dir");
        std::fs::create_dir_all(&path).unwrap();
        let metadata = ReservoirMetadata {
            path: path.clone(),
            options: options(),
            capacity: 3,
            count: 10,
        };
        let result = ReservoirBuffer::<Sample>::from_metadata(metadata);
        assert!(matches!(result, Err(SolverError::MissingStore(p)) if p == path));
        cleanup(&path);
    }

    #[test]
    fn test_reload_of_empty_store_keeps_count() {
        let path = temp_path("empty_store");
        {
            let buffer = ReservoirBuffer::<Sample>::with_seed(&path, options(), 3, 6).unwrap();
            buffer.flush().unwrap();
        }
        let metadata = ReservoirMetadata {
            path: path.clone(),
            options: options(),
            capacity: 3,
            count: 10,
        };
        let buffer = ReservoirBuffer::<Sample>::from_metadata(metadata).unwrap();
        assert!(buffer.is_empty());
        assert_eq!(buffer.count(), 10);
        drop(buffer);
        cleanup(&path);
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct WeightedSample {
        id: u32,
        advantages: Vec<f32>,
        #[serde(default)]
        weight: f32,
    }

    #[derive(Debug, Serialize, Deserialize)]
    struct Unrelated {
        label: String,
    }

    #[test]
    fn test_payloads_decode_by_field_name() {
        let path = temp_path("schema");
        {
            let buffer = ReservoirBuffer::with_seed(&path, options(), 4, 5).unwrap();
            buffer.add_sample(&sample(1)).unwrap();
            buffer.add_sample(&sample(2)).unwrap();
            buffer.flush().unwrap();
        }

        // A sample type that adds a defaulted field still reads old records.
        {
            let buffer: ReservoirBuffer<WeightedSample> =
                ReservoirBuffer::new(&path, options(), 4).unwrap();
            let stored = buffer.get_samples().unwrap();
            assert_eq!(stored.len(), 2);
            assert_eq!(stored[1].id, 2);
            assert_eq!(stored[1].advantages, vec![2.0, -0.5]);
            assert_eq!(stored[1].weight, 0.0);
        }

        // An incompatible one is reported, not misread.
        let buffer: ReservoirBuffer<Unrelated> = ReservoirBuffer::new(&path, options(), 4).unwrap();
        assert!(matches!(buffer.get_samples(), Err(SolverError::SampleDecode(_))));
        drop(buffer);
        cleanup(&path);
    }

    #[test]
    fn test_metadata_header_is_checked() {
        let mut bytes = Vec::new();
        Header::new(RecordKind::PolicyTable).write(&mut bytes).unwrap();
        let result = ReservoirBuffer::<Sample>::load(bytes.as_slice());
        assert!(matches!(result, Err(SolverError::Format { .. })));
    }

    #[test]
    fn test_concurrent_adds() {
        let path = temp_path("concurrent");
        let buffer = ReservoirBuffer::with_seed(&path, options(), 64, 4).unwrap();
        let samples: Vec<Sample> = (0..2_000).map(sample).collect();
        buffer.add_samples(&samples).unwrap();

        assert_eq!(buffer.count(), 2_000);
        let stored = buffer.get_samples().unwrap();
        assert_eq!(stored.len(), 64);
        assert!(stored.iter().all(|s| s.advantages == vec![s.id as f32, -0.5]));
        drop(buffer);
        cleanup(&path);
    }
}
