//! Strategy profile: the registry of per-infoset policies.
//!
//! [`PolicyTable`] implements tabular CFR. Each information set key maps to a
//! [`Policy`] created lazily on first access. Policies touched during an
//! iteration are remembered so [`StrategyProfile::update`] only revisits
//! those, exactly once each.
//!
//! The table is not internally synchronized. Concurrent traversals sharing one
//! table must serialize access externally.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::cfr::discount::{DiscountParams, DiscountSchedule};
use crate::cfr::game::{GameTreeNode, InfoSet};
use crate::cfr::policy::{NodeStrategy, Policy};
use crate::error::{Result, SolverError};
use crate::persist::{Header, RecordKind};

/// A collection of node strategies, one per information set.
pub trait StrategyProfile {
    /// Strategy type stored per information set.
    type Strategy: NodeStrategy;

    /// Strategy for the information set `key`, created with `num_actions`
    /// actions if it does not exist yet.
    ///
    /// Fails with [`SolverError::ActionCountMismatch`] if the stored strategy
    /// was created with a different number of actions.
    fn policy(&mut self, key: &[u8], num_actions: usize) -> Result<&mut Self::Strategy>;

    /// Strategy for the acting player's information set at `node`.
    fn get_strategy<N: GameTreeNode>(&mut self, node: &N) -> Result<&mut Self::Strategy> {
        let key = node.info_set(node.player()).key();
        self.policy(&key, node.num_children())
    }

    /// Advance every strategy touched since the last update to the next iteration.
    fn update(&mut self);

    /// Current iteration, starting at 1.
    fn iter(&self) -> u64;

    /// Number of information sets seen so far.
    fn num_infosets(&self) -> usize;
}

/// Tabular strategy profile keyed by infoset key.
#[derive(Debug, Clone)]
pub struct PolicyTable<D = DiscountParams> {
    params: D,
    iter: u64,
    index: FxHashMap<Vec<u8>, usize>,
    entries: Vec<(Vec<u8>, Policy)>,
    touched: FxHashSet<usize>,
}

impl Default for PolicyTable<DiscountParams> {
    fn default() -> Self {
        Self::new(DiscountParams::default())
    }
}

impl<D: DiscountSchedule> PolicyTable<D> {
    /// Create an empty table using the given discount schedule.
    pub fn new(params: D) -> Self {
        Self {
            params,
            iter: 1,
            index: FxHashMap::default(),
            entries: Vec::new(),
            touched: FxHashSet::default(),
        }
    }

    /// The discount schedule.
    pub fn params(&self) -> &D {
        &self.params
    }

    /// Number of information sets in the table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no information sets.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a policy without creating or touching it.
    pub fn get(&self, key: &[u8]) -> Option<&Policy> {
        self.index.get(key).map(|&i| &self.entries[i].1)
    }

    /// Iterate over `(key, policy)` pairs in creation order.
    pub fn iter_policies(&self) -> impl Iterator<Item = (&[u8], &Policy)> {
        self.entries.iter().map(|(k, p)| (k.as_slice(), p))
    }

    /// Infoset keys in creation order.
    pub fn keys(&self) -> impl Iterator<Item = &[u8]> {
        self.entries.iter().map(|(k, _)| k.as_slice())
    }

    /// Number of policies touched since the last update.
    pub fn num_touched(&self) -> usize {
        self.touched.len()
    }

    /// Average strategies of every information set, keyed by lossy UTF-8 key.
    pub fn export_average_strategies(&self) -> StrategyExport {
        let strategies = self
            .entries
            .iter()
            .map(|(k, p)| (String::from_utf8_lossy(k).into_owned(), p.average_strategy()))
            .collect();
        StrategyExport {
            iteration: self.iter,
            strategies,
        }
    }

    fn insert(&mut self, key: Vec<u8>, policy: Policy) -> usize {
        // Upsert: a repeated key replaces the earlier policy.
        match self.index.get(&key).copied() {
            Some(i) => {
                self.entries[i].1 = policy;
                i
            }
            None => {
                let i = self.entries.len();
                self.index.insert(key.clone(), i);
                self.entries.push((key, policy));
                i
            }
        }
    }
}

impl<D: DiscountSchedule> StrategyProfile for PolicyTable<D> {
    type Strategy = Policy;

    fn policy(&mut self, key: &[u8], num_actions: usize) -> Result<&mut Policy> {
        let i = match self.index.get(key).copied() {
            Some(i) => i,
            None => self.insert(key.to_vec(), Policy::new(num_actions)),
        };

        let stored = self.entries[i].1.num_actions();
        if stored != num_actions {
            return Err(SolverError::ActionCountMismatch {
                key: String::from_utf8_lossy(key).into_owned(),
                stored,
                requested: num_actions,
            });
        }

        self.touched.insert(i);
        Ok(&mut self.entries[i].1)
    }

    fn update(&mut self) {
        let (pos, neg, sum) = self.params.discount_factors(self.iter);
        for &i in &self.touched {
            self.entries[i].1.next_strategy(pos, neg, sum);
        }
        log::debug!(
            "iteration {}: updated {} of {} policies",
            self.iter,
            self.touched.len(),
            self.entries.len()
        );
        self.touched.clear();
        self.iter += 1;
    }

    fn iter(&self) -> u64 {
        self.iter
    }

    fn num_infosets(&self) -> usize {
        self.entries.len()
    }
}

impl<D: DiscountSchedule + Serialize> PolicyTable<D> {
    /// Serialize the table: header, discount params, iteration, entry count,
    /// then each `(key, policy)` pair.
    pub fn save<W: Write>(&self, mut writer: W) -> Result<()> {
        Header::new(RecordKind::PolicyTable).write(&mut writer)?;
        bincode::serialize_into(&mut writer, &self.params)?;
        bincode::serialize_into(&mut writer, &self.iter)?;
        bincode::serialize_into(&mut writer, &(self.entries.len() as u64))?;
        for (key, policy) in &self.entries {
            bincode::serialize_into(&mut writer, key)?;
            bincode::serialize_into(&mut writer, policy)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Write the table to `path`.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        log::info!("saving policy table ({} infosets) to {}", self.len(), path.display());
        self.save(BufWriter::new(File::create(path)?))
    }
}

impl<D: DiscountSchedule + DeserializeOwned> PolicyTable<D> {
    /// Deserialize a table written by [`PolicyTable::save`].
    ///
    /// The touched set starts empty. A key appearing twice keeps the later policy.
    pub fn load<R: Read>(mut reader: R) -> Result<Self> {
        Header::expect(&mut reader, RecordKind::PolicyTable)?;
        let params: D = bincode::deserialize_from(&mut reader)?;
        let iter: u64 = bincode::deserialize_from(&mut reader)?;
        let count: u64 = bincode::deserialize_from(&mut reader)?;

        let mut table = Self::new(params);
        table.iter = iter;
        for _ in 0..count {
            let key: Vec<u8> = bincode::deserialize_from(&mut reader)?;
            let policy: Policy = bincode::deserialize_from(&mut reader)?;
            table.insert(key, policy);
        }
        Ok(table)
    }

    /// Read a table from `path`.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let table = Self::load(BufReader::new(File::open(path)?))?;
        log::info!(
            "loaded policy table ({} infosets, iteration {}) from {}",
            table.len(),
            table.iter,
            path.display()
        );
        Ok(table)
    }
}

/// JSON-friendly snapshot of average strategies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyExport {
    /// Iteration the snapshot was taken at.
    pub iteration: u64,
    /// Average strategy per information set.
    pub strategies: std::collections::BTreeMap<String, Vec<f32>>,
}
