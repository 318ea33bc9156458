//! Training loop around a traversal engine.
//!
//! A [`Trainer`] alternates `run` and `update` for a number of iterations,
//! keeps [`CfrStats`], and can checkpoint the strategy profile to disk at a
//! fixed interval so long runs can be resumed.

use std::path::{Path, PathBuf};
use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use crate::cfr::config::CfrStats;
use crate::cfr::discount::DiscountSchedule;
use crate::cfr::game::GameTreeNode;
use crate::cfr::sampler::Sampler;
use crate::cfr::table::{PolicyTable, StrategyProfile};
use crate::error::Result;

/// A strategy profile that can be written to a checkpoint file.
pub trait Checkpoint {
    /// Write the profile to `path`, replacing any existing file.
    fn checkpoint(&self, path: &Path) -> Result<()>;
}

impl<D: DiscountSchedule + Serialize> Checkpoint for PolicyTable<D> {
    fn checkpoint(&self, path: &Path) -> Result<()> {
        // Write beside the target, then rename, so a crash never leaves a torn file.
        let tmp = path.with_extension("tmp");
        self.save_to_file(&tmp)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }
}

/// Drives a [`Sampler`] for many iterations.
pub struct Trainer<S> {
    sampler: S,
    stats: CfrStats,
    checkpoint: Option<(PathBuf, u64)>,
    progress: bool,
}

impl<S> Trainer<S>
where
    S: Sampler,
    S::Profile: Checkpoint,
{
    /// Wrap an engine.
    pub fn new(sampler: S) -> Self {
        Self {
            sampler,
            stats: CfrStats::new(),
            checkpoint: None,
            progress: false,
        }
    }

    /// Save the profile to `path` every `interval` iterations and at the end
    /// of each training call.
    pub fn with_checkpoint<P: Into<PathBuf>>(mut self, path: P, interval: u64) -> Self {
        self.checkpoint = Some((path.into(), interval.max(1)));
        self
    }

    /// Show a progress bar on stderr while training.
    pub fn with_progress(mut self, enable: bool) -> Self {
        self.progress = enable;
        self
    }

    /// Train for `iterations` iterations. `root` builds a fresh root node for
    /// each traversal.
    pub fn train<N, F>(&mut self, root: F, iterations: u64) -> Result<&CfrStats>
    where
        N: GameTreeNode,
        F: FnMut() -> N,
    {
        self.train_with_callback(root, iterations, 0, |_, _| {})
    }

    /// Train with a callback invoked every `callback_interval` iterations
    /// (never if the interval is 0).
    pub fn train_with_callback<N, F, C>(
        &mut self,
        mut root: F,
        iterations: u64,
        callback_interval: u64,
        mut callback: C,
    ) -> Result<&CfrStats>
    where
        N: GameTreeNode,
        F: FnMut() -> N,
        C: FnMut(&CfrStats, &S::Profile),
    {
        log::info!(
            "training {} iterations from iteration {}",
            iterations,
            self.sampler.profile().iter()
        );

        let bar = self.progress_bar(iterations);
        let start = Instant::now();
        let mut reported = 0.0;

        for i in 1..=iterations {
            let value = self.sampler.run(root())?;
            self.sampler.profile_mut().update();
            self.stats.record_value(value);

            if callback_interval > 0 && i % callback_interval == 0 {
                self.refresh(start, &mut reported);
                callback(&self.stats, self.sampler.profile());
            }

            if let Some((path, interval)) = &self.checkpoint {
                if i % *interval == 0 {
                    log::debug!("checkpoint at iteration {}", self.sampler.profile().iter());
                    self.sampler.profile().checkpoint(path)?;
                }
            }

            if let Some(bar) = &bar {
                bar.inc(1);
            }
        }

        if let Some(bar) = bar {
            bar.finish_and_clear();
        }
        if let Some((path, _)) = &self.checkpoint {
            self.sampler.profile().checkpoint(path)?;
        }

        self.refresh(start, &mut reported);
        log::info!(
            "trained to iteration {}: {} infosets, {:.0} it/s, mean value {:.4}",
            self.sampler.profile().iter(),
            self.stats.info_sets,
            self.stats.iterations_per_second,
            self.stats.mean_value
        );
        Ok(&self.stats)
    }

    /// Bring elapsed time and infoset count up to date. `reported` is the
    /// part of this call's elapsed time already folded into the stats.
    fn refresh(&mut self, start: Instant, reported: &mut f64) {
        let elapsed = start.elapsed().as_secs_f64();
        self.stats.elapsed_seconds += elapsed - *reported;
        *reported = elapsed;
        self.stats.update_rate();
        self.stats.info_sets = self.sampler.profile().num_infosets();
    }

    fn progress_bar(&self, iterations: u64) -> Option<ProgressBar> {
        if !self.progress {
            return None;
        }
        let bar = ProgressBar::new(iterations);
        let style = ProgressStyle::with_template("{bar:40} {pos}/{len} [{elapsed_precise}] {per_sec}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style);
        Some(bar)
    }

    /// Statistics accumulated over every training call.
    pub fn stats(&self) -> &CfrStats {
        &self.stats
    }

    /// The wrapped engine.
    pub fn sampler(&self) -> &S {
        &self.sampler
    }

    /// The strategy profile being trained.
    pub fn profile(&self) -> &S::Profile {
        self.sampler.profile()
    }

    /// Consume the trainer, returning the engine.
    pub fn into_sampler(self) -> S {
        self.sampler
    }
}
