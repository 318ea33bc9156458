//! Persistent reservoir sampling of training examples.
//!
//! A [`ReservoirBuffer`] keeps a bounded, uniformly random subset of an
//! unbounded stream of samples (for example advantage targets collected
//! during traversals) in an on-disk ordered store, so the subset can exceed
//! memory and survive restarts.
//!
//! ```no_run
//! use mccfr_solver::reservoir::{ReservoirBuffer, StoreOptions};
//!
//! let buffer: ReservoirBuffer<Vec<f32>> =
//!     ReservoirBuffer::new("/tmp/advantages", StoreOptions::default(), 1_000_000)?;
//! buffer.add_sample(&vec![0.25, -0.25])?;
//! buffer.save_metadata_to_file("/tmp/advantages.meta")?;
//!
//! // Later, possibly in another process:
//! let resumed: ReservoirBuffer<Vec<f32>> = ReservoirBuffer::load_from_file("/tmp/advantages.meta")?;
//! assert_eq!(resumed.count(), 1);
//! # Ok::<(), mccfr_solver::SolverError>(())
//! ```

pub mod buffer;
pub mod store;
pub mod varint;

pub use buffer::{ReservoirBuffer, ReservoirMetadata};
pub use store::{StoreMode, StoreOptions};
