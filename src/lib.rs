//! # genesis
//!
//! A simulated neural-architecture search: a bounded population of candidate
//! architectures that grows by one mutated child per tick.
//!
//! Nothing is trained. Accuracy follows a random walk skewed towards
//! improvement, loss mirrors it, and selection only ever looks at accuracy.
//! The numbers exist to animate dashboards.
//!
//! ## Quick Start
//!
//! ```
//! use genesis::prelude::*;
//!
//! let mut evo = Evolution::new_at(42, 0);
//! for t in 1..=60 {
//!     evo.tick_at(t * TICK_INTERVAL_MS);
//! }
//! assert_eq!(evo.len(), MAX_POPULATION);
//!
//! let summary = PopulationAdapter::new(evo.nodes()).summary();
//! assert!(summary.best_accuracy <= 0.99);
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): wall-clock timestamps (`Evolution::new`, `tick`, `reset`)
//! - `serde` (default): serialization and the [`protocol`] module
//!
//! ## no_std Support
//!
//! Without `std` the crate needs only `alloc`; pass timestamps explicitly with
//! the `*_at` methods.
//!
//! ## Modules
//!
//! - [`node`]: population data model
//! - [`evolution`]: selection, mutation, pruning
//! - [`observer`]: read-only summaries and lineage for the presentation layer
//! - [`protocol`]: daemon control messages

// no_std support; unit tests always link std.
#![cfg_attr(all(not(feature = "std"), not(test)), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

#[path = "core/prng.rs"]
pub mod prng;

#[path = "core/node.rs"]
pub mod node;

#[path = "core/evolution.rs"]
pub mod evolution;

#[cfg(feature = "std")]
#[path = "core/time.rs"]
pub mod time;

pub mod observer;

#[cfg(feature = "serde")]
pub mod protocol;

/// Prelude module for convenient imports.
///
/// ```
/// use genesis::prelude::*;
/// ```
pub mod prelude {
    pub use crate::evolution::{Evolution, MAX_POPULATION, TICK_INTERVAL_MS};
    pub use crate::node::{
        Activation, ArchitectureNode, Hyperparameters, Layer, ModelType, Optimizer,
    };
    pub use crate::observer::{MetricPoint, PopulationAdapter, PopulationSummary};
    pub use crate::prng::Prng;
}
