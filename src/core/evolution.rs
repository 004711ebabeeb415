//! The mutate/select loop.
//!
//! Each tick ranks the population by accuracy, picks a parent uniformly from
//! the top 30%, appends one mutated child, and keeps only the 50 most recent
//! nodes. There is no real training behind any of the numbers: accuracy
//! drifts upward through a skewed random walk and loss mirrors it.

#[cfg(not(feature = "std"))]
use alloc::{format, string::String, vec, vec::Vec};

use crate::node::{Activation, ArchitectureNode, Hyperparameters, Layer, ModelType, Optimizer};
use crate::prng::Prng;

/// Wall-clock cadence of the driving timer.
pub const TICK_INTERVAL_MS: u64 = 2_000;
/// Share of the population, best first, eligible as parents.
pub const PARENT_POOL_FRACTION: f64 = 0.3;
pub const MAX_POPULATION: usize = 50;

pub const ACCURACY_MIN: f64 = 0.10;
pub const ACCURACY_MAX: f64 = 0.99;
pub const LOSS_FLOOR: f64 = 0.01;

/// Accuracy delta is `(u - ACCURACY_SHIFT) * ACCURACY_SCALE` for `u` uniform
/// in [0, 1): in [-0.04, 0.06), positive 60% of the time.
pub const ACCURACY_SHIFT: f64 = 0.4;
pub const ACCURACY_SCALE: f64 = 0.1;
/// Loss moves against accuracy by this fraction of the accuracy delta.
pub const LOSS_DAMPING: f64 = 0.8;

/// A dense layer is inserted when a uniform draw exceeds this (30%).
pub const LAYER_INSERT_THRESHOLD: f64 = 0.7;
pub const DENSE_WIDTHS: [u32; 3] = [16, 32, 64];

/// The learning rate is rescaled when a uniform draw exceeds this (50%).
pub const LEARNING_RATE_MUTATE_THRESHOLD: f64 = 0.5;
pub const LEARNING_RATE_FACTOR_MIN: f64 = 0.8;
pub const LEARNING_RATE_FACTOR_MAX: f64 = 1.2;

pub const SEED_NODE_ID: &str = "gen0-node0";

/// Size of the parent pool for a population of `len` nodes.
pub fn parent_pool_size(len: usize) -> usize {
    // Truncation is floor for non-negative values.
    ((len as f64 * PARENT_POOL_FRACTION) as usize).max(1)
}

/// Indices of `nodes` ordered by accuracy, best first. Ties keep insertion
/// order.
pub fn rank_by_accuracy(nodes: &[ArchitectureNode]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..nodes.len()).collect();
    order.sort_by(|&a, &b| nodes[b].accuracy.total_cmp(&nodes[a].accuracy));
    order
}

/// Picks one parent uniformly from the top `parent_pool_size` nodes.
pub fn select_parent<'a>(
    nodes: &'a [ArchitectureNode],
    rng: &mut Prng,
) -> Option<&'a ArchitectureNode> {
    let ranked = rank_by_accuracy(nodes);
    let pool = &ranked[..parent_pool_size(nodes.len()).min(ranked.len())];
    pool.get(rng.gen_range_usize(0, pool.len()))
        .map(|&idx| &nodes[idx])
}

/// Generation-zero node: a small convolutional template with a randomized
/// baseline.
pub fn seed_node(rng: &mut Prng, now_ms: u64) -> ArchitectureNode {
    ArchitectureNode {
        id: String::from(SEED_NODE_ID),
        generation: 0,
        parent_id: None,
        accuracy: 0.6 + rng.next_f64_01() * 0.1,
        loss: 0.8 - rng.next_f64_01() * 0.1,
        energy_score: rng.gen_range_f64(50.0, 100.0),
        model_type: ModelType::Cnn,
        layers: vec![
            Layer::Conv2D {
                filters: 32,
                kernel_size: [3, 3],
                activation: Activation::Relu,
            },
            Layer::MaxPooling2D,
            Layer::Flatten,
            Layer::Dense {
                neurons: 10,
                activation: Activation::Softmax,
            },
        ],
        hyperparameters: Hyperparameters {
            learning_rate: 0.001,
            optimizer: Optimizer::Adam,
            epochs: 10,
            batch_size: 32,
            dropout: 0.2,
        },
        timestamp: now_ms,
    }
}

/// Derives one child from `parent`. The parent is only read.
pub fn mutate(
    parent: &ArchitectureNode,
    id: String,
    rng: &mut Prng,
    now_ms: u64,
) -> ArchitectureNode {
    let accuracy_delta = (rng.next_f64_01() - ACCURACY_SHIFT) * ACCURACY_SCALE;
    let accuracy = (parent.accuracy + accuracy_delta).clamp(ACCURACY_MIN, ACCURACY_MAX);
    let loss = (parent.loss - accuracy_delta * LOSS_DAMPING).max(LOSS_FLOOR);

    let mut layers = parent.layers.clone();
    if rng.next_f64_01() > LAYER_INSERT_THRESHOLD {
        let neurons = rng.choose(&DENSE_WIDTHS).copied().unwrap_or(DENSE_WIDTHS[0]);
        let at = layers.len().saturating_sub(1);
        layers.insert(
            at,
            Layer::Dense {
                neurons,
                activation: Activation::Relu,
            },
        );
    }

    let mut hyperparameters = parent.hyperparameters;
    if rng.next_f64_01() > LEARNING_RATE_MUTATE_THRESHOLD {
        hyperparameters.learning_rate *=
            rng.gen_range_f64(LEARNING_RATE_FACTOR_MIN, LEARNING_RATE_FACTOR_MAX);
    }

    ArchitectureNode {
        id,
        generation: parent.generation + 1,
        parent_id: Some(parent.id.clone()),
        accuracy,
        loss,
        energy_score: rng.gen_range_f64(20.0, 100.0),
        model_type: parent.model_type,
        layers,
        hyperparameters,
        timestamp: now_ms,
    }
}

/// Drops the oldest nodes until at most `MAX_POPULATION` remain.
pub fn prune(nodes: &mut Vec<ArchitectureNode>) {
    if nodes.len() > MAX_POPULATION {
        let excess = nodes.len() - MAX_POPULATION;
        nodes.drain(..excess);
    }
}

/// Owned simulation state: the population in creation order plus the
/// generator and id serial that produce new nodes.
#[derive(Debug, Clone)]
pub struct Evolution {
    nodes: Vec<ArchitectureNode>,
    rng: Prng,
    next_serial: u64,
}

impl Evolution {
    /// A fresh single-seed population, timestamped by the wall clock.
    #[cfg(feature = "std")]
    pub fn new(seed: u64) -> Self {
        Self::new_at(seed, crate::time::now_millis())
    }

    pub fn new_at(seed: u64, now_ms: u64) -> Self {
        let mut rng = Prng::new(seed);
        let seed = seed_node(&mut rng, now_ms);
        Self {
            nodes: vec![seed],
            rng,
            next_serial: 1,
        }
    }

    pub fn nodes(&self) -> &[ArchitectureNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn latest(&self) -> Option<&ArchitectureNode> {
        self.nodes.last()
    }

    pub fn get(&self, id: &str) -> Option<&ArchitectureNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    #[cfg(feature = "std")]
    pub fn tick(&mut self) -> &ArchitectureNode {
        self.tick_at(crate::time::now_millis())
    }

    /// Appends exactly one child and prunes to `MAX_POPULATION`. Returns the
    /// new node.
    pub fn tick_at(&mut self, now_ms: u64) -> &ArchitectureNode {
        let child = match select_parent(&self.nodes, &mut self.rng) {
            Some(parent) => {
                let id = format!("gen{}-node{}", parent.generation + 1, self.next_serial);
                mutate(parent, id, &mut self.rng, now_ms)
            }
            // Unreachable through this type's API; reseed rather than panic.
            None => seed_node(&mut self.rng, now_ms),
        };
        self.next_serial += 1;
        self.nodes.push(child);
        prune(&mut self.nodes);
        &self.nodes[self.nodes.len() - 1]
    }

    /// Discards the population and reseeds. The generator keeps its stream so
    /// successive runs differ.
    #[cfg(feature = "std")]
    pub fn reset(&mut self) {
        self.reset_at(crate::time::now_millis());
    }

    pub fn reset_at(&mut self, now_ms: u64) {
        self.nodes.clear();
        self.nodes.push(seed_node(&mut self.rng, now_ms));
        self.next_serial = 1;
    }
}
