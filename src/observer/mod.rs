#[cfg(not(feature = "std"))]
use alloc::{string::String, vec::Vec};

use hashbrown::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::node::ArchitectureNode;

/// Headline numbers for a published population.
///
/// Design intent:
/// - Observers never mutate or steer the simulation.
/// - Everything here is derived on demand from a node slice; nothing is cached.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PopulationSummary {
    pub size: usize,
    pub max_generation: u32,
    pub best_id: Option<String>,
    pub best_accuracy: f64,
    pub mean_accuracy: f64,
    pub min_loss: f64,
    /// Most recently created node; the default selection for detail views.
    pub latest_id: Option<String>,
}

/// One chart point per node, in creation order.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MetricPoint {
    pub generation: u32,
    pub accuracy: f64,
    pub loss: f64,
    pub energy_score: f64,
}

pub struct PopulationAdapter<'a> {
    nodes: &'a [ArchitectureNode],
}

impl<'a> PopulationAdapter<'a> {
    pub fn new(nodes: &'a [ArchitectureNode]) -> Self {
        Self { nodes }
    }

    /// Highest accuracy; the earliest node wins a tie.
    pub fn best(&self) -> Option<&'a ArchitectureNode> {
        self.nodes
            .iter()
            .fold(None, |best: Option<&ArchitectureNode>, n| match best {
                Some(b) if b.accuracy >= n.accuracy => Some(b),
                _ => Some(n),
            })
    }

    pub fn latest(&self) -> Option<&'a ArchitectureNode> {
        self.nodes.last()
    }

    pub fn summary(&self) -> PopulationSummary {
        if self.nodes.is_empty() {
            return PopulationSummary::default();
        }
        let best = self.best();
        let total: f64 = self.nodes.iter().map(|n| n.accuracy).sum();
        PopulationSummary {
            size: self.nodes.len(),
            max_generation: self.nodes.iter().map(|n| n.generation).max().unwrap_or(0),
            best_id: best.map(|n| n.id.clone()),
            best_accuracy: best.map_or(0.0, |n| n.accuracy),
            mean_accuracy: total / self.nodes.len() as f64,
            min_loss: self
                .nodes
                .iter()
                .map(|n| n.loss)
                .fold(f64::INFINITY, f64::min),
            latest_id: self.latest().map(|n| n.id.clone()),
        }
    }

    /// The node with `id` followed by its ancestors, nearest first. The walk
    /// stops at the seed or at the first ancestor already pruned away.
    pub fn lineage(&self, id: &str) -> Vec<&'a ArchitectureNode> {
        // Later nodes overwrite earlier ones on an id clash.
        let by_id: HashMap<&str, &'a ArchitectureNode> =
            self.nodes.iter().map(|n| (n.id.as_str(), n)).collect();

        let mut chain = Vec::new();
        let mut cursor = by_id.get(id).copied();
        while let Some(node) = cursor {
            chain.push(node);
            // Generations strictly decrease along a real chain; anything else is
            // an id clash and would loop.
            cursor = node
                .parent_id
                .as_deref()
                .and_then(|p| by_id.get(p).copied())
                .filter(|p| p.generation < node.generation);
        }
        chain
    }

    pub fn metric_series(&self) -> Vec<MetricPoint> {
        self.nodes
            .iter()
            .map(|n| MetricPoint {
                generation: n.generation,
                accuracy: n.accuracy,
                loss: n.loss,
                energy_score: n.energy_score,
            })
            .collect()
    }
}
