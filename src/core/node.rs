//! Population data model: one simulated candidate architecture per node.
//!
//! Nodes are immutable once created. A child is derived from a deep copy of
//! its parent's layers and a copy of its hyperparameters; the parent is never
//! touched.

#[cfg(not(feature = "std"))]
use alloc::{string::String, vec::Vec};

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ModelType {
    #[cfg_attr(feature = "serde", serde(rename = "CNN"))]
    Cnn,
    #[cfg_attr(feature = "serde", serde(rename = "RNN"))]
    Rnn,
    Transformer,
    #[cfg_attr(feature = "serde", serde(rename = "MLP"))]
    Mlp,
}

impl ModelType {
    pub fn as_str(self) -> &'static str {
        match self {
            ModelType::Cnn => "CNN",
            ModelType::Rnn => "RNN",
            ModelType::Transformer => "Transformer",
            ModelType::Mlp => "MLP",
        }
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Activation {
    Relu,
    Softmax,
}

/// One layer descriptor. The `type` tag names the layer kind; the remaining
/// fields only exist for the kinds that use them.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type"))]
pub enum Layer {
    Conv2D {
        filters: u32,
        kernel_size: [u32; 2],
        activation: Activation,
    },
    MaxPooling2D,
    Flatten,
    Dense {
        neurons: u32,
        activation: Activation,
    },
}

impl Layer {
    pub fn kind(&self) -> &'static str {
        match self {
            Layer::Conv2D { .. } => "Conv2D",
            Layer::MaxPooling2D => "MaxPooling2D",
            Layer::Flatten => "Flatten",
            Layer::Dense { .. } => "Dense",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Optimizer {
    Adam,
    #[cfg_attr(feature = "serde", serde(rename = "SGD"))]
    Sgd,
    #[cfg_attr(feature = "serde", serde(rename = "RMSprop"))]
    RmsProp,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Hyperparameters {
    pub learning_rate: f64,
    pub optimizer: Optimizer,
    pub epochs: u32,
    pub batch_size: u32,
    pub dropout: f64,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ArchitectureNode {
    /// `gen{generation}-node{serial}`. Lineage is tracked through
    /// `parent_id`; nothing relies on ids being unique.
    pub id: String,
    pub generation: u32,
    pub parent_id: Option<String>,
    /// In [0.10, 0.99] for every mutated node.
    pub accuracy: f64,
    /// At least 0.01 for every mutated node.
    pub loss: f64,
    /// Cosmetic. Never used for selection.
    pub energy_score: f64,
    pub model_type: ModelType,
    pub layers: Vec<Layer>,
    pub hyperparameters: Hyperparameters,
    /// Creation time, milliseconds since the Unix epoch.
    pub timestamp: u64,
}

impl ArchitectureNode {
    pub fn is_seed(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn depth(&self) -> usize {
        self.layers.len()
    }
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;

    #[test]
    fn layers_serialize_with_type_tag() {
        let layer = Layer::Dense {
            neurons: 32,
            activation: Activation::Relu,
        };
        let json = serde_json::to_value(&layer).unwrap();
        assert_eq!(json["type"], "Dense");
        assert_eq!(json["neurons"], 32);
        assert_eq!(json["activation"], "relu");

        let pool = serde_json::to_value(Layer::MaxPooling2D).unwrap();
        assert_eq!(pool, serde_json::json!({ "type": "MaxPooling2D" }));
    }

    #[test]
    fn node_uses_presentation_field_names() {
        let node = ArchitectureNode {
            id: "gen1-node1".to_string(),
            generation: 1,
            parent_id: Some("gen0-node0".to_string()),
            accuracy: 0.75,
            loss: 0.625,
            energy_score: 42.0,
            model_type: ModelType::Cnn,
            layers: vec![Layer::Flatten],
            hyperparameters: Hyperparameters {
                learning_rate: 0.0078125,
                optimizer: Optimizer::RmsProp,
                epochs: 10,
                batch_size: 32,
                dropout: 0.25,
            },
            timestamp: 1,
        };
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["parentId"], "gen0-node0");
        assert_eq!(json["energyScore"], 42.0);
        assert_eq!(json["modelType"], "CNN");
        assert_eq!(json["hyperparameters"]["optimizer"], "RMSprop");
        assert_eq!(json["hyperparameters"]["learning_rate"], 0.0078125);

        let back: ArchitectureNode = serde_json::from_value(json).unwrap();
        assert_eq!(back, node);
        assert!(!back.is_seed());
    }
}
