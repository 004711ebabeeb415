//! Control protocol spoken between `genesisd` and its clients.
//!
//! One JSON object per line in each direction, tagged by `type`:
//!
//! ```text
//! -> {"type":"Start"}
//! <- {"type":"Success","message":"Started"}
//! -> {"type":"GetNode","id":"gen3-node7"}
//! <- {"type":"Node","id":"gen3-node7","generation":3,...}
//! ```

#[cfg(not(feature = "std"))]
use alloc::{string::String, vec::Vec};

use serde::{Deserialize, Serialize};

use crate::node::ArchitectureNode;
use crate::observer::PopulationSummary;

pub const DEFAULT_ADDR: &str = "127.0.0.1:9877";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    GetState,
    GetSummary,
    GetNode { id: String },
    GetLineage { id: String },
    Start,
    Stop,
    Reset,
    Shutdown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Response {
    State(StateSnapshot),
    Summary(PopulationSummary),
    Node(ArchitectureNode),
    Lineage { nodes: Vec<ArchitectureNode> },
    Success { message: String },
    Error { message: String },
}

impl Response {
    pub fn success(message: impl Into<String>) -> Self {
        Response::Success {
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Response::Error {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub running: bool,
    pub nodes: Vec<ArchitectureNode>,
    pub summary: PopulationSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lineage_and_error_responses_round_trip_owned_data() {
        let json = serde_json::to_string(&Response::Lineage { nodes: Vec::new() }).unwrap();
        assert_eq!(json, r#"{"type":"Lineage","nodes":[]}"#);

        let err: Response =
            serde_json::from_str(r#"{"type":"Error","message":"Unknown node x"}"#).unwrap();
        assert_eq!(err, Response::error(String::from("Unknown node x")));
    }

    #[test]
    fn requests_use_type_tag() {
        let line = serde_json::to_string(&Request::GetNode {
            id: "gen1-node1".to_string(),
        })
        .unwrap();
        assert_eq!(line, r#"{"type":"GetNode","id":"gen1-node1"}"#);

        let parsed: Request = serde_json::from_str(r#"{"type":"Reset"}"#).unwrap();
        assert_eq!(parsed, Request::Reset);
    }

    #[test]
    fn unknown_request_type_is_rejected() {
        assert!(serde_json::from_str::<Request>(r#"{"type":"Explode"}"#).is_err());
        assert!(serde_json::from_str::<Request>("not json").is_err());
    }

    #[test]
    fn newtype_responses_flatten_into_the_envelope() {
        let json = serde_json::to_value(Response::Summary(PopulationSummary {
            size: 3,
            max_generation: 2,
            best_id: Some("gen2-node2".to_string()),
            best_accuracy: 0.75,
            mean_accuracy: 0.5,
            min_loss: 0.25,
            latest_id: Some("gen2-node2".to_string()),
        }))
        .unwrap();
        assert_eq!(json["type"], "Summary");
        assert_eq!(json["size"], 3);
        assert_eq!(json["best_id"], "gen2-node2");

        let back: Response = serde_json::from_value(json).unwrap();
        assert!(matches!(back, Response::Summary(s) if s.size == 3));
    }
}
