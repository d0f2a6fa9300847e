//! Per-match result bindings.
//!
//! Wire keys follow the reasoner message format: `qg_id` / `kg_id`, with
//! evidence flattened into the edge binding as indexed side-fields
//! (`publication_0`, `score_0`, ...).

use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;

/// Binds a query node to a knowledge graph node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeBinding {
    #[serde(rename = "qg_id")]
    pub query_node_id: String,
    #[serde(rename = "kg_id")]
    pub graph_node_id: String,
}

/// A supporting evidence record for an asserted edge.
///
/// Every field is optional: the store may know only part of the provenance.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EvidenceRecord {
    pub publication: Option<String>,
    pub score: Option<f64>,
    pub sentence: Option<String>,
    pub subject_spans: Option<String>,
    pub object_spans: Option<String>,
    pub provided_by: Option<String>,
}

/// Binds a query edge to a knowledge graph edge, with optional evidence.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EdgeBinding {
    pub query_edge_id: String,
    pub graph_edge_id: String,
    pub evidence: Vec<EvidenceRecord>,
}

impl EdgeBinding {
    /// Create a binding without evidence.
    #[must_use]
    pub fn new(query_edge_id: impl Into<String>, graph_edge_id: impl Into<String>) -> Self {
        Self {
            query_edge_id: query_edge_id.into(),
            graph_edge_id: graph_edge_id.into(),
            evidence: Vec::new(),
        }
    }
}

/// One match of the query graph against the knowledge graph.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QueryResult {
    pub node_bindings: Vec<NodeBinding>,
    pub edge_bindings: Vec<EdgeBinding>,
}

// =============================================================================
// EDGE BINDING WIRE FORMAT
// =============================================================================

const PUBLICATION: &str = "publication";
const SCORE: &str = "score";
const SENTENCE: &str = "sentence";
const SUBJECT_SPANS: &str = "subject_spans";
const OBJECT_SPANS: &str = "object_spans";
const PROVIDED_BY: &str = "provided_by";

impl Serialize for EdgeBinding {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("qg_id", &self.query_edge_id)?;
        map.serialize_entry("kg_id", &self.graph_edge_id)?;
        for (idx, record) in self.evidence.iter().enumerate() {
            let texts = [
                (PUBLICATION, &record.publication),
                (SENTENCE, &record.sentence),
                (SUBJECT_SPANS, &record.subject_spans),
                (OBJECT_SPANS, &record.object_spans),
                (PROVIDED_BY, &record.provided_by),
            ];
            if let Some(score) = record.score {
                map.serialize_entry(&format!("{SCORE}_{idx}"), &score)?;
            }
            for (field, value) in texts {
                if let Some(value) = value {
                    map.serialize_entry(&format!("{field}_{idx}"), value)?;
                }
            }
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for EdgeBinding {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut raw = BTreeMap::<String, serde_json::Value>::deserialize(deserializer)?;

        let mut take_id = |key: &'static str| -> Result<String, D::Error> {
            match raw.remove(key) {
                Some(serde_json::Value::String(s)) => Ok(s),
                Some(other) => Err(D::Error::custom(format!("{key} must be a string, got {other}"))),
                None => Err(D::Error::missing_field(key)),
            }
        };
        let query_edge_id = take_id("qg_id")?;
        let graph_edge_id = take_id("kg_id")?;

        let mut records: BTreeMap<usize, EvidenceRecord> = BTreeMap::new();
        for (key, value) in raw {
            let Some((field, idx)) = key.rsplit_once('_') else {
                continue;
            };
            let Ok(idx) = idx.parse::<usize>() else {
                continue;
            };
            let text = || match &value {
                serde_json::Value::String(s) => Some(s.clone()),
                serde_json::Value::Null => None,
                other => Some(other.to_string()),
            };
            let record = records.entry(idx).or_default();
            match field {
                PUBLICATION => record.publication = text(),
                SCORE => {
                    record.score = match &value {
                        serde_json::Value::Number(n) => n.as_f64(),
                        serde_json::Value::String(s) => s.parse().ok(),
                        _ => None,
                    }
                }
                SENTENCE => record.sentence = text(),
                SUBJECT_SPANS => record.subject_spans = text(),
                OBJECT_SPANS => record.object_spans = text(),
                PROVIDED_BY => record.provided_by = text(),
                _ => {}
            }
        }

        Ok(Self {
            query_edge_id,
            graph_edge_id,
            evidence: records.into_values().collect(),
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
