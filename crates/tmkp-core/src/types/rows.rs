//! Tabular result rows as returned by the external query executor.
//!
//! Shape: `{variable_name: {type: "uri" | "literal" | "bnode", value: ...}}`.

use super::TmkpError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single bound value in a solution row.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Binding {
    /// Term kind reported by the store (`uri`, `literal`, `bnode`, ...).
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub value: String,
}

impl Binding {
    /// An IRI binding.
    #[must_use]
    pub fn uri(value: impl Into<String>) -> Self {
        Self {
            kind: Some("uri".to_string()),
            value: value.into(),
        }
    }

    /// A literal binding.
    #[must_use]
    pub fn literal(value: impl Into<String>) -> Self {
        Self {
            kind: Some("literal".to_string()),
            value: value.into(),
        }
    }

    /// A blank node binding, labelled without the `_:` marker.
    #[must_use]
    pub fn bnode(label: impl Into<String>) -> Self {
        Self {
            kind: Some("bnode".to_string()),
            value: label.into(),
        }
    }

    /// Whether the store reported the value as a blank node.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.kind.as_deref() == Some("bnode")
    }

    /// Whether the value is a literal rather than a resource.
    #[must_use]
    pub fn is_literal(&self) -> bool {
        matches!(self.kind.as_deref(), Some("literal" | "typed-literal"))
    }
}

/// One match produced by the store: variable name -> bound value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SolutionRow(pub BTreeMap<String, Binding>);

impl SolutionRow {
    /// Create an empty row.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, variable: impl Into<String>, binding: Binding) -> Self {
        self.0.insert(variable.into(), binding);
        self
    }

    /// The binding for a variable, if bound.
    #[must_use]
    pub fn get(&self, variable: &str) -> Option<&Binding> {
        self.0.get(variable)
    }

    /// The bound value for a variable, if bound.
    #[must_use]
    pub fn value(&self, variable: &str) -> Option<&str> {
        self.0.get(variable).map(|b| b.value.as_str())
    }

    /// The binding for a variable the decoder cannot do without.
    ///
    /// `row` is the row's position, reported in the error.
    pub fn require(&self, variable: &str, row: usize) -> Result<&Binding, TmkpError> {
        self.0.get(variable).ok_or_else(|| TmkpError::Decoding {
            row,
            variable: variable.to_string(),
        })
    }
}

/// `head` section of a SPARQL JSON results document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResultsHead {
    #[serde(default)]
    pub vars: Vec<String>,
}

/// `results` section of a SPARQL JSON results document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResultsBody {
    #[serde(default)]
    pub bindings: Vec<SolutionRow>,
}

/// A full SPARQL JSON results document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SparqlResults {
    #[serde(default)]
    pub head: ResultsHead,
    #[serde(default)]
    pub results: ResultsBody,
}

impl SparqlResults {
    /// Parse a results document from JSON bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, TmkpError> {
        serde_json::from_slice(bytes).map_err(|e| TmkpError::Serialization(e.to_string()))
    }

    /// Consume the document, keeping only the rows.
    #[must_use]
    pub fn into_rows(self) -> Vec<SolutionRow> {
        self.results.bindings
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_store_document() {
        let body = br#"{
            "head": {"vars": ["e0", "n0_type"]},
            "results": {"bindings": [
                {"e0": {"type": "uri", "value": "http://purl.obolibrary.org/obo/RO_0002212"},
                 "n0_type": {"type": "uri", "value": "http://purl.obolibrary.org/obo/CHEBI_3215"}}
            ]}
        }"#;
        let rows = SparqlResults::from_slice(body).expect("parse").into_rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0].value("e0"),
            Some("http://purl.obolibrary.org/obo/RO_0002212")
        );
    }

    #[test]
    fn extra_binding_fields_are_ignored() {
        let json = r#"{"label": {"type": "literal", "xml:lang": "en", "value": "bupivacaine"}}"#;
        let row: SolutionRow = serde_json::from_str(json).expect("parse");
        let label = row.get("label").expect("label");
        assert!(label.is_literal());
        assert_eq!(label.value, "bupivacaine");
    }

    #[test]
    fn require_reports_row_and_variable() {
        let row = SolutionRow::new().with("e0", Binding::uri("x"));
        assert!(row.require("e0", 3).is_ok());
        let err = row.require("n0_type", 3).expect_err("missing");
        assert!(matches!(
            err,
            TmkpError::Decoding { row: 3, ref variable } if variable == "n0_type"
        ));
    }

    #[test]
    fn malformed_document_is_serialization_error() {
        let err = SparqlResults::from_slice(b"not json").expect_err("invalid");
        assert!(matches!(err, TmkpError::Serialization(_)));
    }
}
