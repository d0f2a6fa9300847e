//! # Edge Content Digest
//!
//! Content-addressed edge identity.
//!
//! An edge id is the lowercase hex SHA-256 of the JSON document
//! `{"type": t, "source_id": s, "target_id": o}` rendered with `", "` and
//! `": "` separators and ASCII-only output. The rendering is fixed so that
//! ids stay byte-compatible with identifiers already handed out to clients.
//!
//! ## Determinism
//!
//! `edge_id` is a pure function of its three arguments. Identical triples
//! always collapse onto the same id, whatever row or query produced them.

use sha2::{Digest, Sha256};

/// Compute the content hash of an edge triple.
#[must_use]
pub fn edge_id(edge_type: &str, source_id: &str, target_id: &str) -> String {
    let document = triple_document(edge_type, source_id, target_id);
    format!("{:x}", Sha256::digest(document.as_bytes()))
}

/// Render the hashed document for a triple.
fn triple_document(edge_type: &str, source_id: &str, target_id: &str) -> String {
    let mut out = String::with_capacity(48 + edge_type.len() + source_id.len() + target_id.len());
    out.push_str("{\"type\": ");
    push_json_string(&mut out, edge_type);
    out.push_str(", \"source_id\": ");
    push_json_string(&mut out, source_id);
    out.push_str(", \"target_id\": ");
    push_json_string(&mut out, target_id);
    out.push('}');
    out
}

/// Append `value` as an ASCII-only JSON string literal.
///
/// Everything outside printable ASCII becomes `\uXXXX` (lowercase hex),
/// with characters beyond the BMP written as surrogate pairs.
fn push_json_string(out: &mut String, value: &str) {
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{08}' => out.push_str("\\b"),
            '\u{0C}' => out.push_str("\\f"),
            ' '..='~' => out.push(c),
            _ => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    out.push_str(&format!("\\u{unit:04x}"));
                }
            }
        }
    }
    out.push('"');
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_edge_ids() {
        assert_eq!(
            edge_id("RO:0002212", "CHEBI:3215", "PR:000031567"),
            "c1065ac6f333c149fdfa1288aac06169b844e7b6af43536877e103e2a5089d37"
        );
        assert_eq!(
            edge_id("RO:0002212", "CHEBI:3215", "PR:0000317567"),
            "7d682dcbe995d90c08b24f382cea523dc4f9e82208a42d98180b911a34102914"
        );
        assert_eq!(
            edge_id("RO:0002213", "CHEBI:3215", "PR:000031567"),
            "170b4380ee9a11f69e37e245a48f4a4306c83c0d1774eeedfcec3746254421c1"
        );
    }

    #[test]
    fn document_layout() {
        assert_eq!(
            triple_document("RO:0002212", "CHEBI:3215", "PR:000031567"),
            r#"{"type": "RO:0002212", "source_id": "CHEBI:3215", "target_id": "PR:000031567"}"#
        );
    }

    #[test]
    fn non_ascii_and_control_characters_are_escaped() {
        let doc = triple_document("x", "\u{e9}", "a\u{7f}\"\n");
        assert_eq!(
            doc,
            r#"{"type": "x", "source_id": "\u00e9", "target_id": "a\u007f\"\n"}"#
        );
        assert_eq!(
            edge_id("x", "\u{e9}", "a\u{7f}\"\n"),
            "3ebbe0f845cc442766be8a0f810dd7851620f10f78deb260d0487c8851768f03"
        );
    }

    #[test]
    fn astral_characters_use_surrogate_pairs() {
        let mut out = String::new();
        push_json_string(&mut out, "\u{1F600}");
        assert_eq!(out, r#""\ud83d\ude00""#);
    }

    #[test]
    fn argument_order_matters() {
        assert_ne!(edge_id("a", "b", "c"), edge_id("a", "c", "b"));
        assert_ne!(edge_id("a", "b", "c"), edge_id("b", "a", "c"));
    }
}
