//! # SPARQL Rendering
//!
//! Shared vocabulary and text rendering for every query the core emits:
//! the structural query, relation and evidence lookups, and the detail
//! queries.
//!
//! Query text is write-only here. Nothing in the crate parses it back.

use crate::codec::PrefixTable;
use crate::types::Binding;

// =============================================================================
// VOCABULARY
// =============================================================================

pub const RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
pub const RDFS: &str = "http://www.w3.org/2000/01/rdf-schema#";
pub const SESAME: &str = "http://www.openrdf.org/schema/sesame#";
pub const BL: &str = "https://w3id.org/biolink/vocab/";
pub const BLML: &str = "https://w3id.org/biolink/biolinkml/meta/";
/// Namespace of the store's own index and evidence properties.
pub const TMP: &str = "http://translator/text_mining_provider/";

/// Predicate linking a vocabulary slot to the concrete relations that
/// implement it.
pub const SLOT_MAPPING: &str = "http://translator/text_mining_provider/slot_mapping";

/// Namespaces declared at the top of every emitted query, in header order.
const VOCABULARY: [(&str, &str); 6] = [
    ("bl", BL),
    ("blml", BLML),
    ("rdf", RDF),
    ("rdfs", RDFS),
    ("sesame", SESAME),
    ("tmp", TMP),
];

// =============================================================================
// TERMS
// =============================================================================

/// Render an identifier as an IRI term, expanding it through the table.
///
/// Told blank nodes (`_:label`) are written as `<_:label>`.
#[must_use]
pub fn resource(table: &PrefixTable, id: &str) -> String {
    if id.starts_with("_:") {
        return format!("<{id}>");
    }
    format!("<{}>", table.expand(id))
}

/// Render a bound row value back into query text.
///
/// Store-reported blank nodes use the told-bnode form `<_:label>`.
#[must_use]
pub fn row_term(binding: &Binding) -> String {
    if binding.is_literal() {
        literal(&binding.value)
    } else if binding.is_blank() && !binding.value.starts_with("_:") {
        format!("<_:{}>", binding.value)
    } else {
        format!("<{}>", binding.value)
    }
}

/// Render a quoted string literal.
#[must_use]
pub fn literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

// =============================================================================
// QUERY WRITER
// =============================================================================

/// Incremental builder for query text.
///
/// Every query starts with the vocabulary `PREFIX` header and a blank line.
#[derive(Debug)]
pub struct QueryWriter {
    out: String,
    depth: usize,
}

impl Default for QueryWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryWriter {
    #[must_use]
    pub fn new() -> Self {
        let mut out = String::with_capacity(1024);
        for (short, stem) in VOCABULARY {
            out.push_str("PREFIX ");
            out.push_str(short);
            out.push_str(": <");
            out.push_str(stem);
            out.push_str(">\n");
        }
        out.push('\n');
        Self { out, depth: 0 }
    }

    /// `SELECT DISTINCT ?a ?b WHERE {`, variables written in the given order.
    pub fn select<I, S>(&mut self, variables: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.out.push_str("SELECT DISTINCT");
        for var in variables {
            self.out.push_str(" ?");
            self.out.push_str(var.as_ref());
        }
        self.out.push_str(" WHERE {\n");
        self.depth = 1;
    }

    /// One pattern line at the current depth.
    pub fn line(&mut self, text: &str) {
        for _ in 0..self.depth {
            self.out.push_str("  ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    /// Open a nested group: `OPTIONAL {`, `VALUES ?x {`, ...
    pub fn open(&mut self, head: &str) {
        self.line(&format!("{head} {{"));
        self.depth += 1;
    }

    /// Close the innermost group.
    pub fn close(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.line("}");
    }

    /// Close the `WHERE` block and append an optional result cap.
    #[must_use]
    pub fn finish(mut self, limit: Option<u64>) -> String {
        while self.depth > 0 {
            self.close();
        }
        if let Some(limit) = limit {
            self.out.push_str(&format!("LIMIT {limit}\n"));
        }
        self.out
    }
}

// =============================================================================
// TESTS
// =============================================================================
