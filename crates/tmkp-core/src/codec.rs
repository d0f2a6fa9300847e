//! # Prefix/Identifier Codec
//!
//! Compacts full IRIs to `prefix:local` identifiers and expands them back,
//! against an ordered, versioned prefix table.
//!
//! ## Totality
//!
//! Both directions are pure and never fail. A value the table cannot
//! resolve comes back unchanged, so an unknown vocabulary term never blocks
//! the pipeline.
//!
//! ## Ordering
//!
//! Compaction uses the FIRST entry whose stem is a prefix of the IRI. Several
//! stems nest (`obo/` under `obo/CHEBI_`, `biolinkml/` over `biolinkml/meta/`),
//! so the entry order is part of the table's contract and is versioned.

use crate::primitives::DEFAULT_TABLE_VERSION;
use crate::types::TmkpError;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Built-in table entries, in match order.
const DEFAULT_PREFIXES: &[(&str, &str)] = &[
    ("BFO", "http://purl.obolibrary.org/obo/BFO_"),
    ("BIOGRID", "http://thebiogrid.org/"),
    ("BioSample", "http://example.org/UNKNOWN/BioSample/"),
    ("CAID", "http://example.org/UNKNOWN/CAID/"),
    ("CHEBI", "http://purl.obolibrary.org/obo/CHEBI_"),
    ("CHEMBL.COMPOUND", "http://identifiers.org/chembl.compound/"),
    ("CHEMBL.TARGET", "http://identifiers.org/chembl.target/"),
    ("CIO", "http://purl.obolibrary.org/obo/CIO_"),
    ("CIViC", "http://example.org/UNKNOWN/CIViC/"),
    ("CL", "http://purl.obolibrary.org/obo/CL_"),
    ("CLO", "http://purl.obolibrary.org/obo/CLO_"),
    ("ClinVar", "http://www.ncbi.nlm.nih.gov/clinvar/"),
    ("DBSNP", "http://identifiers.org/dbsnp/"),
    ("DOID", "http://purl.obolibrary.org/obo/DOID_"),
    ("DRUGBANK", "http://identifiers.org/drugbank/"),
    ("ECO", "http://purl.obolibrary.org/obo/ECO_"),
    ("ECTO", "http://example.org/UNKNOWN/ECTO/"),
    ("EFO", "http://purl.obolibrary.org/obo/EFO_"),
    ("ENSEMBL", "http://ensembl.org/id/"),
    ("ExO", "http://example.org/UNKNOWN/ExO/"),
    ("FAO", "http://purl.obolibrary.org/obo/FAO_"),
    ("GENO", "http://purl.obolibrary.org/obo/GENO_"),
    ("GO", "http://purl.obolibrary.org/obo/GO_"),
    ("GOLD.META", "http://identifiers.org/gold.meta/"),
    ("GTOPDB", "http://example.org/UNKNOWN/GTOPDB/"),
    ("HANCESTRO", "http://example.org/UNKNOWN/HANCESTRO/"),
    ("HGNC", "http://www.genenames.org/cgi-bin/gene_symbol_report?hgnc_id="),
    ("HGVS", "http://example.org/UNKNOWN/HGVS/"),
    ("HMDB", "http://www.hmdb.ca/metabolites/"),
    ("HP", "http://purl.obolibrary.org/obo/HP_"),
    ("IAO", "http://purl.obolibrary.org/obo/IAO_"),
    ("INCHI", "http://identifiers.org/inchi/"),
    ("INCHIKEY", "http://identifiers.org/inchikey/"),
    ("IUPHAR", "http://example.org/UNKNOWN/IUPHAR/"),
    ("IntAct", "http://example.org/UNKNOWN/IntAct/"),
    ("KEGG", "http://identifiers.org/kegg/"),
    ("MEDDRA", "http://purl.bioontology.org/ontology/MEDDRA/"),
    ("MGI", "http://www.informatics.jax.org/accession/MGI:"),
    ("MIR", "http://identifiers.org/mir/"),
    ("MONDO", "http://purl.obolibrary.org/obo/MONDO_"),
    ("MYVARIANT_HG19", "http://example.org/UNKNOWN/MYVARIANT_HG19/"),
    ("MYVARIANT_HG38", "http://example.org/UNKNOWN/MYVARIANT_HG38/"),
    ("NCBIGene", "http://www.ncbi.nlm.nih.gov/gene/"),
    ("NCIT", "http://purl.obolibrary.org/obo/NCIT_"),
    ("OBAN", "http://purl.org/oban/"),
    ("OBI", "http://purl.obolibrary.org/obo/OBI_"),
    ("OGMS", "http://purl.obolibrary.org/obo/OGMS_"),
    ("OIO", "http://www.geneontology.org/formats/oboInOwl#"),
    ("OMIM", "http://purl.obolibrary.org/obo/OMIM_"),
    ("ORPHANET", "http://identifiers.org/orphanet/"),
    ("PANTHER", "http://www.pantherdb.org/panther/family.do?clsAccession="),
    ("PMID", "http://www.ncbi.nlm.nih.gov/pubmed/"),
    ("PO", "http://purl.obolibrary.org/obo/PO_"),
    ("PR", "http://purl.obolibrary.org/obo/PR_"),
    ("PW", "http://purl.obolibrary.org/obo/PW_"),
    ("PomBase", "https://www.pombase.org/spombe/result/"),
    ("RHEA", "http://identifiers.org/rhea/"),
    ("RO", "http://purl.obolibrary.org/obo/RO_"),
    ("SGD", "https://www.yeastgenome.org/locus/"),
    ("SIO", "http://semanticscience.org/resource/SIO_"),
    ("SMPDB", "http://smpdb.ca/view/"),
    ("SO", "http://purl.obolibrary.org/obo/SO_"),
    ("UBERON", "http://purl.obolibrary.org/obo/UBERON_"),
    ("UMLS", "http://linkedlifedata.com/resource/umls/id/"),
    ("UMLSSC", "https://uts-ws.nlm.nih.gov/rest/semantic-network/semantic-network/current/TUI/"),
    ("UMLSSG", "https://uts-ws.nlm.nih.gov/rest/semantic-network/semantic-network/current/GROUP/"),
    ("UMLSST", "https://uts-ws.nlm.nih.gov/rest/semantic-network/semantic-network/current/STY/"),
    ("UNII", "http://fdasis.nlm.nih.gov/srs/unii/"),
    ("UPHENO", "http://purl.obolibrary.org/obo/UPHENO_"),
    ("UniProtKB", "http://identifiers.org/uniprot/"),
    ("VMC", "http://example.org/UNKNOWN/VMC/"),
    ("WB", "http://identifiers.org/wb/"),
    ("WD", "http://example.org/UNKNOWN/WD/"),
    ("WIKIPATHWAYS", "http://identifiers.org/wikipathways/"),
    ("ZFIN", "http://zfin.org/"),
    ("biolinkml", "https://w3id.org/biolink/biolinkml/"),
    ("dct", "http://example.org/UNKNOWN/dct/"),
    ("dcterms", "http://purl.org/dc/terms/"),
    ("dictyBase", "http://dictybase.org/gene/"),
    ("faldo", "http://biohackathon.org/resource/faldo#"),
    ("metatype", "https://w3id.org/biolink/biolinkml/type/"),
    ("owl", "http://www.w3.org/2002/07/owl#"),
    ("pav", "http://purl.org/pav/"),
    ("qud", "http://qudt.org/1.1/schema/qudt#"),
    ("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#"),
    ("rdfs", "http://www.w3.org/2000/01/rdf-schema#"),
    ("shex", "http://www.w3.org/ns/shex#"),
    ("skos", "https://www.w3.org/TR/skos-reference/#"),
    ("void", "http://rdfs.org/ns/void#"),
    ("wgs", "http://www.w3.org/2003/01/geo/wgs84_pos"),
    ("xsd", "http://www.w3.org/2001/XMLSchema#"),
    ("go", "http://www.geneontology.org/formats/oboInOwl#"),
    ("blml", "https://w3id.org/biolink/biolinkml/meta/"),
    ("bl", "https://w3id.org/biolink/vocab/"),
    ("EMAPA", "http://purl.obolibrary.org/obo/EMAPA_"),
    ("obo", "http://purl.obolibrary.org/obo/"),
    ("NCBIGENE", "http://identifiers.org/ncbigene:"),
    ("sesame", "http://www.openrdf.org/schema/sesame#"),
    ("prov", "http://www.w3.org/ns/prov#"),
    ("MESH", "http://id.nlm.nih.gov/mesh/"),
];

/// Ordered short-prefix <-> IRI-stem table.
///
/// Immutable once built; share it behind an `Arc` rather than cloning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixTable {
    version: String,
    entries: Vec<(String, String)>,
    by_prefix: BTreeMap<String, usize>,
}

impl Default for PrefixTable {
    fn default() -> Self {
        Self::from_entries(DEFAULT_TABLE_VERSION, DEFAULT_PREFIXES.iter().copied())
    }
}

impl PrefixTable {
    /// Create an empty table.
    #[must_use]
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            entries: Vec::new(),
            by_prefix: BTreeMap::new(),
        }
    }

    /// Build a table from ordered `(short, stem)` pairs.
    #[must_use]
    pub fn from_entries<S, T>(
        version: impl Into<String>,
        entries: impl IntoIterator<Item = (S, T)>,
    ) -> Self
    where
        S: Into<String>,
        T: Into<String>,
    {
        let mut table = Self::new(version);
        for (short, stem) in entries {
            table.push(short, stem);
        }
        table
    }

    /// Load a table from a TOML document.
    ///
    /// ```toml
    /// version = "local-1"
    ///
    /// [[prefix]]
    /// short = "CHEBI"
    /// stem = "http://purl.obolibrary.org/obo/CHEBI_"
    /// ```
    pub fn from_toml_str(text: &str) -> Result<Self, TmkpError> {
        let doc: TableDoc =
            toml::from_str(text).map_err(|e| TmkpError::Config(format!("prefix table: {e}")))?;
        if doc.version.trim().is_empty() {
            return Err(TmkpError::Config(
                "prefix table: version must not be empty".to_string(),
            ));
        }
        Ok(Self::from_entries(
            doc.version,
            doc.prefixes.into_iter().map(|p| (p.short, p.stem)),
        ))
    }

    /// Append an entry. Returns `false` (and changes nothing) when the
    /// prefix is already present: the first occurrence keeps its position.
    pub fn push(&mut self, short: impl Into<String>, stem: impl Into<String>) -> bool {
        let short = short.into();
        if self.by_prefix.contains_key(&short) {
            return false;
        }
        self.by_prefix.insert(short.clone(), self.entries.len());
        self.entries.push((short, stem.into()));
        true
    }

    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in match order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(s, t)| (s.as_str(), t.as_str()))
    }

    /// The stem registered for a prefix.
    #[must_use]
    pub fn stem(&self, short: &str) -> Option<&str> {
        self.by_prefix
            .get(short)
            .and_then(|&idx| self.entries.get(idx))
            .map(|(_, stem)| stem.as_str())
    }

    /// Compact an IRI to `short:local` using the first matching stem.
    ///
    /// Returns the IRI unchanged when no stem matches.
    #[must_use]
    pub fn compact(&self, iri: &str) -> String {
        self.split(iri)
            .map(|(short, local)| format!("{short}:{local}"))
            .unwrap_or_else(|| iri.to_string())
    }

    /// Expand `short:local` to a full IRI.
    ///
    /// Returns the input unchanged when it has no `:` or the prefix is
    /// unknown (it is then treated as already absolute).
    #[must_use]
    pub fn expand(&self, compact_id: &str) -> String {
        match compact_id.split_once(':') {
            Some((short, local)) => match self.stem(short) {
                Some(stem) => format!("{stem}{local}"),
                None => compact_id.to_string(),
            },
            None => compact_id.to_string(),
        }
    }

    /// The local part of an identifier.
    ///
    /// For an IRI the table can compact, this is the part after the prefix.
    /// Otherwise it is the text after the last `/` or `#`.
    #[must_use]
    pub fn local_name(&self, iri: &str) -> String {
        if let Some((_, local)) = self.split(iri) {
            return local.to_string();
        }
        iri.rsplit(['/', '#']).next().unwrap_or(iri).to_string()
    }

    fn split<'a>(&'a self, iri: &'a str) -> Option<(&'a str, &'a str)> {
        self.entries.iter().find_map(|(short, stem)| {
            iri.strip_prefix(stem.as_str())
                .map(|local| (short.as_str(), local))
        })
    }
}

#[derive(Debug, Deserialize)]
struct TableDoc {
    version: String,
    #[serde(default, rename = "prefix")]
    prefixes: Vec<PrefixDoc>,
}

#[derive(Debug, Deserialize)]
struct PrefixDoc {
    short: String,
    stem: String,
}

// =============================================================================
// DELIMITER CONVENTIONS
// =============================================================================

/// `gene_product` -> `GeneProduct`.
///
/// Uppercases the first character and every lowercase letter that follows
/// an underscore, dropping those underscores.
#[must_use]
pub fn snake_to_pascal(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut chars = name.chars().peekable();
    if let Some(first) = chars.next() {
        out.extend(first.to_uppercase());
    }
    while let Some(c) = chars.next() {
        match (c, chars.peek()) {
            ('_', Some(next)) if next.is_ascii_lowercase() => {
                let upper = next.to_ascii_uppercase();
                chars.next();
                out.push(upper);
            }
            _ => out.push(c),
        }
    }
    out
}

/// `GeneOrGeneProduct` -> `gene_or_gene_product`.
#[must_use]
pub fn pascal_to_snake(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut chars = name.chars();
    if let Some(first) = chars.next() {
        out.extend(first.to_lowercase());
    }
    for c in chars {
        if c.is_ascii_uppercase() {
            out.push('_');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_shape() {
        let table = PrefixTable::default();
        assert_eq!(table.len(), 100);
        assert_eq!(table.version(), DEFAULT_TABLE_VERSION);
        assert_eq!(table.entries().next(), Some(("BFO", "http://purl.obolibrary.org/obo/BFO_")));
    }

    #[test]
    fn compact_known_iri() {
        let table = PrefixTable::default();
        assert_eq!(
            table.compact("http://purl.obolibrary.org/obo/CHEBI_3215"),
            "CHEBI:3215"
        );
        assert_eq!(
            table.compact("http://purl.obolibrary.org/obo/RO_0002212"),
            "RO:0002212"
        );
    }

    #[test]
    fn compact_unknown_iri_is_identity() {
        let table = PrefixTable::default();
        assert_eq!(table.compact("urn:example:thing"), "urn:example:thing");
    }

    #[test]
    fn compact_uses_first_matching_stem() {
        let table = PrefixTable::default();
        // `obo:` also matches, but CHEBI comes first.
        assert_eq!(
            table.compact("http://purl.obolibrary.org/obo/CHEBI_1"),
            "CHEBI:1"
        );
        // Only the generic stem matches.
        assert_eq!(
            table.compact("http://purl.obolibrary.org/obo/ZZZ_1"),
            "obo:ZZZ_1"
        );
        // Same stem registered twice: the earlier prefix wins.
        assert_eq!(
            table.compact("http://www.geneontology.org/formats/oboInOwl#x"),
            "OIO:x"
        );
    }

    #[test]
    fn expand_known_and_unknown() {
        let table = PrefixTable::default();
        assert_eq!(
            table.expand("PR:000031567"),
            "http://purl.obolibrary.org/obo/PR_000031567"
        );
        assert_eq!(table.expand("NOPE:1"), "NOPE:1");
        assert_eq!(table.expand("plain"), "plain");
        assert_eq!(
            table.expand("MGI:MGI:12345"),
            "http://www.informatics.jax.org/accession/MGI:MGI:12345"
        );
    }

    #[test]
    fn duplicate_prefix_keeps_first_occurrence() {
        let mut table = PrefixTable::new("t");
        assert!(table.push("X", "http://a/"));
        assert!(!table.push("X", "http://b/"));
        assert_eq!(table.stem("X"), Some("http://a/"));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn local_name_variants() {
        let table = PrefixTable::default();
        assert_eq!(
            table.local_name("https://w3id.org/biolink/vocab/negatively_regulates_entity_to_entity"),
            "negatively_regulates_entity_to_entity"
        );
        assert_eq!(table.local_name("http://other.org/ns#Thing"), "Thing");
        assert_eq!(table.local_name("http://other.org/a/b"), "b");
        assert_eq!(table.local_name("bare"), "bare");
    }

    #[test]
    fn loads_toml_table() {
        let text = r#"
            version = "local-1"

            [[prefix]]
            short = "CHEBI"
            stem = "http://purl.obolibrary.org/obo/CHEBI_"

            [[prefix]]
            short = "obo"
            stem = "http://purl.obolibrary.org/obo/"
        "#;
        let table = PrefixTable::from_toml_str(text).expect("valid table");
        assert_eq!(table.version(), "local-1");
        assert_eq!(table.len(), 2);
        assert_eq!(table.compact("http://purl.obolibrary.org/obo/CHEBI_7"), "CHEBI:7");
    }

    #[test]
    fn toml_table_requires_version() {
        let err = PrefixTable::from_toml_str("[[prefix]]\nshort = \"a\"\nstem = \"b\"\n")
            .expect_err("missing version");
        assert!(matches!(err, TmkpError::Config(_)));
        let err = PrefixTable::from_toml_str("version = \" \"\n").expect_err("blank version");
        assert!(matches!(err, TmkpError::Config(_)));
    }

    #[test]
    fn delimiter_conventions() {
        assert_eq!(snake_to_pascal("gene_product"), "GeneProduct");
        assert_eq!(snake_to_pascal("chemical_substance"), "ChemicalSubstance");
        assert_eq!(snake_to_pascal("gene"), "Gene");
        assert_eq!(snake_to_pascal(""), "");
        assert_eq!(pascal_to_snake("GeneOrGeneProduct"), "gene_or_gene_product");
        assert_eq!(pascal_to_snake("NamedThing"), "named_thing");
        assert_eq!(pascal_to_snake(""), "");
    }
}
