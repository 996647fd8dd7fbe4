//! Read access to the PharmGKB reference store.
//!
//! Entity workflows only talk to the [`ReferenceStore`] trait; the SQLite implementation lives in
//! [`sqlite`] and the TSV loader that builds its tables in [`ingest`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::LookupError;

pub mod ingest;
pub mod sqlite;

/// Entity tables a search term can be classified against, in classification priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityCategory {
    Gene,
    Drug,
    Chemical,
    Phenotype,
}

impl EntityCategory {
    pub const PRIORITY: [EntityCategory; 4] = [
        EntityCategory::Gene,
        EntityCategory::Drug,
        EntityCategory::Chemical,
        EntityCategory::Phenotype,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Gene => "gene",
            Self::Drug => "drug",
            Self::Chemical => "chemical",
            Self::Phenotype => "phenotype",
        }
    }
}

/// Target type of a relationship edge; types no traversal follows parse as `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeTarget {
    Gene,
    Chemical,
    Disease,
    Phenotype,
    Other,
}

impl EdgeTarget {
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "Gene" => Self::Gene,
            "Chemical" => Self::Chemical,
            "Disease" => Self::Disease,
            "Phenotype" => Self::Phenotype,
            _ => Self::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipEdge {
    pub source_id: String,
    pub target_id: String,
    pub target_type: EdgeTarget,
    pub target_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneRecord {
    pub accession_id: String,
    pub name: String,
    pub symbol: String,
}

/// Side-effect and dosing text of one drug row; empty strings are normalized to `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrugDetails {
    pub side_effects: Option<String>,
    pub dosing: Option<String>,
}

/// A free-text association column and the column it is keyed by.
///
/// The identifiers are compile-time constants; lookup values are always bound parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextSource {
    pub table: &'static str,
    pub column: &'static str,
    pub key_column: &'static str,
}

impl TextSource {
    pub const fn new(table: &'static str, column: &'static str, key_column: &'static str) -> Self {
        Self {
            table,
            column,
            key_column,
        }
    }
}

/// Column of `clinicalAnnotations` used to find annotation ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationKey {
    Gene,
    Drug,
}

impl AnnotationKey {
    pub fn column(self) -> &'static str {
        match self {
            Self::Gene => "Gene",
            Self::Drug => "Drugs",
        }
    }
}

pub const CLINICAL_ANNOTATIONS: &str = "clinicalAnnotations";
pub const CLINICAL_VARIANTS: &str = "clinicalVariants";
pub const DRUGS: &str = "drugs";

/// Tables the lookup workflows read from.
pub const REQUIRED_TABLES: &[&str] = &[
    "genes",
    DRUGS,
    "chemicals",
    "phenotypes",
    "relationships",
    CLINICAL_ANNOTATIONS,
    "clinicalAnnotationAlleles",
    CLINICAL_VARIANTS,
];

/// Read-only queries the lookup workflows need from a reference store.
#[async_trait]
pub trait ReferenceStore: Send + Sync {
    /// Accession ids in `category` whose name/alias columns match `term`.
    ///
    /// Genes, drugs and chemicals match whole fields; phenotypes match substrings. Matching is
    /// case-insensitive and `term` keeps any `LIKE` wildcards it contains.
    async fn matching_ids(
        &self,
        category: EntityCategory,
        term: &str,
    ) -> Result<Vec<String>, LookupError>;

    async fn gene(&self, accession_id: &str) -> Result<Option<GeneRecord>, LookupError>;

    async fn drug_name(&self, accession_id: &str) -> Result<Option<String>, LookupError>;

    async fn phenotype_name(&self, accession_id: &str) -> Result<Option<String>, LookupError>;

    /// Outgoing edges of `source_id`, in store order.
    async fn edges_from(&self, source_id: &str) -> Result<Vec<RelationshipEdge>, LookupError>;

    /// Raw values of `source.column` for rows whose `source.key_column` equals `key`.
    async fn text_values(
        &self,
        source: TextSource,
        key: &str,
    ) -> Result<Vec<Option<String>>, LookupError>;

    async fn drug_details(&self, drug_name: &str) -> Result<Option<DrugDetails>, LookupError>;

    /// Clinical annotation ids for `value` in the `key` column, in store order (may repeat).
    async fn annotation_ids(
        &self,
        key: AnnotationKey,
        value: &str,
    ) -> Result<Vec<String>, LookupError>;

    async fn allele_texts(&self, annotation_id: &str) -> Result<Vec<String>, LookupError>;
}
