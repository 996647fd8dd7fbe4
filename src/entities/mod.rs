//! Entity-level lookup workflows used by the CLI.
//!
//! [`resolve`] classifies a term and runs the matching traversal; rendering happens in
//! `crate::render`.

pub mod classify;
pub mod drug;
pub mod gene;
pub mod phenotype;
pub mod walk;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{DEFAULT_ANNOTATION_LIMIT, LookupConfig};
use crate::error::LookupError;
use crate::sources::ReferenceStore;
use crate::transform::merge::EmptyRowPolicy;

use self::classify::{Classification, classify};
use self::drug::DrugReport;
use self::gene::GeneReport;
use self::phenotype::PhenotypeReport;

/// A drug name with the side-effect and dosing text of its `drugs` row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrugProfile {
    pub name: String,
    pub side_effects: Option<String>,
    pub dosing: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Maximum allele texts per genetic profile.
    pub annotation_limit: usize,
    pub empty_rows: EmptyRowPolicy,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            annotation_limit: DEFAULT_ANNOTATION_LIMIT,
            empty_rows: EmptyRowPolicy::default(),
        }
    }
}

impl From<&LookupConfig> for ResolveOptions {
    fn from(config: &LookupConfig) -> Self {
        Self {
            annotation_limit: config.annotation_limit,
            empty_rows: config.empty_rows,
        }
    }
}

/// A chemical match; chemicals are classified but not resolved further.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChemicalMatch {
    pub term: String,
    pub accession_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhenotypeMatches {
    pub term: String,
    pub phenotypes: Vec<PhenotypeReport>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotFound {
    pub term: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Resolution {
    Gene(GeneReport),
    Drug(DrugReport),
    Chemical(ChemicalMatch),
    Phenotype(PhenotypeMatches),
    #[serde(rename = "not_found")]
    NotFound(NotFound),
}

/// Classifies `term` and assembles the report for the winning category.
///
/// Genes and drugs resolve their first accession id; phenotypes resolve every matching id.
pub async fn resolve(
    store: &dyn ReferenceStore,
    term: &str,
    options: &ResolveOptions,
) -> Result<Resolution, LookupError> {
    let term = classify::normalize_term(term)?;
    let classification = classify(store, term).await?;

    let resolution = match classification {
        Classification::Gene(ids) => match ids.first() {
            Some(id) => Resolution::Gene(gene::get(store, id, options).await?),
            None => not_found(term),
        },
        Classification::Drug(ids) => match ids.first() {
            Some(id) => Resolution::Drug(drug::get(store, id, options).await?),
            None => not_found(term),
        },
        Classification::Chemical(accession_ids) => Resolution::Chemical(ChemicalMatch {
            term: term.to_string(),
            accession_ids,
        }),
        Classification::Phenotype(ids) => Resolution::Phenotype(PhenotypeMatches {
            term: term.to_string(),
            phenotypes: phenotype::get_all(store, &ids, options).await?,
        }),
        Classification::NotFound => not_found(term),
    };

    debug!(term, "resolved");
    Ok(resolution)
}

fn not_found(term: &str) -> Resolution {
    Resolution::NotFound(NotFound {
        term: term.to_string(),
    })
}
