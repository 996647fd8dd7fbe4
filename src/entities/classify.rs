use tracing::debug;

use crate::error::LookupError;
use crate::sources::{EntityCategory, ReferenceStore};

/// Longest accepted term in bytes, after trimming.
pub const MAX_TERM_LEN: usize = 1024;

/// Outcome of matching a term against the entity tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Gene(Vec<String>),
    Drug(Vec<String>),
    Chemical(Vec<String>),
    Phenotype(Vec<String>),
    NotFound,
}

impl Classification {
    fn matched(category: EntityCategory, accession_ids: Vec<String>) -> Self {
        match category {
            EntityCategory::Gene => Self::Gene(accession_ids),
            EntityCategory::Drug => Self::Drug(accession_ids),
            EntityCategory::Chemical => Self::Chemical(accession_ids),
            EntityCategory::Phenotype => Self::Phenotype(accession_ids),
        }
    }

    pub fn category(&self) -> Option<EntityCategory> {
        match self {
            Self::Gene(_) => Some(EntityCategory::Gene),
            Self::Drug(_) => Some(EntityCategory::Drug),
            Self::Chemical(_) => Some(EntityCategory::Chemical),
            Self::Phenotype(_) => Some(EntityCategory::Phenotype),
            Self::NotFound => None,
        }
    }

    pub fn accession_ids(&self) -> &[String] {
        match self {
            Self::Gene(ids) | Self::Drug(ids) | Self::Chemical(ids) | Self::Phenotype(ids) => ids,
            Self::NotFound => &[],
        }
    }
}

/// Trims a user-supplied term and rejects empty or oversized input.
pub fn normalize_term(term: &str) -> Result<&str, LookupError> {
    let term = term.trim();
    if term.is_empty() {
        return Err(LookupError::InvalidArgument(
            "A gene, drug, or phenotype name is required. Example: pgx-lookup get CYP2D6".into(),
        ));
    }
    if term.len() > MAX_TERM_LEN {
        return Err(LookupError::InvalidArgument("Search term is too long.".into()));
    }
    Ok(term)
}

/// Classifies `term` by querying gene, drug, chemical and phenotype tables in that order.
///
/// The first category with any match wins and later categories are not queried.
pub async fn classify(
    store: &dyn ReferenceStore,
    term: &str,
) -> Result<Classification, LookupError> {
    let term = normalize_term(term)?;
    for category in EntityCategory::PRIORITY {
        let ids = store.matching_ids(category, term).await?;
        if !ids.is_empty() {
            debug!(term, category = category.label(), matches = ids.len(), "classified");
            return Ok(Classification::matched(category, ids));
        }
    }
    debug!(term, "no category matched");
    Ok(Classification::NotFound)
}
