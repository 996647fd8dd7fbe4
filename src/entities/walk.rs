//! Relationship traversal shared by the gene, drug and phenotype workflows.
//!
//! A [`TraversalPlan`] names which outgoing edges feed which association bucket and which
//! free-text annotation columns are merged into it afterwards. Edge targets are appended first
//! (in edge order); text sources are then folded in through the merger, in plan order.

use tracing::debug;

use crate::entities::DrugProfile;
use crate::error::LookupError;
use crate::sources::{AnnotationKey, EdgeTarget, ReferenceStore, TextSource};
use crate::transform::merge::{EmptyRowPolicy, merge_all, push_distinct};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Diseases,
    Drugs,
    Genes,
}

/// How an edge target becomes a name in its bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeResolution {
    /// Target id looked up in `phenotypes`; a name already present verbatim is not added again.
    PhenotypeName,
    /// Target id looked up in `drugs`; repeated names are kept.
    DrugName,
    /// The edge's own target display name; repeated names are kept.
    DisplayName,
}

#[derive(Debug, Clone, Copy)]
pub struct EdgeProjection {
    pub target: EdgeTarget,
    pub resolution: EdgeResolution,
    pub bucket: Bucket,
}

#[derive(Debug, Clone, Copy)]
pub struct TextProjection {
    pub source: TextSource,
    pub bucket: Bucket,
}

#[derive(Debug, Clone, Copy)]
pub struct TraversalPlan {
    pub edges: &'static [EdgeProjection],
    pub texts: &'static [TextProjection],
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Associations {
    pub diseases: Vec<String>,
    pub drugs: Vec<String>,
    pub genes: Vec<String>,
}

impl Associations {
    fn bucket_mut(&mut self, bucket: Bucket) -> &mut Vec<String> {
        match bucket {
            Bucket::Diseases => &mut self.diseases,
            Bucket::Drugs => &mut self.drugs,
            Bucket::Genes => &mut self.genes,
        }
    }
}

/// Runs `plan` for the entity `accession_id`, matching annotation tables on `text_key`.
pub async fn walk(
    store: &dyn ReferenceStore,
    accession_id: &str,
    text_key: &str,
    plan: &TraversalPlan,
    policy: EmptyRowPolicy,
) -> Result<Associations, LookupError> {
    let mut out = Associations::default();

    let edges = store.edges_from(accession_id).await?;
    debug!(accession_id, edges = edges.len(), "relationship edges");

    for projection in plan.edges {
        for edge in edges.iter().filter(|e| e.target_type == projection.target) {
            let bucket = out.bucket_mut(projection.bucket);
            match projection.resolution {
                EdgeResolution::PhenotypeName => {
                    if let Some(name) = store.phenotype_name(&edge.target_id).await? {
                        push_distinct(bucket, name);
                    }
                }
                EdgeResolution::DrugName => {
                    if let Some(name) = store.drug_name(&edge.target_id).await? {
                        bucket.push(name);
                    }
                }
                EdgeResolution::DisplayName => {
                    if !edge.target_name.trim().is_empty() {
                        bucket.push(edge.target_name.clone());
                    }
                }
            }
        }
    }

    // An empty key would match every row with a blank key column.
    if text_key.trim().is_empty() {
        debug!(accession_id, "no annotation key, skipping text sources");
        return Ok(out);
    }

    for projection in plan.texts {
        let rows = store.text_values(projection.source, text_key).await?;
        let fetched = rows.len();
        let added = merge_all(rows, out.bucket_mut(projection.bucket), policy);
        debug!(
            table = projection.source.table,
            column = projection.source.column,
            key = text_key,
            fetched,
            added,
            "merged text source"
        );
    }

    Ok(out)
}

/// Allele-level annotation texts for every annotation keyed by `value`, capped at `limit`.
///
/// Annotation ids are de-duplicated first; texts are taken in id order then row order and the
/// scan stops as soon as `limit` texts are collected.
pub async fn genetic_profile(
    store: &dyn ReferenceStore,
    key: AnnotationKey,
    value: &str,
    limit: usize,
) -> Result<Vec<String>, LookupError> {
    if value.trim().is_empty() || limit == 0 {
        return Ok(Vec::new());
    }

    let mut ids = Vec::new();
    for id in store.annotation_ids(key, value).await? {
        push_distinct(&mut ids, id);
    }

    let mut texts = Vec::new();
    for id in &ids {
        if texts.len() >= limit {
            break;
        }
        let remaining = limit - texts.len();
        texts.extend(store.allele_texts(id).await?.into_iter().take(remaining));
    }
    Ok(texts)
}

/// Side effects and dosing for `name`; a drug with no row gets neither.
pub async fn drug_profile(
    store: &dyn ReferenceStore,
    name: String,
) -> Result<DrugProfile, LookupError> {
    let details = store.drug_details(&name).await?.unwrap_or_default();
    Ok(DrugProfile {
        name,
        side_effects: details.side_effects,
        dosing: details.dosing,
    })
}
