use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::entities::ResolveOptions;
use crate::entities::walk::{
    Bucket, EdgeProjection, EdgeResolution, TextProjection, TraversalPlan, genetic_profile, walk,
};
use crate::error::LookupError;
use crate::sources::{
    AnnotationKey, CLINICAL_ANNOTATIONS, CLINICAL_VARIANTS, DRUGS, EdgeTarget, ReferenceStore,
    TextSource,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrugReport {
    pub accession_id: String,
    pub name: String,
    pub diseases: Vec<String>,
    pub side_effects: Option<String>,
    pub dosing: Option<String>,
    pub genetic_profile: Vec<String>,
}

const DRUG_PLAN: TraversalPlan = TraversalPlan {
    edges: &[EdgeProjection {
        target: EdgeTarget::Phenotype,
        resolution: EdgeResolution::PhenotypeName,
        bucket: Bucket::Diseases,
    }],
    texts: &[
        TextProjection {
            source: TextSource::new(CLINICAL_ANNOTATIONS, "Phenotypes", "Drugs"),
            bucket: Bucket::Diseases,
        },
        TextProjection {
            source: TextSource::new(CLINICAL_VARIANTS, "phenotypes", "chemicals"),
            bucket: Bucket::Diseases,
        },
        TextProjection {
            source: TextSource::new(DRUGS, "Disease_Drug_Addresses", "Name"),
            bucket: Bucket::Diseases,
        },
    ],
};

pub async fn get(
    store: &dyn ReferenceStore,
    accession_id: &str,
    options: &ResolveOptions,
) -> Result<DrugReport, LookupError> {
    let name = match store.drug_name(accession_id).await? {
        Some(name) => name,
        None => {
            warn!(accession_id, "classified drug has no name");
            String::new()
        }
    };

    let associations = walk(store, accession_id, &name, &DRUG_PLAN, options.empty_rows).await?;

    let details = if name.is_empty() {
        None
    } else {
        store.drug_details(&name).await?
    };
    let details = details.unwrap_or_default();

    let genetic_profile =
        genetic_profile(store, AnnotationKey::Drug, &name, options.annotation_limit).await?;

    Ok(DrugReport {
        accession_id: accession_id.to_string(),
        name,
        diseases: associations.diseases,
        side_effects: details.side_effects,
        dosing: details.dosing,
        genetic_profile,
    })
}
