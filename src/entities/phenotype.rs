use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::entities::ResolveOptions;
use crate::entities::walk::{
    Bucket, EdgeProjection, EdgeResolution, TextProjection, TraversalPlan, genetic_profile, walk,
};
use crate::error::LookupError;
use crate::sources::{
    AnnotationKey, CLINICAL_ANNOTATIONS, CLINICAL_VARIANTS, EdgeTarget, ReferenceStore,
    TextSource,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhenotypeReport {
    pub accession_id: String,
    pub name: String,
    pub genes: Vec<String>,
    pub drugs: Vec<PhenotypeDrug>,
}

/// A drug associated with a phenotype, with its own dosing text and genetic profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhenotypeDrug {
    pub name: String,
    pub dosing: Option<String>,
    pub genetic_profile: Vec<String>,
}

const PHENOTYPE_PLAN: TraversalPlan = TraversalPlan {
    edges: &[
        EdgeProjection {
            target: EdgeTarget::Chemical,
            resolution: EdgeResolution::DisplayName,
            bucket: Bucket::Drugs,
        },
        EdgeProjection {
            target: EdgeTarget::Gene,
            resolution: EdgeResolution::DisplayName,
            bucket: Bucket::Genes,
        },
    ],
    texts: &[
        TextProjection {
            source: TextSource::new(CLINICAL_VARIANTS, "chemicals", "phenotypes"),
            bucket: Bucket::Drugs,
        },
        TextProjection {
            source: TextSource::new(CLINICAL_VARIANTS, "gene", "phenotypes"),
            bucket: Bucket::Genes,
        },
        TextProjection {
            source: TextSource::new(CLINICAL_ANNOTATIONS, "Drugs", "Phenotypes"),
            bucket: Bucket::Drugs,
        },
        TextProjection {
            source: TextSource::new(CLINICAL_ANNOTATIONS, "Gene", "Phenotypes"),
            bucket: Bucket::Genes,
        },
    ],
};

pub async fn get(
    store: &dyn ReferenceStore,
    accession_id: &str,
    options: &ResolveOptions,
) -> Result<Option<PhenotypeReport>, LookupError> {
    let Some(name) = store.phenotype_name(accession_id).await? else {
        debug!(accession_id, "phenotype has no name, skipping");
        return Ok(None);
    };

    let associations = walk(
        store,
        accession_id,
        &name,
        &PHENOTYPE_PLAN,
        options.empty_rows,
    )
    .await?;

    let mut drugs = Vec::with_capacity(associations.drugs.len());
    for drug in associations.drugs {
        let dosing = store
            .drug_details(&drug)
            .await?
            .and_then(|details| details.dosing);
        let genetic_profile =
            genetic_profile(store, AnnotationKey::Drug, &drug, options.annotation_limit).await?;
        drugs.push(PhenotypeDrug {
            name: drug,
            dosing,
            genetic_profile,
        });
    }

    Ok(Some(PhenotypeReport {
        accession_id: accession_id.to_string(),
        name,
        genes: associations.genes,
        drugs,
    }))
}

/// Reports for every classified phenotype id, in classification order.
pub async fn get_all(
    store: &dyn ReferenceStore,
    accession_ids: &[String],
    options: &ResolveOptions,
) -> Result<Vec<PhenotypeReport>, LookupError> {
    let mut out = Vec::with_capacity(accession_ids.len());
    for accession_id in accession_ids {
        if let Some(report) = get(store, accession_id, options).await? {
            out.push(report);
        }
    }
    Ok(out)
}
