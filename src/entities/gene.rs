use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::entities::walk::{
    Bucket, EdgeProjection, EdgeResolution, TextProjection, TraversalPlan, drug_profile,
    genetic_profile, walk,
};
use crate::entities::{DrugProfile, ResolveOptions};
use crate::error::LookupError;
use crate::sources::{
    AnnotationKey, CLINICAL_ANNOTATIONS, CLINICAL_VARIANTS, EdgeTarget, GeneRecord,
    ReferenceStore, TextSource,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneReport {
    pub accession_id: String,
    pub name: String,
    pub symbol: String,
    pub diseases: Vec<String>,
    pub drugs: Vec<DrugProfile>,
    pub genetic_profile: Vec<String>,
}

const GENE_PLAN: TraversalPlan = TraversalPlan {
    edges: &[
        EdgeProjection {
            target: EdgeTarget::Disease,
            resolution: EdgeResolution::PhenotypeName,
            bucket: Bucket::Diseases,
        },
        EdgeProjection {
            target: EdgeTarget::Chemical,
            resolution: EdgeResolution::DrugName,
            bucket: Bucket::Drugs,
        },
    ],
    texts: &[
        TextProjection {
            source: TextSource::new(CLINICAL_ANNOTATIONS, "Phenotypes", "Gene"),
            bucket: Bucket::Diseases,
        },
        TextProjection {
            source: TextSource::new(CLINICAL_VARIANTS, "phenotypes", "gene"),
            bucket: Bucket::Diseases,
        },
    ],
};

pub async fn get(
    store: &dyn ReferenceStore,
    accession_id: &str,
    options: &ResolveOptions,
) -> Result<GeneReport, LookupError> {
    let record = match store.gene(accession_id).await? {
        Some(record) => record,
        None => {
            warn!(accession_id, "classified gene has no genes row");
            GeneRecord {
                accession_id: accession_id.to_string(),
                ..GeneRecord::default()
            }
        }
    };

    let associations = walk(
        store,
        accession_id,
        &record.symbol,
        &GENE_PLAN,
        options.empty_rows,
    )
    .await?;

    let mut drugs = Vec::with_capacity(associations.drugs.len());
    for name in associations.drugs {
        drugs.push(drug_profile(store, name).await?);
    }

    let genetic_profile = genetic_profile(
        store,
        AnnotationKey::Gene,
        &record.symbol,
        options.annotation_limit,
    )
    .await?;

    Ok(GeneReport {
        accession_id: record.accession_id,
        name: record.name,
        symbol: record.symbol,
        diseases: associations.diseases,
        drugs,
        genetic_profile,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Fixture;

    #[tokio::test]
    async fn cyp2d6_scenario_merges_edges_and_annotations() {
        let fixture = Fixture::builder()
            .gene("PA123", "CYP2D6", "CYP2D6")
            .phenotype("PA999", "Depression")
            .drug("PA555", "Fluoxetine", "Nausea", "20mg")
            .edge("PA123", "PA999", "Disease", "Depression")
            .edge("PA123", "PA555", "Chemical", "fluoxetine")
            .clinical_annotation("1183", "CYP2D6", "fluoxetine", "depression; Anxiety")
            .build()
            .await;

        let report = get(fixture.store(), "PA123", &ResolveOptions::default())
            .await
            .expect("gene report");

        assert_eq!(report.name, "CYP2D6");
        assert_eq!(report.symbol, "CYP2D6");
        assert_eq!(report.diseases, vec!["Depression", "Anxiety"]);
        assert_eq!(report.drugs.len(), 1);
        assert_eq!(report.drugs[0].name, "Fluoxetine");
        assert_eq!(report.drugs[0].side_effects.as_deref(), Some("Nausea"));
        assert_eq!(report.drugs[0].dosing.as_deref(), Some("20mg"));
    }

    #[tokio::test]
    async fn repeated_chemical_names_are_kept() {
        let fixture = Fixture::builder()
            .gene("PA1", "solute carrier", "SLCO1B1")
            .drug("PA10", "simvastatin", "Myopathy", "")
            .drug("PA11", "simvastatin", "", "")
            .edge("PA1", "PA10", "Chemical", "simvastatin")
            .edge("PA1", "PA11", "Chemical", "simvastatin")
            .build()
            .await;

        let report = get(fixture.store(), "PA1", &ResolveOptions::default())
            .await
            .expect("gene report");
        let names: Vec<&str> = report.drugs.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["simvastatin", "simvastatin"]);
        for drug in &report.drugs {
            assert_eq!(drug.side_effects.as_deref(), Some("Myopathy"));
            assert_eq!(drug.dosing, None);
        }
    }

    #[tokio::test]
    async fn annotation_limit_caps_genetic_profile() {
        let mut builder = Fixture::builder()
            .gene("PA1", "CYP2C19", "CYP2C19")
            .clinical_annotation("A1", "CYP2C19", "clopidogrel", "")
            .clinical_annotation("A2", "CYP2C19", "clopidogrel", "");
        for i in 0..8 {
            builder = builder.allele("A1", &format!("A1 text {i}"));
        }
        for i in 0..7 {
            builder = builder.allele("A2", &format!("A2 text {i}"));
        }
        let fixture = builder.build().await;

        let report = get(fixture.store(), "PA1", &ResolveOptions::default())
            .await
            .expect("gene report");
        assert_eq!(report.genetic_profile.len(), 10);
        assert_eq!(report.genetic_profile[9], "A2 text 1");

        let options = ResolveOptions {
            annotation_limit: 3,
            ..ResolveOptions::default()
        };
        let report = get(fixture.store(), "PA1", &options).await.expect("gene report");
        assert_eq!(report.genetic_profile, vec!["A1 text 0", "A1 text 1", "A1 text 2"]);
    }

    #[tokio::test]
    async fn gene_without_associations_is_empty_not_an_error() {
        let fixture = Fixture::builder()
            .gene("PA1", "orphan gene", "ORPH1")
            .build()
            .await;
        let report = get(fixture.store(), "PA1", &ResolveOptions::default())
            .await
            .expect("gene report");
        assert!(report.diseases.is_empty());
        assert!(report.drugs.is_empty());
        assert!(report.genetic_profile.is_empty());
    }
}
