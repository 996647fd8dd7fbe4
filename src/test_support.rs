//! Builds throwaway PharmGKB stores for tests: TSV exports are written to a temp directory and
//! loaded through the real ingest path.

use std::time::Duration;

use tempfile::TempDir;

use crate::sources::ingest::ingest_directory;
use crate::sources::sqlite::SqliteStore;

const GENES_HEADER: &str =
    "PharmGKB Accession Id\tNCBI Gene ID\tName\tSymbol\tAlternate Names\tAlternate Symbols";
const DRUGS_HEADER: &str = "PharmGKB Accession Id\tName\tGeneric Names\tTrade Names\tSide Effects\tDosing Information\tDisease Drug Addresses";
const CHEMICALS_HEADER: &str = "PharmGKB Accession Id\tName\tGeneric Names\tTrade Names\tType";
const PHENOTYPES_HEADER: &str = "PharmGKB Accession Id\tName\tAlternate Names";
const RELATIONSHIPS_HEADER: &str =
    "Entity1_id\tEntity1_name\tEntity1_type\tEntity2_id\tEntity2_name\tEntity2_type\tAssociation";
const ANNOTATIONS_HEADER: &str =
    "Clinical Annotation ID\tVariant/Haplotypes\tGene\tLevel of Evidence\tPhenotype(s)\tDrug(s)";
const ALLELES_HEADER: &str = "Clinical Annotation ID\tGenotype/Allele\tAnnotation Text";
const VARIANTS_HEADER: &str = "variant\tgene\ttype\tlevel of evidence\tchemicals\tphenotypes";

pub(crate) struct Fixture {
    _dir: TempDir,
    store: SqliteStore,
}

impl Fixture {
    pub fn builder() -> FixtureBuilder {
        FixtureBuilder::default()
    }

    pub fn store(&self) -> &SqliteStore {
        &self.store
    }
}

#[derive(Default)]
pub(crate) struct FixtureBuilder {
    genes: Vec<String>,
    drugs: Vec<String>,
    chemicals: Vec<String>,
    phenotypes: Vec<String>,
    relationships: Vec<String>,
    annotations: Vec<String>,
    alleles: Vec<String>,
    variants: Vec<String>,
}

impl FixtureBuilder {
    pub fn gene(self, id: &str, name: &str, symbol: &str) -> Self {
        self.gene_with_aliases(id, name, symbol, "", "")
    }

    pub fn gene_with_aliases(
        mut self,
        id: &str,
        name: &str,
        symbol: &str,
        alternate_names: &str,
        alternate_symbols: &str,
    ) -> Self {
        self.genes.push(format!(
            "{id}\t1\t{name}\t{symbol}\t{alternate_names}\t{alternate_symbols}"
        ));
        self
    }

    pub fn drug(self, id: &str, name: &str, side_effects: &str, dosing: &str) -> Self {
        self.drug_with_addresses(id, name, side_effects, dosing, "")
    }

    pub fn drug_with_addresses(
        mut self,
        id: &str,
        name: &str,
        side_effects: &str,
        dosing: &str,
        addresses: &str,
    ) -> Self {
        self.drugs.push(format!(
            "{id}\t{name}\t\t\t{side_effects}\t{dosing}\t{addresses}"
        ));
        self
    }

    pub fn drug_with_trade_name(mut self, id: &str, name: &str, trade_name: &str) -> Self {
        self.drugs.push(format!("{id}\t{name}\t\t{trade_name}\t\t\t"));
        self
    }

    pub fn chemical(mut self, id: &str, name: &str) -> Self {
        self.chemicals.push(format!("{id}\t{name}\t\t\tDrug"));
        self
    }

    pub fn phenotype(mut self, id: &str, name: &str) -> Self {
        self.phenotypes.push(format!("{id}\t{name}\t"));
        self
    }

    pub fn phenotype_with_aliases(mut self, id: &str, name: &str, alternate_names: &str) -> Self {
        self.phenotypes.push(format!("{id}\t{name}\t{alternate_names}"));
        self
    }

    pub fn edge(
        mut self,
        source_id: &str,
        target_id: &str,
        target_type: &str,
        target_name: &str,
    ) -> Self {
        self.relationships.push(format!(
            "{source_id}\tsource\tGene\t{target_id}\t{target_name}\t{target_type}\tassociated"
        ));
        self
    }

    pub fn clinical_annotation(
        mut self,
        annotation_id: &str,
        gene: &str,
        drugs: &str,
        phenotypes: &str,
    ) -> Self {
        self.annotations.push(format!(
            "{annotation_id}\trs1065852\t{gene}\t1A\t{phenotypes}\t{drugs}"
        ));
        self
    }

    pub fn allele(mut self, annotation_id: &str, text: &str) -> Self {
        self.alleles.push(format!("{annotation_id}\t*1/*1\t{text}"));
        self
    }

    pub fn clinical_variant(mut self, gene: &str, chemicals: &str, phenotypes: &str) -> Self {
        self.variants.push(format!(
            "rs4244285\t{gene}\tVariant\t1A\t{chemicals}\t{phenotypes}"
        ));
        self
    }

    pub async fn build(self) -> Fixture {
        let dir = tempfile::tempdir().expect("tempdir");
        let files: [(&str, &str, &[String]); 8] = [
            ("genes.tsv", GENES_HEADER, &self.genes),
            ("drugsWithDosing.tsv", DRUGS_HEADER, &self.drugs),
            ("chemicals.tsv", CHEMICALS_HEADER, &self.chemicals),
            ("phenotypes.tsv", PHENOTYPES_HEADER, &self.phenotypes),
            ("relationships.tsv", RELATIONSHIPS_HEADER, &self.relationships),
            ("clinical_annotations.tsv", ANNOTATIONS_HEADER, &self.annotations),
            ("clinical_ann_alleles.tsv", ALLELES_HEADER, &self.alleles),
            ("clinicalVariants.tsv", VARIANTS_HEADER, &self.variants),
        ];
        for (file, header, rows) in files {
            let mut content = String::from(header);
            content.push('\n');
            for row in rows {
                content.push_str(row);
                content.push('\n');
            }
            std::fs::write(dir.path().join(file), content).expect("write fixture");
        }

        let db = dir.path().join("pharmGKB.db");
        ingest_directory(dir.path(), &db).await.expect("ingest fixture");
        let store = SqliteStore::open(&db, Duration::from_secs(10))
            .await
            .expect("open fixture store");
        Fixture { _dir: dir, store }
    }
}
