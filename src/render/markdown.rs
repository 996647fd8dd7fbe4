use std::sync::OnceLock;

use minijinja::{Environment, context};

use crate::entities::drug::DrugReport;
use crate::entities::gene::GeneReport;
use crate::entities::{ChemicalMatch, NotFound, PhenotypeMatches, Resolution};
use crate::error::LookupError;

static ENV: OnceLock<Environment<'static>> = OnceLock::new();

pub const NOT_AVAILABLE: &str = "not available";

fn env() -> Result<&'static Environment<'static>, LookupError> {
    if let Some(env) = ENV.get() {
        return Ok(env);
    }
    let env = build_env()?;
    Ok(ENV.get_or_init(|| env))
}

fn build_env() -> Result<Environment<'static>, LookupError> {
    let mut env = Environment::new();
    env.add_filter("or_na", |value: Option<String>| -> String {
        match value {
            Some(v) if !v.trim().is_empty() => v,
            _ => NOT_AVAILABLE.to_string(),
        }
    });
    env.add_filter("join_or_na", |values: Vec<String>| -> String {
        if values.is_empty() {
            NOT_AVAILABLE.to_string()
        } else {
            values.join(", ")
        }
    });
    env.add_template("gene.md.j2", include_str!("../../templates/gene.md.j2"))?;
    env.add_template("drug.md.j2", include_str!("../../templates/drug.md.j2"))?;
    env.add_template(
        "phenotype.md.j2",
        include_str!("../../templates/phenotype.md.j2"),
    )?;
    env.add_template(
        "chemical.md.j2",
        include_str!("../../templates/chemical.md.j2"),
    )?;
    env.add_template(
        "not_found.md.j2",
        include_str!("../../templates/not_found.md.j2"),
    )?;

    Ok(env)
}

pub fn resolution_markdown(resolution: &Resolution) -> Result<String, LookupError> {
    match resolution {
        Resolution::Gene(report) => gene_markdown(report),
        Resolution::Drug(report) => drug_markdown(report),
        Resolution::Chemical(found) => chemical_markdown(found),
        Resolution::Phenotype(found) => phenotype_markdown(found),
        Resolution::NotFound(missing) => not_found_markdown(missing),
    }
}

pub fn gene_markdown(gene: &GeneReport) -> Result<String, LookupError> {
    let tmpl = env()?.get_template("gene.md.j2")?;
    let body = tmpl.render(context! {
        accession_id => &gene.accession_id,
        name => &gene.name,
        symbol => &gene.symbol,
        diseases => &gene.diseases,
        drugs => &gene.drugs,
        genetic_profile => &gene.genetic_profile,
    })?;
    Ok(body)
}

pub fn drug_markdown(drug: &DrugReport) -> Result<String, LookupError> {
    let tmpl = env()?.get_template("drug.md.j2")?;
    let body = tmpl.render(context! {
        accession_id => &drug.accession_id,
        name => &drug.name,
        diseases => &drug.diseases,
        side_effects => &drug.side_effects,
        dosing => &drug.dosing,
        genetic_profile => &drug.genetic_profile,
    })?;
    Ok(body)
}

pub fn phenotype_markdown(found: &PhenotypeMatches) -> Result<String, LookupError> {
    let tmpl = env()?.get_template("phenotype.md.j2")?;
    let body = tmpl.render(context! {
        term => &found.term,
        phenotypes => &found.phenotypes,
    })?;
    Ok(body)
}

pub fn chemical_markdown(found: &ChemicalMatch) -> Result<String, LookupError> {
    let tmpl = env()?.get_template("chemical.md.j2")?;
    let body = tmpl.render(context! {
        term => &found.term,
        accession_ids => &found.accession_ids,
    })?;
    Ok(body)
}

pub fn not_found_markdown(missing: &NotFound) -> Result<String, LookupError> {
    let tmpl = env()?.get_template("not_found.md.j2")?;
    let body = tmpl.render(context! { term => &missing.term })?;
    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::DrugProfile;
    use crate::entities::phenotype::{PhenotypeDrug, PhenotypeReport};

    fn cyp2d6() -> GeneReport {
        GeneReport {
            accession_id: "PA128".into(),
            name: "cytochrome P450 family 2 subfamily D member 6".into(),
            symbol: "CYP2D6".into(),
            diseases: vec!["Depression".into(), "Anxiety".into()],
            drugs: vec![DrugProfile {
                name: "Fluoxetine".into(),
                side_effects: Some("Nausea".into()),
                dosing: None,
            }],
            genetic_profile: Vec::new(),
        }
    }

    #[test]
    fn concurrent_first_use_shares_one_environment() {
        let handles: Vec<_> = (0..8)
            .map(|_| std::thread::spawn(|| env().map(|e| e as *const Environment<'static> as usize)))
            .collect();
        let addrs: Vec<usize> = handles
            .into_iter()
            .map(|h| h.join().expect("thread").expect("env"))
            .collect();
        assert!(addrs.windows(2).all(|w| w[0] == w[1]));

        let env = env().expect("env");
        for name in [
            "gene.md.j2",
            "drug.md.j2",
            "phenotype.md.j2",
            "chemical.md.j2",
            "not_found.md.j2",
        ] {
            assert!(env.get_template(name).is_ok(), "{name} missing");
        }
    }

    #[test]
    fn gene_markdown_lists_associations() {
        let out = gene_markdown(&cyp2d6()).expect("markdown");
        assert!(out.starts_with("# Gene: CYP2D6"));
        assert!(out.contains("| PharmGKB Accession Id | PA128 |"));
        assert!(out.contains("Depression, Anxiety"));
        assert!(out.contains("- **Fluoxetine**"));
        assert!(out.contains("Side Effects: Nausea"));
        assert!(out.contains("Dosing Information: not available"));
    }

    #[test]
    fn empty_lists_render_not_available() {
        let mut gene = cyp2d6();
        gene.diseases.clear();
        gene.drugs.clear();
        let out = gene_markdown(&gene).expect("markdown");
        assert!(out.contains("## Associated Diseases\nnot available"));
        assert!(out.contains("## Genetic Profile\nnot available"));
    }

    #[test]
    fn drug_markdown_shows_details_and_profile() {
        let drug = DrugReport {
            accession_id: "PA451906".into(),
            name: "warfarin".into(),
            diseases: vec!["Thrombosis".into()],
            side_effects: None,
            dosing: Some("Dose by INR".into()),
            genetic_profile: vec!["AA genotype: lower dose".into()],
        };
        let out = drug_markdown(&drug).expect("markdown");
        assert!(out.contains("# Drug: warfarin"));
        assert!(out.contains("| Side Effects | not available |"));
        assert!(out.contains("| Dosing Information | Dose by INR |"));
        assert!(out.contains("- AA genotype: lower dose"));
    }

    #[test]
    fn phenotype_markdown_renders_each_match() {
        let found = PhenotypeMatches {
            term: "depress".into(),
            phenotypes: vec![PhenotypeReport {
                accession_id: "PA447".into(),
                name: "Depression".into(),
                genes: vec!["CYP2D6".into()],
                drugs: vec![PhenotypeDrug {
                    name: "fluoxetine".into(),
                    dosing: Some("20mg daily".into()),
                    genetic_profile: Vec::new(),
                }],
            }],
        };
        let out = phenotype_markdown(&found).expect("markdown");
        assert!(out.contains("## Depression"));
        assert!(out.contains("Genes: CYP2D6"));
        assert!(out.contains("Drugs: fluoxetine"));
        assert!(out.contains("### fluoxetine"));
        assert!(out.contains("Dosing Information: 20mg daily"));
        assert!(out.contains("Genetic Profile: not available"));
    }

    #[test]
    fn chemical_and_not_found_are_plain_notices() {
        let chemical = resolution_markdown(&Resolution::Chemical(ChemicalMatch {
            term: "caffeine".into(),
            accession_ids: vec!["PA448710".into()],
        }))
        .expect("markdown");
        assert!(chemical.contains("Chemical found (PA448710)"));
        assert!(chemical.contains("not supported"));

        let missing = resolution_markdown(&Resolution::NotFound(NotFound {
            term: "zzz".into(),
        }))
        .expect("markdown");
        assert!(missing.starts_with("# Not found: zzz"));
    }
}
