use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::debug;

use crate::error::LookupError;
use crate::sources::{
    AnnotationKey, CLINICAL_ANNOTATIONS, DrugDetails, EdgeTarget, EntityCategory, GeneRecord,
    ReferenceStore, RelationshipEdge, TextSource,
};

const DEFAULT_MAX_CONNECTIONS: u32 = 4;
const INGEST_SUGGESTION: &str = "pgx-lookup ingest <directory with PharmGKB .tsv files>";

/// PharmGKB reference store backed by a SQLite database file.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
    path: PathBuf,
    query_timeout: Duration,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct TableStatus {
    pub table: String,
    pub present: bool,
    pub rows: Option<i64>,
}

impl SqliteStore {
    /// Opens an existing database read-only.
    pub async fn open(path: &Path, query_timeout: Duration) -> Result<Self, LookupError> {
        if !path.is_file() {
            return Err(unavailable(path, "database file does not exist"));
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .read_only(true)
            .create_if_missing(false);

        let pool = SqlitePoolOptions::new()
            .max_connections(DEFAULT_MAX_CONNECTIONS)
            .acquire_timeout(query_timeout)
            .connect_with(options)
            .await
            .map_err(|err| unavailable(path, &err.to_string()))?;

        debug!(path = %path.display(), "opened reference store");
        Ok(Self {
            pool,
            path: path.to_path_buf(),
            query_timeout,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn timed<T, F>(&self, query: &str, fut: F) -> Result<T, LookupError>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        match tokio::time::timeout(self.query_timeout, fut).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(LookupError::StoreTimeout {
                query: query.to_string(),
                timeout_secs: self.query_timeout.as_secs(),
            }),
        }
    }

    /// Presence and row count of each table in `tables`.
    pub async fn table_status(&self, tables: &[&str]) -> Result<Vec<TableStatus>, LookupError> {
        let mut out = Vec::with_capacity(tables.len());
        for table in tables {
            let present: Option<String> = self
                .timed(
                    "table lookup",
                    sqlx::query_scalar(
                        "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1",
                    )
                    .bind(*table)
                    .fetch_optional(&self.pool),
                )
                .await?;

            let rows = if present.is_some() {
                let sql = format!("SELECT COUNT(*) FROM \"{table}\"");
                let count: i64 = self
                    .timed("row count", sqlx::query_scalar(&sql).fetch_one(&self.pool))
                    .await?;
                Some(count)
            } else {
                None
            };

            out.push(TableStatus {
                table: (*table).to_string(),
                present: present.is_some(),
                rows,
            });
        }
        Ok(out)
    }
}

fn unavailable(path: &Path, reason: &str) -> LookupError {
    LookupError::StoreUnavailable {
        path: path.display().to_string(),
        reason: reason.to_string(),
        suggestion: INGEST_SUGGESTION.to_string(),
    }
}

// SQLite `LIKE` folds ASCII letters only, so `Ödem` matches `ÖDEM` but not `ödem`.
fn match_sql(category: EntityCategory) -> &'static str {
    match category {
        EntityCategory::Gene => {
            "SELECT PharmGKB_Accession_Id FROM genes \
             WHERE Name LIKE ?1 OR Symbol LIKE ?1 OR Alternate_Names LIKE ?1 \
             OR Alternate_Symbols LIKE ?1 \
             ORDER BY rowid"
        }
        EntityCategory::Drug => {
            "SELECT PharmGKB_Accession_Id FROM drugs \
             WHERE Name LIKE ?1 OR Generic_Names LIKE ?1 OR Trade_Names LIKE ?1 \
             ORDER BY rowid"
        }
        EntityCategory::Chemical => {
            "SELECT PharmGKB_Accession_Id FROM chemicals \
             WHERE Name LIKE ?1 OR Generic_Names LIKE ?1 OR Trade_Names LIKE ?1 \
             ORDER BY rowid"
        }
        EntityCategory::Phenotype => {
            "SELECT PharmGKB_Accession_Id FROM phenotypes \
             WHERE Name LIKE '%' || ?1 || '%' OR Alternate_Names LIKE '%' || ?1 || '%' \
             ORDER BY rowid"
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[async_trait]
impl ReferenceStore for SqliteStore {
    async fn matching_ids(
        &self,
        category: EntityCategory,
        term: &str,
    ) -> Result<Vec<String>, LookupError> {
        let rows: Vec<Option<String>> = self
            .timed(
                "classification",
                sqlx::query_scalar(match_sql(category))
                    .bind(term)
                    .fetch_all(&self.pool),
            )
            .await?;
        Ok(rows.into_iter().filter_map(non_empty).collect())
    }

    async fn gene(&self, accession_id: &str) -> Result<Option<GeneRecord>, LookupError> {
        let row: Option<(Option<String>, Option<String>)> = self
            .timed(
                "gene record",
                sqlx::query_as(
                    "SELECT Name, Symbol FROM genes WHERE PharmGKB_Accession_Id = ?1 \
                     ORDER BY rowid LIMIT 1",
                )
                .bind(accession_id)
                .fetch_optional(&self.pool),
            )
            .await?;

        Ok(row.map(|(name, symbol)| GeneRecord {
            accession_id: accession_id.to_string(),
            name: name.unwrap_or_default(),
            symbol: symbol.unwrap_or_default(),
        }))
    }

    async fn drug_name(&self, accession_id: &str) -> Result<Option<String>, LookupError> {
        let name: Option<Option<String>> = self
            .timed(
                "drug name",
                sqlx::query_scalar(
                    "SELECT Name FROM drugs WHERE PharmGKB_Accession_Id = ?1 \
                     ORDER BY rowid LIMIT 1",
                )
                .bind(accession_id)
                .fetch_optional(&self.pool),
            )
            .await?;
        Ok(non_empty(name.flatten()))
    }

    async fn phenotype_name(&self, accession_id: &str) -> Result<Option<String>, LookupError> {
        let name: Option<Option<String>> = self
            .timed(
                "phenotype name",
                sqlx::query_scalar(
                    "SELECT Name FROM phenotypes WHERE PharmGKB_Accession_Id = ?1 \
                     ORDER BY rowid LIMIT 1",
                )
                .bind(accession_id)
                .fetch_optional(&self.pool),
            )
            .await?;
        Ok(non_empty(name.flatten()))
    }

    async fn edges_from(&self, source_id: &str) -> Result<Vec<RelationshipEdge>, LookupError> {
        let rows: Vec<(Option<String>, Option<String>, Option<String>)> = self
            .timed(
                "relationship edges",
                sqlx::query_as(
                    "SELECT Entity2_id, Entity2_type, Entity2_name FROM relationships \
                     WHERE Entity1_id = ?1 ORDER BY rowid",
                )
                .bind(source_id)
                .fetch_all(&self.pool),
            )
            .await?;

        Ok(rows
            .into_iter()
            .map(|(target_id, target_type, target_name)| RelationshipEdge {
                source_id: source_id.to_string(),
                target_id: target_id.unwrap_or_default(),
                target_type: EdgeTarget::parse(target_type.as_deref().unwrap_or_default()),
                target_name: target_name.unwrap_or_default(),
            })
            .collect())
    }

    async fn text_values(
        &self,
        source: TextSource,
        key: &str,
    ) -> Result<Vec<Option<String>>, LookupError> {
        let sql = format!(
            "SELECT \"{}\" FROM \"{}\" WHERE \"{}\" = ?1 ORDER BY rowid",
            source.column, source.table, source.key_column
        );
        self.timed(
            source.table,
            sqlx::query_scalar(&sql).bind(key).fetch_all(&self.pool),
        )
        .await
    }

    async fn drug_details(&self, drug_name: &str) -> Result<Option<DrugDetails>, LookupError> {
        let row: Option<(Option<String>, Option<String>)> = self
            .timed(
                "drug details",
                sqlx::query_as(
                    "SELECT Side_Effects, Dosing_Information FROM drugs WHERE Name = ?1 \
                     ORDER BY rowid LIMIT 1",
                )
                .bind(drug_name)
                .fetch_optional(&self.pool),
            )
            .await?;

        Ok(row.map(|(side_effects, dosing)| DrugDetails {
            side_effects: non_empty(side_effects),
            dosing: non_empty(dosing),
        }))
    }

    async fn annotation_ids(
        &self,
        key: AnnotationKey,
        value: &str,
    ) -> Result<Vec<String>, LookupError> {
        let sql = format!(
            "SELECT Clinical_Annotation_ID FROM \"{CLINICAL_ANNOTATIONS}\" WHERE \"{}\" = ?1",
            key.column()
        );
        let rows: Vec<Option<String>> = self
            .timed(
                "clinical annotation ids",
                sqlx::query_scalar(&sql).bind(value).fetch_all(&self.pool),
            )
            .await?;
        Ok(rows.into_iter().filter_map(non_empty).collect())
    }

    async fn allele_texts(&self, annotation_id: &str) -> Result<Vec<String>, LookupError> {
        let rows: Vec<Option<String>> = self
            .timed(
                "annotation alleles",
                sqlx::query_scalar(
                    "SELECT Annotation_Text FROM clinicalAnnotationAlleles \
                     WHERE Clinical_Annotation_ID = ?1",
                )
                .bind(annotation_id)
                .fetch_all(&self.pool),
            )
            .await?;
        Ok(rows.into_iter().filter_map(non_empty).collect())
    }
}
