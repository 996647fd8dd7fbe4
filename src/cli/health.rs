use crate::config::LookupConfig;
use crate::error::LookupError;
use crate::sources::REQUIRED_TABLES;
use crate::sources::sqlite::TableStatus;

#[derive(Debug, Clone, serde::Serialize)]
pub struct HealthReport {
    pub database: String,
    pub rows: Vec<TableStatus>,
}

impl HealthReport {
    pub fn missing(&self) -> usize {
        self.rows.iter().filter(|r| !r.present).count()
    }

    pub fn all_present(&self) -> bool {
        self.missing() == 0
    }

    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str("# pgx-lookup Health Check\n\n");
        out.push_str(&format!("Database: {}\n\n", self.database));
        out.push_str("| Table | Status | Rows |\n");
        out.push_str("|-------|--------|------|\n");
        for row in &self.rows {
            let status = if row.present { "ok" } else { "missing" };
            let rows = row
                .rows
                .map(|n| n.to_string())
                .unwrap_or_else(|| "-".to_string());
            out.push_str(&format!("| {} | {} | {} |\n", row.table, status, rows));
        }
        out.push_str(&format!(
            "\nStatus: {}/{} tables present\n",
            self.rows.len() - self.missing(),
            self.rows.len()
        ));
        out
    }
}

/// Checks every table the lookup workflows read from.
///
/// # Errors
///
/// Returns an error when the database cannot be opened or queried.
pub async fn check(config: &LookupConfig) -> Result<HealthReport, LookupError> {
    let store = super::open_store(config).await?;
    let rows = store.table_status(REQUIRED_TABLES).await?;
    Ok(HealthReport {
        database: store.path().display().to_string(),
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::ingest::{SOURCE_FILES, ingest_directory};

    #[tokio::test]
    async fn partial_ingest_reports_missing_tables() {
        let data = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            data.path().join("genes.tsv"),
            "PharmGKB Accession Id\tName\tSymbol\nPA128\tcytochrome P450 2D6\tCYP2D6\n",
        )
        .expect("write genes");
        let db = data.path().join("pgx.db");
        ingest_directory(data.path(), &db).await.expect("ingest");

        let config = LookupConfig {
            database: db,
            ..LookupConfig::default()
        };
        let report = check(&config).await.expect("health");
        assert_eq!(report.rows.len(), REQUIRED_TABLES.len());
        assert_eq!(report.missing(), SOURCE_FILES.len() - 1);
        assert!(!report.all_present());

        let markdown = report.to_markdown();
        assert!(markdown.contains("| genes | ok | 1 |"));
        assert!(markdown.contains("| relationships | missing | - |"));
        assert!(markdown.contains("Status: 1/8 tables present"));
    }

    #[tokio::test]
    async fn missing_database_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = LookupConfig {
            database: dir.path().join("none.db"),
            ..LookupConfig::default()
        };
        let err = check(&config).await.unwrap_err();
        assert!(matches!(err, LookupError::StoreUnavailable { .. }));
    }
}
