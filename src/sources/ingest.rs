//! Loads PharmGKB TSV exports into the SQLite reference store.
//!
//! Each export becomes one table, replacing any earlier copy. Header cells become column names
//! (spaces to `_`, parentheses dropped) and every column is `TEXT`.

use std::collections::HashSet;
use std::path::Path;

use serde::Serialize;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::{debug, info, warn};

use crate::error::LookupError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceFile {
    pub file: &'static str,
    pub table: &'static str,
}

pub const SOURCE_FILES: &[SourceFile] = &[
    SourceFile {
        file: "genes.tsv",
        table: "genes",
    },
    SourceFile {
        file: "drugsWithDosing.tsv",
        table: "drugs",
    },
    SourceFile {
        file: "phenotypes.tsv",
        table: "phenotypes",
    },
    SourceFile {
        file: "relationships.tsv",
        table: "relationships",
    },
    SourceFile {
        file: "clinical_annotations.tsv",
        table: "clinicalAnnotations",
    },
    SourceFile {
        file: "clinical_ann_alleles.tsv",
        table: "clinicalAnnotationAlleles",
    },
    SourceFile {
        file: "chemicals.tsv",
        table: "chemicals",
    },
    SourceFile {
        file: "clinicalVariants.tsv",
        table: "clinicalVariants",
    },
];

#[derive(Debug, Clone, Serialize)]
pub struct TableLoad {
    pub table: String,
    pub file: String,
    pub columns: usize,
    pub rows: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestSummary {
    pub database: String,
    pub tables: Vec<TableLoad>,
    pub missing: Vec<String>,
}

impl IngestSummary {
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str("# PharmGKB Ingest\n\n");
        out.push_str(&format!("Database: {}\n\n", self.database));
        out.push_str("| Table | File | Columns | Rows |\n");
        out.push_str("|-------|------|---------|------|\n");
        for load in &self.tables {
            out.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                load.table, load.file, load.columns, load.rows
            ));
        }
        if !self.missing.is_empty() {
            out.push_str(&format!("\nSkipped (not found): {}\n", self.missing.join(", ")));
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TsvTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Turns a TSV header cell into a column name.
pub fn normalize_header(cell: &str, index: usize) -> String {
    let name: String = cell
        .trim()
        .chars()
        .filter(|c| !matches!(c, '(' | ')'))
        .map(|c| if c == ' ' { '_' } else { c })
        .collect();
    if name.is_empty() {
        format!("column_{}", index + 1)
    } else {
        name
    }
}

fn record_line(position: Option<&csv::Position>) -> usize {
    position
        .and_then(|pos| usize::try_from(pos.line()).ok())
        .unwrap_or(0)
}

fn csv_error(file: &str, err: &csv::Error) -> LookupError {
    LookupError::Ingest {
        file: file.to_string(),
        line: record_line(err.position()),
        message: err.to_string(),
    }
}

// A line holding only spaces reads as a single whitespace cell; a tabs-only line is a real row.
fn is_blank(record: &csv::StringRecord) -> bool {
    record.len() <= 1 && record.get(0).is_none_or(|cell| cell.trim().is_empty())
}

/// Parses a tab-separated export. Quoted cells may hold tabs, newlines and `""` escapes.
pub(crate) fn parse_tsv(file: &str, content: &str) -> Result<TsvTable, LookupError> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());
    let mut records = reader.records();

    let header = loop {
        match records.next() {
            None => {
                return Err(LookupError::Ingest {
                    file: file.to_string(),
                    line: 1,
                    message: "file has no header row".into(),
                });
            }
            Some(result) => {
                let record = result.map_err(|err| csv_error(file, &err))?;
                if !is_blank(&record) {
                    break record;
                }
            }
        }
    };

    let columns: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(idx, cell)| normalize_header(cell, idx))
        .collect();

    let mut seen = HashSet::new();
    for column in &columns {
        if !seen.insert(column.to_ascii_lowercase()) {
            return Err(LookupError::Ingest {
                file: file.to_string(),
                line: record_line(header.position()),
                message: format!("duplicate column '{column}'"),
            });
        }
    }

    let mut rows = Vec::new();
    for result in records {
        let record = result.map_err(|err| csv_error(file, &err))?;
        if is_blank(&record) {
            continue;
        }
        let mut cells: Vec<String> = record.iter().map(str::to_string).collect();
        if cells.len() > columns.len() {
            return Err(LookupError::Ingest {
                file: file.to_string(),
                line: record_line(record.position()),
                message: format!(
                    "row has {} cells, header has {}",
                    cells.len(),
                    columns.len()
                ),
            });
        }
        cells.resize(columns.len(), String::new());
        rows.push(cells);
    }

    Ok(TsvTable { columns, rows })
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Opens (creating if needed) a writable pool on `database`.
pub async fn open_writable(database: &Path) -> Result<SqlitePool, LookupError> {
    if let Some(parent) = database.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let options = SqliteConnectOptions::new()
        .filename(database)
        .create_if_missing(true);

    SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .map_err(|err| LookupError::StoreUnavailable {
            path: database.display().to_string(),
            reason: err.to_string(),
            suggestion: "Check that the database directory is writable".into(),
        })
}

/// Replaces `table` with the contents of the TSV file at `path`.
pub async fn load_table(
    pool: &SqlitePool,
    path: &Path,
    table: &str,
) -> Result<TableLoad, LookupError> {
    let file = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let content = tokio::fs::read_to_string(path).await?;
    let tsv = parse_tsv(&file, &content)?;

    let table_ident = quote_ident(table);
    let column_defs = tsv
        .columns
        .iter()
        .map(|c| format!("{} TEXT", quote_ident(c)))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = (1..=tsv.columns.len())
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ");
    let insert_sql = format!("INSERT INTO {table_ident} VALUES ({placeholders})");

    let mut tx = pool.begin().await?;
    sqlx::query(&format!("DROP TABLE IF EXISTS {table_ident}"))
        .execute(&mut *tx)
        .await?;
    sqlx::query(&format!("CREATE TABLE {table_ident} ({column_defs})"))
        .execute(&mut *tx)
        .await?;
    for row in &tsv.rows {
        let mut query = sqlx::query(&insert_sql);
        for cell in row {
            query = query.bind(cell.as_str());
        }
        query.execute(&mut *tx).await?;
    }
    tx.commit().await?;

    debug!(table, file = %file, rows = tsv.rows.len(), "loaded table");
    Ok(TableLoad {
        table: table.to_string(),
        file,
        columns: tsv.columns.len(),
        rows: tsv.rows.len(),
    })
}

/// Loads every known PharmGKB export found in `dir` into `database`.
pub async fn ingest_directory(dir: &Path, database: &Path) -> Result<IngestSummary, LookupError> {
    if !dir.is_dir() {
        return Err(LookupError::InvalidArgument(format!(
            "Ingest source is not a directory: {}",
            dir.display()
        )));
    }

    let pool = open_writable(database).await?;
    let mut tables = Vec::new();
    let mut missing = Vec::new();
    for source in SOURCE_FILES {
        let path = dir.join(source.file);
        if !path.is_file() {
            warn!(file = source.file, "PharmGKB export not found, skipping");
            missing.push(source.file.to_string());
            continue;
        }
        tables.push(load_table(&pool, &path, source.table).await?);
    }
    pool.close().await;

    info!(
        database = %database.display(),
        tables = tables.len(),
        missing = missing.len(),
        "ingest finished"
    );
    Ok(IngestSummary {
        database: database.display().to_string(),
        tables,
        missing,
    })
}
