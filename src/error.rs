#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum LookupError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Reference store unavailable at {path}: {reason}\n\nTry: {suggestion}")]
    StoreUnavailable {
        path: String,
        reason: String,
        suggestion: String,
    },

    #[error("Store query failed: {0}")]
    Store(#[from] sqlx::Error),

    #[error("Store query timed out after {timeout_secs}s: {query}")]
    StoreTimeout { query: String, timeout_secs: u64 },

    #[error("Ingest error in {file} line {line}: {message}")]
    Ingest {
        file: String,
        line: usize,
        message: String,
    },

    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::LookupError;

    #[test]
    fn store_unavailable_display_includes_path_and_suggestion() {
        let err = LookupError::StoreUnavailable {
            path: "/tmp/pharmGKB.db".to_string(),
            reason: "unable to open database file".to_string(),
            suggestion: "pgx-lookup ingest <dir-with-tsv-files>".to_string(),
        };

        let msg = err.to_string();
        assert!(msg.contains("/tmp/pharmGKB.db"));
        assert!(msg.contains("unable to open database file"));
        assert!(msg.contains("Try: pgx-lookup ingest"));
    }

    #[test]
    fn ingest_display_names_file_and_line() {
        let err = LookupError::Ingest {
            file: "genes.tsv".to_string(),
            line: 42,
            message: "row has 6 cells, header has 5".to_string(),
        };

        let msg = err.to_string();
        assert!(msg.contains("genes.tsv line 42"));
        assert!(msg.contains("header has 5"));
    }

    #[test]
    fn timeout_display_includes_seconds() {
        let err = LookupError::StoreTimeout {
            query: "relationship edges".to_string(),
            timeout_secs: 30,
        };

        let msg = err.to_string();
        assert!(msg.contains("30s"));
        assert!(msg.contains("relationship edges"));
    }
}
