use futures::StreamExt;
use serde::Serialize;
use tracing::warn;

use crate::entities::{Resolution, ResolveOptions, resolve};
use crate::error::LookupError;
use crate::render;
use crate::sources::ReferenceStore;

pub const DEFAULT_CONCURRENCY: usize = 4;

#[derive(Debug)]
pub struct BatchEntry {
    pub term: String,
    pub outcome: Result<Resolution, LookupError>,
}

#[derive(Serialize)]
struct BatchJsonEntry<'a> {
    term: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<&'a Resolution>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// One term per non-blank line; lines starting with `#` are comments.
pub fn parse_terms(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Resolves `terms` with up to `concurrency` lookups in flight; results keep input order.
pub async fn run(
    store: &dyn ReferenceStore,
    options: &ResolveOptions,
    terms: Vec<String>,
    concurrency: usize,
) -> Vec<BatchEntry> {
    futures::stream::iter(terms.into_iter().map(move |term| async move {
        let outcome = resolve(store, &term, options).await;
        if let Err(err) = &outcome {
            warn!(term = %term, error = %err, "batch lookup failed");
        }
        BatchEntry { term, outcome }
    }))
    .buffered(concurrency.max(1))
    .collect()
    .await
}

pub fn to_markdown(entries: &[BatchEntry]) -> Result<String, LookupError> {
    let mut out = String::new();
    for entry in entries {
        out.push_str(&format!("## {}\n\n", entry.term));
        match &entry.outcome {
            Ok(resolution) => out.push_str(&render::markdown::resolution_markdown(resolution)?),
            Err(err) => out.push_str(&format!("Error: {err}\n")),
        }
        out.push('\n');
    }
    Ok(out)
}

pub fn to_json(entries: &[BatchEntry]) -> Result<String, LookupError> {
    let rows: Vec<BatchJsonEntry<'_>> = entries
        .iter()
        .map(|entry| match &entry.outcome {
            Ok(resolution) => BatchJsonEntry {
                term: &entry.term,
                result: Some(resolution),
                error: None,
            },
            Err(err) => BatchJsonEntry {
                term: &entry.term,
                result: None,
                error: Some(err.to_string()),
            },
        })
        .collect();
    render::json::to_pretty(&rows)
}
