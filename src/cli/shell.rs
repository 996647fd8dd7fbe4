use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::warn;

use crate::cli::{lookup, open_store};
use crate::config::LookupConfig;
use crate::entities::ResolveOptions;
use crate::error::LookupError;
use crate::sources::ReferenceStore;

pub const PROMPT: &str = "Enter the name of a gene, drug, or phenotype: ";
pub const FAREWELL: &str = "Thank you for using our system!";

/// Prompt loop over stdin/stdout against the configured database.
pub async fn run_stdio(config: &LookupConfig, json: bool) -> Result<(), LookupError> {
    let store = open_store(config).await?;
    let options = ResolveOptions::from(config);
    let reader = BufReader::new(tokio::io::stdin());
    let mut writer = tokio::io::stdout();
    run(&store, &options, json, reader, &mut writer).await
}

/// Reads one term per line until end of input, writing each report after the prompt.
///
/// Lookup failures are written in place of the report and the loop continues.
pub async fn run<R, W>(
    store: &dyn ReferenceStore,
    options: &ResolveOptions,
    json: bool,
    reader: R,
    writer: &mut W,
) -> Result<(), LookupError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    loop {
        writer.write_all(PROMPT.as_bytes()).await?;
        writer.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let term = line.trim();
        if term.is_empty() {
            continue;
        }

        let output = match lookup(store, term, options, json).await {
            Ok(output) => output,
            Err(err) => {
                warn!(term, error = %err, "lookup failed");
                format!("Error: {err}")
            }
        };
        writer.write_all(output.as_bytes()).await?;
        if !output.ends_with('\n') {
            writer.write_all(b"\n").await?;
        }
        writer.write_all(b"\n").await?;
    }

    writer.write_all(b"\n").await?;
    writer.write_all(FAREWELL.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}
