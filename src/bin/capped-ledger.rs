use std::fs::File;

use anyhow::{Context, Result};
use capped_ledger::{bin_utils::Service, config::LedgerConfig, processor::ErrorKind};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let filename = std::env::args()
        .nth(1)
        .context("Expected a script file name as the first argument")?;
    let file = File::open(&filename).with_context(|| format!("Failed to open `{filename}`"))?;
    let config = LedgerConfig::from_env().context("Invalid ledger configuration")?;

    let service = Service {
        input: file,
        output: &mut std::io::stdout(),
        config,
        error_printer: Box::new(|line, err| {
            let kind = err.kind();
            match kind {
                ErrorKind::StoreError | ErrorKind::CorruptRecord => {
                    eprintln!("Error at line {line} ({kind:?}): {err}")
                }
                _ => eprintln!("Rejected at line {line} ({kind:?}): {err}"),
            }
        }),
    };
    service.run()
}
