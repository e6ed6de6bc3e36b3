//! Bootstraps [`crate::processor`] for the command line: replays an
//! invocation script against an in-memory store and prints every account's
//! allocation.

use std::io::{Read, Write};

use crate::{
    config::LedgerConfig,
    processor::{
        ErrorKind, InvocationError, LedgerProcessor, chaincode_processor::ChaincodeProcessor,
    },
    repository::RepositoryError,
    store::in_memory_store::InMemoryLedgerStore,
};
use anyhow::{Context, Result};
use csv_printer::print_accounts;
use script_parser::ScriptParser;
use thiserror::Error;
use tracing::debug;
pub mod csv_printer;
pub mod script_parser;

/// A script row that was not applied.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("Unreadable script row: {0}")]
    Script(#[from] csv::Error),
    #[error(transparent)]
    Invocation(#[from] InvocationError),
}

impl ReplayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReplayError::Script(_) => ErrorKind::InvalidInput,
            ReplayError::Invocation(err) => err.kind(),
        }
    }
}

pub struct Service<'w, R, W: 'w> {
    pub input: R,
    pub output: &'w mut W,
    pub config: LedgerConfig,
    pub error_printer: Box<dyn FnMut(u64, ReplayError)>,
}

impl<'w, R, W> Service<'w, R, W>
where
    R: Read,
    W: Write + 'w,
{
    pub fn run(mut self) -> Result<()> {
        let parser = ScriptParser::new(self.input);

        let mut processor = ChaincodeProcessor::new(InMemoryLedgerStore::default(), &self.config);

        for (line, row) in parser {
            let invocation = match row {
                Ok(invocation) => invocation,
                Err(err) => {
                    (self.error_printer)(line, err.into());
                    continue;
                }
            };
            match processor.invoke(&invocation.function, &invocation.args) {
                Ok(Some(response)) => {
                    debug!(line, function = %invocation.function, size = response.len(), "query answered")
                }
                Ok(None) => {}
                Err(err) => (self.error_printer)(line, err.into()),
            }
        }

        // a script that never ran `init` has nothing to report
        let accounts = match processor.repository().load_index() {
            Ok(_) => processor
                .repository()
                .accounts()
                .context("Failed to load accounts")?,
            Err(RepositoryError::NotFound { .. }) => Vec::new(),
            Err(err) => return Err(err).context("Failed to load account index"),
        };
        print_accounts(self.output, &accounts)
    }
}
