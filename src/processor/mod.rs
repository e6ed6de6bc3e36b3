use thiserror::Error;

use crate::{command::CommandError, repository::RepositoryError};

pub mod chaincode_processor;

/// Closed classification of every invocation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    AlreadyExists,
    NotFound,
    CorruptRecord,
    StoreError,
}

#[derive(Debug, Error)]
pub enum InvocationError {
    #[error(transparent)]
    CommandErr(#[from] CommandError),
    #[error(transparent)]
    RepositoryErr(#[from] RepositoryError),
}

impl InvocationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            InvocationError::CommandErr(_) => ErrorKind::InvalidInput,
            InvocationError::RepositoryErr(err) => match err {
                RepositoryError::AlreadyExists { .. } => ErrorKind::AlreadyExists,
                RepositoryError::NotFound { .. } => ErrorKind::NotFound,
                RepositoryError::CorruptRecord { .. } | RepositoryError::Encode { .. } => {
                    ErrorKind::CorruptRecord
                }
                RepositoryError::Store(_) => ErrorKind::StoreError,
                RepositoryError::Allocation { .. } => ErrorKind::InvalidInput,
            },
        }
    }
}

/// Entry points a chaincode host calls.
///
/// `invoke` accepts every function, `query` only the read-only ones and never
/// writes to the store.
pub trait LedgerProcessor {
    fn init(&mut self) -> Result<(), InvocationError>;

    fn invoke(
        &mut self,
        function: &str,
        args: &[String],
    ) -> Result<Option<Vec<u8>>, InvocationError>;

    fn query(&self, function: &str, args: &[String]) -> Result<Vec<u8>, InvocationError>;
}
