use tracing::debug;

use crate::{
    command::{CommandError, LedgerCommand},
    config::LedgerConfig,
    repository::{self, AccountRepository},
    store::LedgerStore,
};

use super::{InvocationError, LedgerProcessor};

/// Runs ledger commands against a host-provided store.
pub struct ChaincodeProcessor<S> {
    repository: AccountRepository<S>,
}

impl<S> ChaincodeProcessor<S>
where
    S: LedgerStore,
{
    pub fn new(store: S, config: &LedgerConfig) -> Self {
        Self {
            repository: AccountRepository::new(store, config),
        }
    }

    pub fn repository(&self) -> &AccountRepository<S> {
        &self.repository
    }

    pub fn into_store(self) -> S {
        self.repository.into_store()
    }

    pub fn execute(&mut self, command: LedgerCommand) -> Result<Option<Vec<u8>>, InvocationError> {
        debug!(function = %command.function(), "executing");
        match command {
            LedgerCommand::Init => {
                self.repository.init()?;
                Ok(None)
            }
            LedgerCommand::CreateAccount {
                id,
                name,
                opening_balance,
                bank_codes,
            } => {
                self.repository
                    .create(&id, &name, opening_balance, &bank_codes)?;
                Ok(None)
            }
            LedgerCommand::Deposit { id, amount } => {
                self.repository.deposit(&id, amount)?;
                Ok(None)
            }
            LedgerCommand::Withdraw { id, amount } => {
                self.repository.withdraw(&id, amount)?;
                Ok(None)
            }
            LedgerCommand::GetBalance { .. } | LedgerCommand::GetAllBalances => {
                self.read(&command).map(Some)
            }
        }
    }

    fn read(&self, command: &LedgerCommand) -> Result<Vec<u8>, InvocationError> {
        let response = match command {
            LedgerCommand::GetBalance { id } => {
                repository::encode(id, &self.repository.load(id)?)?
            }
            LedgerCommand::GetAllBalances => repository::encode(
                command.function().name(),
                &self.repository.aggregate_balances()?,
            )?,
            other => {
                return Err(CommandError::NotAQuery {
                    function: other.function(),
                }
                .into());
            }
        };
        Ok(response)
    }
}

impl<S> LedgerProcessor for ChaincodeProcessor<S>
where
    S: LedgerStore,
{
    fn init(&mut self) -> Result<(), InvocationError> {
        self.execute(LedgerCommand::Init).map(|_| ())
    }

    fn invoke(
        &mut self,
        function: &str,
        args: &[String],
    ) -> Result<Option<Vec<u8>>, InvocationError> {
        let command = LedgerCommand::parse_command(function, args)?;
        self.execute(command)
    }

    fn query(&self, function: &str, args: &[String]) -> Result<Vec<u8>, InvocationError> {
        let command = LedgerCommand::parse_command(function, args)?;
        self.read(&command)
    }
}
