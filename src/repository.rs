use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    account::{Account, AccountId},
    allocation::{self, AllocationError, AllocationPolicy},
    config::LedgerConfig,
    store::{LedgerStore, StoreError},
};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Account `{id}` already exists")]
    AlreadyExists { id: AccountId },
    #[error("No record found for `{key}`")]
    NotFound { key: String },
    #[error("Record `{key}` cannot be decoded: {source}")]
    CorruptRecord {
        key: String,
        source: serde_json::Error,
    },
    #[error("Record `{key}` cannot be encoded: {source}")]
    Encode {
        key: String,
        source: serde_json::Error,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Cannot allocate {amount} for account `{id}`: {source}")]
    Allocation {
        id: AccountId,
        amount: Decimal,
        source: AllocationError,
    },
}

/// Ids of every account ever created, in creation order.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountIndex {
    ids: Vec<AccountId>,
}

impl AccountIndex {
    pub fn ids(&self) -> &[AccountId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    fn push(&mut self, id: AccountId) {
        self.ids.push(id);
    }
}

/// Sum of one sub-ledger position across all accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankBalance {
    pub code: String,
    #[serde(rename = "totalAmount")]
    pub total_amount: Decimal,
}

/// Account records keyed by id, plus the single [`AccountIndex`] record.
///
/// Nothing here guards the index read-modify-write: the host is expected to
/// run one invocation at a time.
pub struct AccountRepository<S> {
    store: S,
    policy: AllocationPolicy,
    index_key: String,
}

impl<S> AccountRepository<S>
where
    S: LedgerStore,
{
    pub fn new(store: S, config: &LedgerConfig) -> Self {
        Self {
            store,
            policy: AllocationPolicy::new(config.cap),
            index_key: config.index_key.clone(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Resets the account index to an empty list.
    pub fn init(&mut self) -> Result<(), RepositoryError> {
        self.save_index(&AccountIndex::default())?;
        info!(key = %self.index_key, "account index initialized");
        Ok(())
    }

    pub fn create<C: AsRef<str>>(
        &mut self,
        id: &str,
        name: &str,
        opening_balance: Decimal,
        bank_codes: &[C],
    ) -> Result<Account, RepositoryError> {
        if let Some(bytes) = self.read(id)? {
            // an undecodable record is still reported as such
            decode::<Account>(id, &bytes)?;
            return Err(RepositoryError::AlreadyExists { id: id.to_owned() });
        }
        let account = Account::open(&self.policy, id, name, opening_balance, bank_codes)
            .map_err(|source| RepositoryError::Allocation {
                id: id.to_owned(),
                amount: opening_balance,
                source,
            })?;
        let mut index = self.load_index()?;

        self.save(&account)?;
        index.push(account.id.clone());
        self.save_index(&index)?;

        info!(
            account = %account.id,
            balance = %account.total_balance,
            banks = account.sub_ledgers.len(),
            "account created"
        );
        Ok(account)
    }

    pub fn load(&self, id: &str) -> Result<Account, RepositoryError> {
        let bytes = self
            .read(id)?
            .ok_or_else(|| RepositoryError::NotFound { key: id.to_owned() })?;
        decode(id, &bytes)
    }

    pub fn save(&mut self, account: &Account) -> Result<(), RepositoryError> {
        let bytes = encode(&account.id, account)?;
        debug!(key = %account.id, size = bytes.len(), "writing account");
        self.store.put(&account.id, bytes)?;
        Ok(())
    }

    pub fn deposit(&mut self, id: &str, amount: Decimal) -> Result<Account, RepositoryError> {
        let mut account = self.load(id)?;
        account
            .deposit(&self.policy, amount)
            .map_err(|source| RepositoryError::Allocation {
                id: id.to_owned(),
                amount,
                source,
            })?;
        account.warn_if_unbalanced();
        self.save(&account)?;
        info!(account = %id, amount = %amount, balance = %account.total_balance, "deposited");
        Ok(account)
    }

    pub fn withdraw(&mut self, id: &str, amount: Decimal) -> Result<Account, RepositoryError> {
        let mut account = self.load(id)?;
        account
            .withdraw(&self.policy, amount)
            .map_err(|source| RepositoryError::Allocation {
                id: id.to_owned(),
                amount,
                source,
            })?;
        account.warn_if_unbalanced();
        self.save(&account)?;
        info!(account = %id, amount = %amount, balance = %account.total_balance, "withdrawn");
        Ok(account)
    }

    pub fn load_index(&self) -> Result<AccountIndex, RepositoryError> {
        let bytes = self
            .read(&self.index_key)?
            .ok_or_else(|| RepositoryError::NotFound {
                key: self.index_key.clone(),
            })?;
        decode(&self.index_key, &bytes)
    }

    /// Every indexed account, in index order.
    pub fn accounts(&self) -> Result<Vec<Account>, RepositoryError> {
        self.load_index()?
            .ids()
            .iter()
            .map(|id| self.load(id))
            .collect()
    }

    /// Sums sub-ledgers position by position across all accounts.
    ///
    /// Positions are matched by index only, the code of a position comes from
    /// the first account that has it. Accounts with different bank lists or
    /// orders are summed all the same.
    pub fn aggregate_balances(&self) -> Result<Vec<BankBalance>, RepositoryError> {
        let mut totals: Vec<BankBalance> = Vec::new();
        for account in self.accounts()? {
            for (position, bank) in account.sub_ledgers.iter().enumerate() {
                match totals.get_mut(position) {
                    Some(entry) => {
                        entry.total_amount =
                            allocation::checked_add(entry.total_amount, bank.amount).map_err(
                                |source| RepositoryError::Allocation {
                                    id: account.id.clone(),
                                    amount: bank.amount,
                                    source,
                                },
                            )?;
                    }
                    None => totals.push(BankBalance {
                        code: bank.code.clone(),
                        total_amount: bank.amount,
                    }),
                }
            }
        }
        Ok(totals)
    }

    fn save_index(&mut self, index: &AccountIndex) -> Result<(), RepositoryError> {
        let bytes = encode(&self.index_key, index)?;
        debug!(key = %self.index_key, accounts = index.len(), "writing account index");
        self.store.put(&self.index_key, bytes)?;
        Ok(())
    }

    /// Empty values count as absent, hosts report missing keys either way.
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, RepositoryError> {
        let bytes = self.store.get(key)?.filter(|bytes| !bytes.is_empty());
        debug!(key, found = bytes.is_some(), "reading record");
        Ok(bytes)
    }
}

fn decode<T: DeserializeOwned>(key: &str, bytes: &[u8]) -> Result<T, RepositoryError> {
    serde_json::from_slice(bytes).map_err(|source| RepositoryError::CorruptRecord {
        key: key.to_owned(),
        source,
    })
}

pub(crate) fn encode<T: Serialize>(key: &str, value: &T) -> Result<Vec<u8>, RepositoryError> {
    serde_json::to_vec(value).map_err(|source| RepositoryError::Encode {
        key: key.to_owned(),
        source,
    })
}
