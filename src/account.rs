use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::allocation::{self, AllocationError, AllocationPolicy, SubLedger};

pub type AccountId = String;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    #[serde(rename = "no")]
    pub id: AccountId,
    pub name: String,
    #[serde(rename = "cashBalance")]
    pub total_balance: Decimal,
    #[serde(rename = "banks")]
    pub sub_ledgers: Vec<SubLedger>,
}

impl Account {
    pub fn open<S: AsRef<str>>(
        policy: &AllocationPolicy,
        id: impl Into<AccountId>,
        name: impl Into<String>,
        opening_balance: Decimal,
        bank_codes: &[S],
    ) -> Result<Self, AllocationError> {
        Ok(Self {
            id: id.into(),
            name: name.into(),
            total_balance: opening_balance,
            sub_ledgers: policy.initial_split(bank_codes, opening_balance)?,
        })
    }

    pub fn allocated(&self) -> Result<Decimal, AllocationError> {
        allocation::total(&self.sub_ledgers)
    }

    /// Part of the balance not reflected by the sub-ledgers (negative when
    /// they hold more than the balance).
    pub fn unallocated(&self) -> Result<Decimal, AllocationError> {
        allocation::checked_sub(self.total_balance, self.allocated()?)
    }

    pub fn is_balanced(&self) -> bool {
        matches!(self.unallocated(), Ok(diff) if diff.is_zero())
    }

    /// Leaves the account untouched on failure.
    pub fn deposit(
        &mut self,
        policy: &AllocationPolicy,
        amount: Decimal,
    ) -> Result<(), AllocationError> {
        let sub_ledgers = policy.top_up_on_deposit(&self.sub_ledgers, amount)?;
        let total_balance = allocation::checked_add(self.total_balance, amount)?;
        self.total_balance = total_balance;
        self.sub_ledgers = sub_ledgers;
        Ok(())
    }

    /// There is no insufficient funds check: the balance may go negative.
    /// Leaves the account untouched on failure.
    pub fn withdraw(
        &mut self,
        policy: &AllocationPolicy,
        amount: Decimal,
    ) -> Result<(), AllocationError> {
        if amount > self.total_balance {
            warn!(
                account = %self.id,
                balance = %self.total_balance,
                amount = %amount,
                "withdrawal exceeds balance"
            );
        }
        let drained = policy.drain_on_withdraw(&self.sub_ledgers, amount)?;
        let total_balance = allocation::checked_sub(self.total_balance, amount)?;
        if !drained.unplaced.is_zero() {
            warn!(
                account = %self.id,
                unplaced = %drained.unplaced,
                "withdrawal not fully drained from sub-ledgers"
            );
        }
        self.total_balance = total_balance;
        self.sub_ledgers = drained.sub_ledgers;
        Ok(())
    }

    pub fn warn_if_unbalanced(&self) {
        match self.allocated() {
            Ok(allocated) if allocated == self.total_balance => {}
            Ok(allocated) => warn!(
                account = %self.id,
                balance = %self.total_balance,
                allocated = %allocated,
                "account balance and sub-ledger total disagree"
            ),
            Err(err) => warn!(
                account = %self.id,
                balance = %self.total_balance,
                error = %err,
                "sub-ledger total out of range"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::prelude::FromPrimitive;

    use super::*;

    fn amount(v: u32) -> Decimal {
        Decimal::from_u32(v).unwrap()
    }

    fn open(balance: u32, codes: &[&str]) -> Account {
        Account::open(
            &AllocationPolicy::default(),
            "A1",
            "Alice",
            amount(balance),
            codes,
        )
        .unwrap()
    }

    #[test]
    fn open_splits_balance() {
        let acc = open(300_000, &["X", "Y"]);
        assert_eq!(acc.total_balance, amount(300_000));
        assert_eq!(
            acc.sub_ledgers,
            vec![
                SubLedger::new("X", amount(250_000)),
                SubLedger::new("Y", amount(50_000)),
            ]
        );
        assert!(acc.is_balanced());
    }

    #[test]
    fn open_without_banks_fails() {
        let codes: [&str; 0] = [];
        let err = Account::open(
            &AllocationPolicy::default(),
            "A1",
            "Alice",
            amount(1),
            &codes,
        )
        .unwrap_err();
        assert!(matches!(err, AllocationError::NoBankCodes));
    }

    #[test]
    fn deposit_keeps_balance_and_allocation_in_step() {
        let mut acc = open(300_000, &["X", "Y"]);
        acc.deposit(&AllocationPolicy::default(), amount(100_000))
            .unwrap();
        assert_eq!(acc.total_balance, amount(400_000));
        assert_eq!(acc.sub_ledgers[0].amount, amount(250_000));
        assert_eq!(acc.sub_ledgers[1].amount, amount(150_000));
        assert!(acc.is_balanced());
    }

    #[test]
    fn failed_deposit_leaves_account_untouched() {
        let mut acc = open(10, &["X"]);
        acc.sub_ledgers.clear();
        let before = acc.clone();
        acc.deposit(&AllocationPolicy::default(), amount(5))
            .unwrap_err();
        assert_eq!(acc, before);
    }

    #[test]
    fn withdraw_can_unbalance_account() {
        let mut acc = Account {
            id: "A1".to_string(),
            name: "Alice".to_string(),
            total_balance: amount(350_000),
            sub_ledgers: vec![
                SubLedger::new("A", amount(300_000)),
                SubLedger::new("B", amount(50_000)),
            ],
        };
        acc.withdraw(&AllocationPolicy::default(), amount(275_000))
            .unwrap();
        assert_eq!(acc.total_balance, amount(75_000));
        assert_eq!(acc.allocated().unwrap(), amount(250_000));
        assert_eq!(acc.unallocated().unwrap(), -amount(175_000));
        assert!(!acc.is_balanced());
    }

    #[test]
    fn withdraw_allows_negative_balance() {
        let mut acc = open(100, &["X"]);
        acc.withdraw(&AllocationPolicy::default(), amount(150))
            .unwrap();
        assert_eq!(acc.total_balance, -amount(50));
    }

    #[test]
    fn deposit_past_decimal_range_leaves_account_untouched() {
        let mut acc = Account::open(
            &AllocationPolicy::default(),
            "A1",
            "Alice",
            Decimal::MAX,
            &["X"],
        )
        .unwrap();
        let before = acc.clone();
        let err = acc
            .deposit(&AllocationPolicy::default(), Decimal::ONE)
            .unwrap_err();
        assert!(matches!(err, AllocationError::Overflow { .. }));
        assert_eq!(acc, before);
    }

    #[test]
    fn withdraw_past_decimal_range_leaves_account_untouched() {
        let mut acc = Account {
            id: "A1".to_string(),
            name: "Alice".to_string(),
            total_balance: Decimal::MIN,
            sub_ledgers: vec![SubLedger::new("X", Decimal::ZERO)],
        };
        let before = acc.clone();
        let err = acc
            .withdraw(&AllocationPolicy::default(), Decimal::ONE)
            .unwrap_err();
        assert!(matches!(err, AllocationError::Overflow { .. }));
        assert_eq!(acc, before);
    }

    #[test]
    fn out_of_range_allocation_is_not_balanced() {
        let acc = Account {
            id: "A1".to_string(),
            name: "Alice".to_string(),
            total_balance: Decimal::ZERO,
            sub_ledgers: vec![
                SubLedger::new("X", Decimal::MAX),
                SubLedger::new("Y", Decimal::MAX),
            ],
        };
        assert!(acc.allocated().is_err());
        assert!(!acc.is_balanced());
    }

    #[test]
    fn serialized_field_names() {
        let acc = open(5, &["X"]);
        let json: serde_json::Value = serde_json::to_value(&acc).unwrap();
        assert_eq!(json["no"], "A1");
        assert_eq!(json["name"], "Alice");
        assert_eq!(json["cashBalance"], "5");
        assert_eq!(json["banks"][0]["bankcode"], "X");
        assert_eq!(json["banks"][0]["amount"], "5");
    }
}
