use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum amount a single sub-ledger holds after a clean allocation pass.
pub const DEFAULT_CAP: Decimal = Decimal::from_parts(250_000, 0, 0, false, 0);

/// One capped bucket ("bank") of an account's funds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubLedger {
    #[serde(rename = "bankcode")]
    pub code: String,
    pub amount: Decimal,
}

impl SubLedger {
    pub fn new(code: impl Into<String>, amount: Decimal) -> Self {
        Self {
            code: code.into(),
            amount,
        }
    }
}

#[derive(Debug, Error)]
pub enum AllocationError {
    #[error("At least one bank code is required to split an amount")]
    NoBankCodes,
    #[error("Cannot place {leftover} without any sub-ledger")]
    NoSubLedgers { leftover: Decimal },
    #[error("Applying {change} to {base} is out of the decimal range")]
    Overflow { base: Decimal, change: Decimal },
}

pub(crate) fn checked_add(base: Decimal, change: Decimal) -> Result<Decimal, AllocationError> {
    base.checked_add(change)
        .ok_or(AllocationError::Overflow { base, change })
}

pub(crate) fn checked_sub(base: Decimal, change: Decimal) -> Result<Decimal, AllocationError> {
    base.checked_sub(change)
        .ok_or(AllocationError::Overflow {
            base,
            change: -change,
        })
}

/// Sum of all sub-ledger amounts.
pub fn total(sub_ledgers: &[SubLedger]) -> Result<Decimal, AllocationError> {
    sub_ledgers
        .iter()
        .try_fold(Decimal::ZERO, |sum, s| checked_add(sum, s.amount))
}

/// Allocation rules for a given cap.
///
/// Every amount that cannot be placed under the cap ends up in the *first*
/// sub-ledger, so that one may hold more than `cap`. All arithmetic is
/// checked, an out of range result is an [`AllocationError::Overflow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocationPolicy {
    pub cap: Decimal,
}

impl Default for AllocationPolicy {
    fn default() -> Self {
        Self { cap: DEFAULT_CAP }
    }
}

impl AllocationPolicy {
    pub fn new(cap: Decimal) -> Self {
        Self { cap }
    }

    /// Fills banks in order, `cap` each, until `amount` runs out.
    pub fn initial_split<S: AsRef<str>>(
        &self,
        bank_codes: &[S],
        amount: Decimal,
    ) -> Result<Vec<SubLedger>, AllocationError> {
        if bank_codes.is_empty() {
            return Err(AllocationError::NoBankCodes);
        }
        let mut remaining = amount;
        let mut banks = Vec::with_capacity(bank_codes.len());
        for code in bank_codes {
            let share = if remaining >= self.cap {
                self.cap
            } else {
                remaining
            };
            remaining = checked_sub(remaining, share)?;
            banks.push(SubLedger::new(code.as_ref(), share));
        }

        if remaining > Decimal::ZERO {
            banks[0].amount = checked_add(banks[0].amount, remaining)?;
        }
        Ok(banks)
    }

    /// Tops every bank below `cap` up toward it, in order.
    pub fn top_up_on_deposit(
        &self,
        sub_ledgers: &[SubLedger],
        deposit: Decimal,
    ) -> Result<Vec<SubLedger>, AllocationError> {
        let mut remaining = deposit;
        let mut banks = sub_ledgers.to_vec();
        for bank in banks.iter_mut() {
            if remaining <= Decimal::ZERO {
                break;
            }
            if bank.amount < self.cap {
                let take = checked_sub(self.cap, bank.amount)?.min(remaining);
                bank.amount = checked_add(bank.amount, take)?;
                remaining = checked_sub(remaining, take)?;
            }
        }

        if remaining > Decimal::ZERO {
            let Some(first) = banks.first_mut() else {
                return Err(AllocationError::NoSubLedgers {
                    leftover: remaining,
                });
            };
            first.amount = checked_add(first.amount, remaining)?;
        }
        Ok(banks)
    }

    /// Takes excess above `cap` first, then drains banks from last to first.
    ///
    /// The reverse pass does not plain-subtract: when a bank holds less than
    /// what is still owed, the owed amount drops by the bank's amount and the
    /// bank is *set to the new owed amount*. So `[300000, 50000]` minus
    /// `275000` under a cap of `250000` ends as `[75000, 175000]`, and the
    /// sub-ledger total no longer matches the account total. This is the
    /// established ledger behavior; callers detect the mismatch with
    /// [`crate::account::Account::is_balanced`].
    pub fn drain_on_withdraw(
        &self,
        sub_ledgers: &[SubLedger],
        withdrawal: Decimal,
    ) -> Result<Drained, AllocationError> {
        let mut remaining = withdrawal;
        let mut banks = sub_ledgers.to_vec();

        for bank in banks.iter_mut() {
            if remaining <= Decimal::ZERO {
                break;
            }
            if bank.amount > self.cap {
                let take = checked_sub(bank.amount, self.cap)?.min(remaining);
                bank.amount = checked_sub(bank.amount, take)?;
                remaining = checked_sub(remaining, take)?;
            }
        }

        for bank in banks.iter_mut().rev() {
            if remaining <= Decimal::ZERO {
                break;
            }
            if bank.amount >= remaining {
                bank.amount = checked_sub(bank.amount, remaining)?;
                remaining = Decimal::ZERO;
            } else {
                remaining = checked_sub(remaining, bank.amount)?;
                bank.amount = remaining;
            }
        }

        Ok(Drained {
            sub_ledgers: banks,
            unplaced: remaining,
        })
    }
}

/// Outcome of [`AllocationPolicy::drain_on_withdraw`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Drained {
    pub sub_ledgers: Vec<SubLedger>,
    /// Withdrawal amount still owed after both passes.
    pub unplaced: Decimal,
}

pub fn initial_split<S: AsRef<str>>(
    bank_codes: &[S],
    amount: Decimal,
) -> Result<Vec<SubLedger>, AllocationError> {
    AllocationPolicy::default().initial_split(bank_codes, amount)
}

pub fn top_up_on_deposit(
    sub_ledgers: &[SubLedger],
    deposit: Decimal,
) -> Result<Vec<SubLedger>, AllocationError> {
    AllocationPolicy::default().top_up_on_deposit(sub_ledgers, deposit)
}

pub fn drain_on_withdraw(
    sub_ledgers: &[SubLedger],
    withdrawal: Decimal,
) -> Result<Vec<SubLedger>, AllocationError> {
    Ok(AllocationPolicy::default()
        .drain_on_withdraw(sub_ledgers, withdrawal)?
        .sub_ledgers)
}
