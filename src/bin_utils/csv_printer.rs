use std::io::Write;

use csv::Writer;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::account::Account;

/// One sub-ledger of one account.
#[derive(Debug, Serialize)]
pub struct AllocationRow<'a> {
    pub account: &'a str,
    pub name: &'a str,
    pub total: Decimal,
    pub bank: &'a str,
    pub amount: Decimal,
}

pub fn allocation_rows(account: &Account) -> impl Iterator<Item = AllocationRow<'_>> {
    account.sub_ledgers.iter().map(move |bank| AllocationRow {
        account: &account.id,
        name: &account.name,
        total: account.total_balance,
        bank: &bank.code,
        amount: bank.amount,
    })
}

pub fn print_accounts<W>(output: &mut W, accounts: &[Account]) -> anyhow::Result<()>
where
    W: Write,
{
    let mut writer = Writer::from_writer(output);
    for row in accounts.iter().flat_map(allocation_rows) {
        if let Err(err) = writer.serialize(row) {
            anyhow::bail!("Failed to write to CSV: {err}")
        }
    }
    // Ensure all data is flushed to the output
    if let Err(err) = writer.flush() {
        anyhow::bail!("Failed to flush CSV writer: {err}")
    }
    Ok(())
}
