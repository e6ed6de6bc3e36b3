use std::{collections::HashSet, fmt, str::FromStr};

use rust_decimal::Decimal;
use thiserror::Error;

use crate::account::AccountId;

/// Operation names a host may invoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerFunction {
    Init,
    CreateAccount,
    DepositMoney,
    WithdrawMoney,
    GetBalance,
    GetAllBalances,
}

impl LedgerFunction {
    pub fn name(&self) -> &'static str {
        match self {
            LedgerFunction::Init => "init",
            LedgerFunction::CreateAccount => "createAccount",
            LedgerFunction::DepositMoney => "depositMoney",
            LedgerFunction::WithdrawMoney => "withdrawMoney",
            LedgerFunction::GetBalance => "getBalance",
            LedgerFunction::GetAllBalances => "getAllBalances",
        }
    }
}

impl fmt::Display for LedgerFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LedgerFunction {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "init" => Ok(LedgerFunction::Init),
            "createAccount" => Ok(LedgerFunction::CreateAccount),
            "depositMoney" => Ok(LedgerFunction::DepositMoney),
            "withdrawMoney" => Ok(LedgerFunction::WithdrawMoney),
            "getBalance" => Ok(LedgerFunction::GetBalance),
            "getAllBalances" => Ok(LedgerFunction::GetAllBalances),
            _ => Err(CommandError::UnknownFunction {
                name: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Unknown function `{name}`")]
    UnknownFunction { name: String },
    #[error("{function} expects {expected} arguments, got {actual}")]
    WrongArgumentCount {
        function: LedgerFunction,
        expected: usize,
        actual: usize,
    },
    #[error("{function} cannot read `{value}` as an amount")]
    InvalidAmount {
        function: LedgerFunction,
        value: String,
        source: rust_decimal::Error,
    },
    #[error("Amount must not be negative for {function}, got {amount}")]
    NegativeAmount {
        function: LedgerFunction,
        amount: Decimal,
    },
    #[error("Bank code at position {position} is empty")]
    EmptyBankCode { position: usize },
    #[error("Bank code `{code}` is listed more than once")]
    DuplicateBankCode { code: String },
    #[error("{function} modifies the ledger and cannot run as a query")]
    NotAQuery { function: LedgerFunction },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerCommand {
    Init,
    CreateAccount {
        id: AccountId,
        name: String,
        opening_balance: Decimal,
        bank_codes: Vec<String>,
    },
    Deposit {
        id: AccountId,
        amount: Decimal,
    },
    Withdraw {
        id: AccountId,
        amount: Decimal,
    },
    GetBalance {
        id: AccountId,
    },
    GetAllBalances,
}

impl LedgerCommand {
    pub fn function(&self) -> LedgerFunction {
        match self {
            LedgerCommand::Init => LedgerFunction::Init,
            LedgerCommand::CreateAccount { .. } => LedgerFunction::CreateAccount,
            LedgerCommand::Deposit { .. } => LedgerFunction::DepositMoney,
            LedgerCommand::Withdraw { .. } => LedgerFunction::WithdrawMoney,
            LedgerCommand::GetBalance { .. } => LedgerFunction::GetBalance,
            LedgerCommand::GetAllBalances => LedgerFunction::GetAllBalances,
        }
    }

    pub fn parse_command<A: AsRef<str>>(function: &str, args: &[A]) -> Result<Self, CommandError> {
        let function = LedgerFunction::from_str(function)?;
        match function {
            // arguments of init are ignored
            LedgerFunction::Init => Ok(Self::Init),
            LedgerFunction::CreateAccount => {
                let [id, name, balance, banks] = expect_args::<_, 4>(function, args)?;
                Ok(Self::CreateAccount {
                    id: id.to_string(),
                    name: name.to_string(),
                    opening_balance: parse_amount(function, balance)?,
                    bank_codes: parse_bank_codes(banks)?,
                })
            }
            LedgerFunction::DepositMoney => {
                let [id, amount] = expect_args::<_, 2>(function, args)?;
                Ok(Self::Deposit {
                    id: id.to_string(),
                    amount: parse_amount(function, amount)?,
                })
            }
            LedgerFunction::WithdrawMoney => {
                let [id, amount] = expect_args::<_, 2>(function, args)?;
                Ok(Self::Withdraw {
                    id: id.to_string(),
                    amount: parse_amount(function, amount)?,
                })
            }
            LedgerFunction::GetBalance => {
                let [id] = expect_args::<_, 1>(function, args)?;
                Ok(Self::GetBalance { id: id.to_string() })
            }
            LedgerFunction::GetAllBalances => {
                expect_args::<_, 0>(function, args)?;
                Ok(Self::GetAllBalances)
            }
        }
    }
}

fn expect_args<A: AsRef<str>, const N: usize>(
    function: LedgerFunction,
    args: &[A],
) -> Result<[&str; N], CommandError> {
    if args.len() != N {
        return Err(CommandError::WrongArgumentCount {
            function,
            expected: N,
            actual: args.len(),
        });
    }
    Ok(std::array::from_fn(|i| args[i].as_ref()))
}

fn parse_amount(function: LedgerFunction, value: &str) -> Result<Decimal, CommandError> {
    let amount = Decimal::from_str(value.trim()).map_err(|source| CommandError::InvalidAmount {
        function,
        value: value.to_string(),
        source,
    })?;
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(CommandError::NegativeAmount { function, amount });
    }
    Ok(amount)
}

/// Splits `X:Y:Z` into bank codes, each non-empty and listed once.
pub fn parse_bank_codes(value: &str) -> Result<Vec<String>, CommandError> {
    let mut seen = HashSet::new();
    value
        .split(':')
        .enumerate()
        .map(|(position, code)| {
            let code = code.trim();
            if code.is_empty() {
                return Err(CommandError::EmptyBankCode { position });
            }
            if !seen.insert(code) {
                return Err(CommandError::DuplicateBankCode {
                    code: code.to_string(),
                });
            }
            Ok(code.to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use rust_decimal::prelude::FromPrimitive;

    use super::*;

    #[test]
    fn function_names_round_trip() {
        for function in [
            LedgerFunction::Init,
            LedgerFunction::CreateAccount,
            LedgerFunction::DepositMoney,
            LedgerFunction::WithdrawMoney,
            LedgerFunction::GetBalance,
            LedgerFunction::GetAllBalances,
        ] {
            assert_eq!(LedgerFunction::from_str(function.name()).unwrap(), function);
        }
    }

    #[test]
    fn parse_create_account() {
        let cmd = LedgerCommand::parse_command("createAccount", &["A1", "Alice", "300000", "X:Y"])
            .unwrap();
        assert_eq!(
            cmd,
            LedgerCommand::CreateAccount {
                id: "A1".to_string(),
                name: "Alice".to_string(),
                opening_balance: Decimal::from_u32(300_000).unwrap(),
                bank_codes: vec!["X".to_string(), "Y".to_string()],
            }
        );
        assert_eq!(cmd.function(), LedgerFunction::CreateAccount);
    }

    #[test]
    fn parse_deposit_and_withdraw() {
        let cmd = LedgerCommand::parse_command("depositMoney", &["A1", "10.25"]).unwrap();
        assert_eq!(
            cmd,
            LedgerCommand::Deposit {
                id: "A1".to_string(),
                amount: Decimal::new(1025, 2),
            }
        );
        let cmd = LedgerCommand::parse_command("withdrawMoney", &["A1", "3"]).unwrap();
        assert!(matches!(cmd, LedgerCommand::Withdraw { amount, .. } if amount == Decimal::from(3)));
    }

    #[test]
    fn parse_queries() {
        let no_args: [&str; 0] = [];
        assert_eq!(
            LedgerCommand::parse_command("getBalance", &["A1"]).unwrap(),
            LedgerCommand::GetBalance {
                id: "A1".to_string()
            }
        );
        assert_eq!(
            LedgerCommand::parse_command("getAllBalances", &no_args).unwrap(),
            LedgerCommand::GetAllBalances
        );
        assert_eq!(
            LedgerCommand::parse_command("init", &["whatever"]).unwrap(),
            LedgerCommand::Init
        );
    }

    #[test]
    fn unknown_function() {
        let err = LedgerCommand::parse_command("transfer", &["A1"]).unwrap_err();
        assert!(matches!(err, CommandError::UnknownFunction { name } if name == "transfer"));
    }

    #[test]
    fn wrong_argument_count() {
        let err = LedgerCommand::parse_command("depositMoney", &["A1"]).unwrap_err();
        assert!(matches!(
            err,
            CommandError::WrongArgumentCount {
                function: LedgerFunction::DepositMoney,
                expected: 2,
                actual: 1
            }
        ));
        assert_eq!(err.to_string(), "depositMoney expects 2 arguments, got 1");
    }

    #[test]
    fn invalid_amounts() {
        let err = LedgerCommand::parse_command("depositMoney", &["A1", "ten"]).unwrap_err();
        assert!(matches!(err, CommandError::InvalidAmount { value, .. } if value == "ten"));

        let err = LedgerCommand::parse_command("withdrawMoney", &["A1", "-5"]).unwrap_err();
        assert!(matches!(
            err,
            CommandError::NegativeAmount {
                function: LedgerFunction::WithdrawMoney,
                ..
            }
        ));
    }

    #[test]
    fn bank_code_validation() {
        assert_eq!(parse_bank_codes("X").unwrap(), vec!["X".to_string()]);
        assert!(matches!(
            parse_bank_codes("").unwrap_err(),
            CommandError::EmptyBankCode { position: 0 }
        ));
        assert!(matches!(
            parse_bank_codes("X::Y").unwrap_err(),
            CommandError::EmptyBankCode { position: 1 }
        ));
        assert!(matches!(
            parse_bank_codes("X:Y:X").unwrap_err(),
            CommandError::DuplicateBankCode { code } if code == "X"
        ));
    }
}
