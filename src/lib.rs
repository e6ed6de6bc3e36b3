/// Splitting an account balance across capped sub-ledgers ("banks").
/// Pure functions, no I/O.
pub mod allocation;

/// Account record and its balance invariant.
pub mod account;

/// Turns a host function name plus string arguments into a [`command::LedgerCommand`].
pub mod command;

/// Process-wide settings (cap, index key) read from the environment.
pub mod config;

/// Key-value interface supplied by the host, plus "in memory" implementation.
pub mod store;

/// Loads and saves accounts, and keeps the index of all account ids.
pub mod repository;

/// Host entry points (`init`, `invoke`, `query`) dispatching parsed commands
/// to the repository.
pub mod processor;

/// Command line bootstrap. Lives in the library so integration tests can
/// drive it.
pub mod bin_utils;
