use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use ledger_engine::EngineConfig;

#[derive(Parser, Debug)]
#[command(
    name = "ledger-engine",
    author,
    version,
    about = "Replay account operations through the ledger engine",
    long_about = None,
    after_help = "OUTPUT:\n    Account balances (or one user's statement) are printed to stdout in CSV format.\n    Use shell redirection to save to a file:\n\n    ledger-engine operations.csv > accounts.csv"
)]
pub struct Args {
    /// Path to the input operations CSV file
    #[arg(
        index = 1,
        value_name = "FILE",
        help = "Input CSV file with columns: op, user, account, amount, password, beneficiary_name, beneficiary_account, bank_name, iban, country, routing_number, swift_code, account_type, description"
    )]
    pub input_file: PathBuf,

    /// Print this user's statement instead of the account list
    #[arg(long, value_name = "USER")]
    pub statement: Option<String>,

    /// Longest wait for exclusive access to an account
    #[arg(long, value_name = "MS", default_value_t = 5_000)]
    pub lock_timeout_ms: u64,

    /// Don't record transfers aborted by store failures
    #[arg(long)]
    pub no_failed_records: bool,
}

impl Args {
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig::default()
            .with_lock_timeout(Duration::from_millis(self.lock_timeout_ms))
            .with_failed_records(!self.no_failed_records)
    }
}
