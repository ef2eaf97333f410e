mod commands;

use anyhow::{Context, Result};
use clap::Parser;
use commands::Args;
use ledger_engine::LedgerEngine;

fn main() -> Result<()> {
    // Parse the CLI arguments
    let args = Args::parse();

    // Initialize logger with default level of info (can be overridden with RUST_LOG)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // 1. Initialize the LedgerEngine
    let engine = LedgerEngine::with_config(args.engine_config());

    // 2. Open and replay the input file
    log::info!("Processing operations from {}", args.input_file.display());
    let file = std::fs::File::open(&args.input_file)
        .with_context(|| format!("Failed to open input file: {}", args.input_file.display()))?;

    engine
        .process_operations(file)
        .context("Failed to process operations")?;

    // 3. Export to stdout
    if let Some(user) = &args.statement {
        let statement = engine
            .statement(user)
            .with_context(|| format!("Failed to assemble statement for {user}"))?;
        log::info!(
            "Statement for account {}: balance {:.2}, {} records",
            statement.account_number(),
            statement.balance(),
            statement.transactions().len()
        );
        statement
            .write_csv(std::io::stdout())
            .context("Failed to export statement to stdout")?;
    } else {
        engine
            .export_accounts(std::io::stdout())
            .context("Failed to export accounts to stdout")?;
    }

    log::info!("Export complete");

    Ok(())
}
