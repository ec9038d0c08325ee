use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::application::{
    DEFAULT_RECENT_COUNT, DEFAULT_SEED_BALANCE, Session, WalletConfig,
};
use crate::domain::{CommissionRate, Ledger, Pesos, format_pesos, parse_pesos};

mod shell;

pub use shell::Shell;

/// Plata - Seguro tu Plata wallet simulator
#[derive(Parser)]
#[command(name = "plata")]
#[command(about = "A simulated single-user wallet with withdrawal commissions")]
#[command(version)]
pub struct Cli {
    /// Balance the wallet opens with, in whole pesos
    #[arg(long, env = "PLATA_SEED_BALANCE", default_value_t = DEFAULT_SEED_BALANCE)]
    pub seed_balance: Pesos,

    /// Withdrawal commission rate (e.g., "0.10" or "10%")
    #[arg(long, env = "PLATA_COMMISSION", default_value = "0.10")]
    pub commission: CommissionRate,

    /// Number of movements shown on the dashboard
    #[arg(long, env = "PLATA_RECENT", default_value_t = DEFAULT_RECENT_COUNT)]
    pub recent: usize,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start an interactive wallet session (default)
    Shell,

    /// Preview the commission and total debit for a withdrawal
    Quote {
        /// Amount to withdraw, in whole pesos
        #[arg(allow_hyphen_values = true)]
        amount: String,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },
}

impl Cli {
    pub fn config(&self) -> WalletConfig {
        WalletConfig::default()
            .with_seed_balance(self.seed_balance)
            .with_commission(self.commission)
            .with_recent_count(self.recent)
    }

    pub fn run(self) -> Result<()> {
        init_tracing(self.verbose);
        let config = self.config();

        match self.command {
            None | Some(Commands::Shell) => {
                let session = Session::new(config)?;
                let stdin = std::io::stdin();
                let stdout = std::io::stdout();
                Shell::new(session).run(stdin.lock(), stdout.lock())?;
            }

            Some(Commands::Quote { amount, format }) => {
                run_quote_command(&config, &amount, &format)?;
            }
        }

        Ok(())
    }
}

/// Logs go to stderr so they never interleave with shell output.
/// `RUST_LOG` overrides the level picked from `--verbose`.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // A subscriber may already be installed (e.g. by a test harness)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn run_quote_command(config: &WalletConfig, amount: &str, format: &str) -> Result<()> {
    config.validate()?;
    let ledger = Ledger::opened_with(config.seed_balance, config.opening_date, config.commission)?;
    let amount = parse_pesos(amount).context("Invalid amount format. Use whole pesos, e.g. '100000'")?;
    let quote = ledger.quote_withdrawal(amount)?;

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&quote)?);
        }
        _ => {
            println!("Amount:      {:>15}", format_pesos(quote.amount));
            println!(
                "Commission:  {:>15} ({})",
                format_pesos(quote.fee),
                ledger.commission()
            );
            println!("{}", "-".repeat(28));
            println!("Total debit: {:>15}", format_pesos(quote.total_debit));
            if !quote.sufficient {
                println!(
                    "Exceeds the opening balance of {}",
                    format_pesos(quote.balance)
                );
            }
        }
    }

    Ok(())
}
