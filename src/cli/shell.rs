use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{BufRead, Write};
use std::path::PathBuf;

use crate::application::{AppError, DashboardView, Screen, Session};
use crate::domain::{
    LedgerError, Transaction, TransactionKind, WithdrawalQuote, format_pesos,
};
use crate::io::{ExportFormat, Exporter};

/// One line typed into the shell
#[derive(Parser, Debug)]
#[command(name = "plata", no_binary_name = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Subcommand, Debug, PartialEq)]
enum ShellCommand {
    /// Log in with a 10-digit phone number and a password (min. 8 characters).
    /// The password is the rest of the line; runs of spaces inside it count as one.
    Login {
        phone: String,

        #[arg(required = true, num_args = 1.., trailing_var_arg = true, allow_hyphen_values = true)]
        password: Vec<String>,
    },

    /// Log out and return to the login screen
    Logout,

    /// Show balance and recent movements
    Dashboard,

    /// Show the current balance
    Balance,

    /// Show the latest movements, newest first
    Recent {
        /// How many movements to show (defaults to the dashboard count)
        n: Option<usize>,
    },

    /// Show every movement, newest first
    Movements,

    /// Preview commission and total debit for a withdrawal
    Quote {
        #[arg(allow_hyphen_values = true)]
        amount: String,
    },

    /// Withdraw money (asks for confirmation)
    Withdraw {
        #[arg(allow_hyphen_values = true)]
        amount: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Deposit money
    Deposit {
        #[arg(allow_hyphen_values = true)]
        amount: String,
    },

    /// Export the movements as csv or json
    Export {
        format: String,

        /// Output file (printed here if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Leave the shell
    #[command(alias = "exit")]
    Quit,
}

/// Line-oriented front end over one [`Session`].
/// User errors are printed and the shell keeps going.
pub struct Shell {
    session: Session,
}

impl Shell {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn run<R: BufRead, W: Write>(&mut self, mut input: R, mut out: W) -> Result<()> {
        writeln!(
            out,
            "Welcome to {}. Type 'help' for commands.",
            self.session.config().app_name
        )?;

        loop {
            write!(out, "{}> ", self.session.screen())?;
            out.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                writeln!(out)?;
                break;
            }

            let words: Vec<&str> = line.split_whitespace().collect();
            if words.is_empty() {
                continue;
            }

            let command = match ShellLine::try_parse_from(words) {
                Ok(parsed) => parsed.command,
                Err(err) => {
                    writeln!(out, "{}", err.to_string().trim_end())?;
                    continue;
                }
            };

            if command == ShellCommand::Quit {
                writeln!(out, "Bye.")?;
                break;
            }

            if let Err(err) = self.execute(command, &mut input, &mut out) {
                match err.downcast_ref::<AppError>() {
                    Some(app_err) if app_err.is_validation() => {
                        writeln!(out, "Error: {}", describe(app_err))?
                    }
                    Some(app_err) => {
                        tracing::warn!(error = %app_err, screen = %self.session.screen(), "command refused");
                        writeln!(out, "Error: {}", describe(app_err))?
                    }
                    None => {
                        tracing::warn!(error = %format!("{:#}", err), "command failed");
                        writeln!(out, "Error: {:#}", err)?
                    }
                }
            }
        }

        Ok(())
    }

    fn execute<R: BufRead, W: Write>(
        &mut self,
        command: ShellCommand,
        input: &mut R,
        out: &mut W,
    ) -> Result<()> {
        match command {
            ShellCommand::Login { phone, password } => {
                let view = self.session.login(&phone, &password.join(" "))?;
                writeln!(out, "Welcome back.")?;
                render_dashboard(out, &view)?;
            }

            ShellCommand::Logout => {
                self.session.logout();
                writeln!(out, "Logged out.")?;
            }

            ShellCommand::Dashboard => {
                let view = self.session.dashboard()?;
                self.session.show(Screen::Dashboard)?;
                render_dashboard(out, &view)?;
            }

            ShellCommand::Balance => {
                let balance = self.session.balance()?;
                writeln!(out, "Balance: {}", format_pesos(balance))?;
            }

            ShellCommand::Recent { n } => {
                let n = n.unwrap_or(self.session.config().recent_count);
                let recent = self.session.recent(n)?;
                render_recent(out, &recent)?;
            }

            ShellCommand::Movements => {
                let movements = self.session.movements()?;
                self.session.show(Screen::Movements)?;
                render_movements(out, &movements)?;
            }

            ShellCommand::Quote { amount } => {
                let quote = self.session.quote_withdrawal(&amount)?;
                render_quote(out, &quote)?;
            }

            ShellCommand::Withdraw { amount, yes } => {
                self.run_withdraw(&amount, yes, input, out)?;
            }

            ShellCommand::Deposit { amount } => {
                let tx = self.session.deposit(&amount)?;
                writeln!(
                    out,
                    "Deposited {} (ID: {}). New balance: {}",
                    format_pesos(tx.amount()),
                    tx.id(),
                    format_pesos(self.session.balance()?)
                )?;
            }

            ShellCommand::Export { format, output } => {
                let format = ExportFormat::from_str(&format)
                    .ok_or_else(|| anyhow!("Unknown export format '{}'. Use csv or json", format))?;
                let ledger = self.session.authorized_ledger()?;
                let exporter = Exporter::new(ledger);

                match output {
                    Some(path) => {
                        let file = File::create(&path)
                            .with_context(|| format!("Failed to create {}", path.display()))?;
                        let count = exporter.export(format, file)?;
                        writeln!(
                            out,
                            "Exported {} transactions as {} to {}",
                            count,
                            format.as_str(),
                            path.display()
                        )?;
                    }
                    None => {
                        exporter.export(format, &mut *out)?;
                        writeln!(out)?;
                    }
                }
            }

            ShellCommand::Quit => {}
        }

        Ok(())
    }

    fn run_withdraw<R: BufRead, W: Write>(
        &mut self,
        amount: &str,
        skip_confirmation: bool,
        input: &mut R,
        out: &mut W,
    ) -> Result<()> {
        self.session.show(Screen::Withdraw)?;

        // Insufficient funds are reported before asking for confirmation
        let quote = self.session.quote_withdrawal(amount)?;
        if !quote.sufficient {
            return Err(AppError::from(LedgerError::InsufficientFunds {
                amount: quote.amount,
                fee: quote.fee,
                total_debit: quote.total_debit,
                balance: quote.balance,
            })
            .into());
        }

        if !skip_confirmation {
            write!(
                out,
                "Confirm withdrawal of {}? A total of {} will be debited (commission included). [y/N] ",
                format_pesos(quote.amount),
                format_pesos(quote.total_debit)
            )?;
            out.flush()?;

            let mut answer = String::new();
            input.read_line(&mut answer)?;
            if !matches!(answer.trim().to_lowercase().as_str(), "y" | "yes") {
                writeln!(out, "Withdrawal cancelled.")?;
                return Ok(());
            }
        }

        let receipt = self.session.withdraw(amount)?;

        writeln!(out, "Withdrawal successful!")?;
        writeln!(out, "  Amount withdrawn: {}", format_pesos(receipt.transaction.amount()))?;
        writeln!(out, "  Commission:       {}", format_pesos(receipt.fee))?;
        writeln!(out, "  Total debited:    {}", format_pesos(receipt.total_debit))?;
        writeln!(out, "  New balance:      {}", format_pesos(receipt.balance_after))?;
        Ok(())
    }
}

/// User-facing wording for an application error.
pub fn describe(err: &AppError) -> String {
    match err {
        AppError::Ledger(LedgerError::InsufficientFunds {
            total_debit,
            balance,
            ..
        }) => format!(
            "Insufficient funds. The total to debit (amount + commission) of {} exceeds your balance of {}",
            format_pesos(*total_debit),
            format_pesos(*balance)
        ),
        other => other.to_string(),
    }
}

fn render_dashboard<W: Write>(out: &mut W, view: &DashboardView) -> Result<()> {
    writeln!(out, "Balance: {}", format_pesos(view.balance))?;
    writeln!(out)?;
    writeln!(out, "Recent movements:")?;
    render_recent(out, &view.recent)
}

fn render_recent<W: Write>(out: &mut W, transactions: &[Transaction]) -> Result<()> {
    if transactions.is_empty() {
        writeln!(out, "  No recent movements.")?;
        return Ok(());
    }

    for tx in transactions {
        writeln!(
            out,
            "  {:<12} {:<10} {} {:>15}",
            kind_label(tx.kind()),
            tx.timestamp().format("%Y-%m-%d"),
            sign(tx),
            format_pesos(tx.amount())
        )?;
    }
    Ok(())
}

fn render_movements<W: Write>(out: &mut W, transactions: &[Transaction]) -> Result<()> {
    if transactions.is_empty() {
        writeln!(out, "No movements.")?;
        return Ok(());
    }

    writeln!(
        out,
        "{:<6} {:<10} {:<12} {:>15} {:>15}",
        "ID", "Date", "Type", "Commission", "Total"
    )?;
    writeln!(out, "{}", "-".repeat(62))?;

    for tx in transactions {
        let total = match tx.kind() {
            TransactionKind::Deposit => tx.amount(),
            TransactionKind::Withdrawal => tx.total_debit(),
        };
        let commission = if tx.fee() > 0 {
            format_pesos(tx.fee())
        } else {
            String::new()
        };
        writeln!(
            out,
            "{:<6} {:<10} {:<12} {:>15} {} {:>13}",
            tx.id(),
            tx.timestamp().format("%Y-%m-%d"),
            kind_label(tx.kind()),
            commission,
            sign(tx),
            format_pesos(total)
        )?;
    }
    Ok(())
}

fn render_quote<W: Write>(out: &mut W, quote: &WithdrawalQuote) -> Result<()> {
    writeln!(out, "Amount:      {:>15}", format_pesos(quote.amount))?;
    writeln!(out, "Commission:  {:>15}", format_pesos(quote.fee))?;
    writeln!(out, "Total debit: {:>15}", format_pesos(quote.total_debit))?;
    if !quote.sufficient {
        writeln!(out, "Exceeds your balance of {}", format_pesos(quote.balance))?;
    }
    Ok(())
}

fn kind_label(kind: TransactionKind) -> &'static str {
    match kind {
        TransactionKind::Deposit => "Deposit",
        TransactionKind::Withdrawal => "Withdrawal",
    }
}

fn sign(tx: &Transaction) -> char {
    if tx.is_deposit() { '+' } else { '-' }
}
