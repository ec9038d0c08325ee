// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use plata::application::{Session, WalletConfig};
use plata::cli::Shell;
use plata::domain::{CommissionRate, Ledger};

pub const PHONE: &str = "3001234567";
pub const PASSWORD: &str = "secret123";

/// Helper to parse a date string into DateTime<Utc>
pub fn parse_date(date_str: &str) -> DateTime<Utc> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        .and_utc()
}

/// Ledger seeded like the wallet app: 500000 opening deposit, 10% commission
pub fn standard_ledger() -> Ledger {
    Ledger::opened_with(500000, parse_date("2024-01-01"), CommissionRate::default()).unwrap()
}

/// Session with default configuration, already logged in
pub fn logged_in_session() -> Result<Session> {
    let mut session = Session::new(WalletConfig::default())?;
    session.login(PHONE, PASSWORD)?;
    Ok(session)
}

/// Feed `script` to a fresh shell and return everything it printed
pub fn run_shell(script: &str) -> Result<(String, Shell)> {
    let session = Session::new(WalletConfig::default())?;
    let mut shell = Shell::new(session);
    let mut out = Vec::new();
    shell.run(script.as_bytes(), &mut out)?;
    Ok((String::from_utf8(out)?, shell))
}
