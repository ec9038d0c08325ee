mod common;

use anyhow::Result;
use common::{PASSWORD, PHONE, logged_in_session, parse_date};
use plata::application::{AppError, Screen, Session, WalletConfig};
use plata::domain::{CommissionRate, LedgerError, TransactionKind};

#[test]
fn test_dashboard_shows_three_latest_movements() -> Result<()> {
    let mut session = logged_in_session()?;
    session.deposit("1000")?;
    session.withdraw("2000")?;
    session.deposit("3000")?;

    let view = session.dashboard()?;

    assert_eq!(view.balance, 500000 + 1000 - 2200 + 3000);
    let ids: Vec<_> = view.recent.iter().map(|tx| tx.id()).collect();
    assert_eq!(ids, vec![4, 3, 2]);
    assert_eq!(session.movements()?.len(), 4);

    Ok(())
}

#[test]
fn test_login_lands_on_dashboard_with_seed() -> Result<()> {
    let mut session = Session::new(WalletConfig::default())?;

    let view = session.login(PHONE, PASSWORD)?;

    assert_eq!(session.screen(), Screen::Dashboard);
    assert_eq!(view.balance, 500000);
    assert_eq!(view.recent.len(), 1);
    assert_eq!(view.recent[0].kind(), TransactionKind::Deposit);
    assert_eq!(
        view.recent[0].timestamp().date_naive().to_string(),
        "2024-01-01"
    );

    Ok(())
}

#[test]
fn test_quote_then_confirm_flow() -> Result<()> {
    let mut session = logged_in_session()?;
    session.show(Screen::Withdraw)?;

    let quote = session.quote_withdrawal("250000")?;
    assert_eq!(quote.fee, 25000);
    assert_eq!(quote.total_debit, 275000);
    assert!(quote.sufficient);
    assert_eq!(session.balance()?, 500000);

    let receipt = session.withdraw("250000")?;
    assert_eq!(receipt.total_debit, quote.total_debit);
    assert_eq!(receipt.balance_after, 225000);
    assert_eq!(session.screen(), Screen::Dashboard);

    Ok(())
}

#[test]
fn test_errors_are_user_facing() -> Result<()> {
    let mut session = logged_in_session()?;

    let err = session.withdraw("600000").unwrap_err();
    assert!(err.is_validation());
    match err {
        AppError::Ledger(ref ledger_err @ LedgerError::InsufficientFunds { .. }) => {
            assert_eq!(ledger_err.shortfall(), Some(160000));
        }
        other => panic!("unexpected error: {other}"),
    }

    let err = session.deposit("0").unwrap_err();
    assert!(err.is_validation());
    assert_eq!(session.movements()?.len(), 1);

    Ok(())
}

#[test]
fn test_custom_configuration() -> Result<()> {
    let config = WalletConfig::default()
        .with_seed_balance(0)
        .with_commission("2.5%".parse::<CommissionRate>()?)
        .with_recent_count(1)
        .with_opening_date(parse_date("2025-06-01"));
    let mut session = Session::new(config)?;
    session.login(PHONE, PASSWORD)?;

    assert_eq!(session.balance()?, 0);
    assert!(session.movements()?.is_empty());

    session.deposit("1000")?;
    session.deposit("2000")?;
    let receipt = session.withdraw("1000")?;

    assert_eq!(receipt.fee, 25);
    assert_eq!(session.dashboard()?.recent.len(), 1);

    Ok(())
}

#[test]
fn test_invalid_configuration_is_rejected() {
    let config = WalletConfig::default().with_seed_balance(-100);
    assert!(matches!(
        Session::new(config),
        Err(AppError::InvalidConfig(_))
    ));
}
