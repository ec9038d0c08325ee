use crate::domain::{
    Ledger, Pesos, Transaction, WithdrawalQuote, WithdrawalReceipt, parse_pesos,
};

use super::{AppError, WalletConfig};

const PHONE_DIGITS: usize = 10;
const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    Login,
    Dashboard,
    Withdraw,
    Movements,
}

impl Screen {
    pub fn as_str(&self) -> &'static str {
        match self {
            Screen::Login => "login",
            Screen::Dashboard => "dashboard",
            Screen::Withdraw => "withdraw",
            Screen::Movements => "movements",
        }
    }
}

impl std::fmt::Display for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What the dashboard renders: the balance and the latest movements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardView {
    pub balance: Pesos,
    pub recent: Vec<Transaction>,
}

/// Session controller for a single user.
/// This is the primary interface for any front end (CLI shell, TUI, etc.).
///
/// Owns the ledger for the lifetime of the session; nothing is persisted.
pub struct Session {
    config: WalletConfig,
    ledger: Ledger,
    screen: Screen,
    user: Option<String>,
}

impl Session {
    pub fn new(config: WalletConfig) -> Result<Self, AppError> {
        config.validate()?;
        let ledger = Ledger::opened_with(
            config.seed_balance,
            config.opening_date,
            config.commission,
        )?;

        tracing::debug!(
            seed_balance = config.seed_balance,
            commission = %config.commission,
            "session created"
        );

        Ok(Self {
            config,
            ledger,
            screen: Screen::Login,
            user: None,
        })
    }

    pub fn config(&self) -> &WalletConfig {
        &self.config
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    // ========================
    // Navigation
    // ========================

    /// Simulated login: only the format of the credentials is checked.
    pub fn login(&mut self, phone: &str, password: &str) -> Result<DashboardView, AppError> {
        let phone = phone.trim();
        if phone.len() != PHONE_DIGITS || !phone.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AppError::InvalidCredentials(format!(
                "phone number must have exactly {} digits",
                PHONE_DIGITS
            )));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::InvalidCredentials(format!(
                "password must have at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }

        tracing::info!(phone_suffix = &phone[PHONE_DIGITS - 4..], "login accepted");
        self.user = Some(phone.to_string());
        self.screen = Screen::Dashboard;
        self.dashboard()
    }

    pub fn logout(&mut self) {
        if self.user.take().is_some() {
            tracing::info!("logged out");
        }
        self.screen = Screen::Login;
    }

    pub fn show(&mut self, screen: Screen) -> Result<(), AppError> {
        if screen != Screen::Login {
            self.require_login()?;
        }
        self.screen = screen;
        Ok(())
    }

    // ========================
    // Views
    // ========================

    pub fn dashboard(&self) -> Result<DashboardView, AppError> {
        self.require_login()?;
        Ok(DashboardView {
            balance: self.ledger.current_balance(),
            recent: self.recent(self.config.recent_count)?,
        })
    }

    pub fn balance(&self) -> Result<Pesos, AppError> {
        self.require_login()?;
        Ok(self.ledger.current_balance())
    }

    pub fn recent(&self, n: usize) -> Result<Vec<Transaction>, AppError> {
        self.require_login()?;
        Ok(self
            .ledger
            .recent_transactions(n)
            .into_iter()
            .cloned()
            .collect())
    }

    pub fn movements(&self) -> Result<Vec<Transaction>, AppError> {
        self.require_login()?;
        Ok(self.ledger.all_transactions().into_iter().cloned().collect())
    }

    /// The ledger, for exporting a statement on behalf of the logged-in user.
    pub fn authorized_ledger(&self) -> Result<&Ledger, AppError> {
        self.require_login()?;
        Ok(&self.ledger)
    }

    // ========================
    // Operations
    // ========================

    /// Fee preview for the amount typed into the withdrawal form.
    pub fn quote_withdrawal(&self, input: &str) -> Result<WithdrawalQuote, AppError> {
        self.require_login()?;
        let amount = parse_pesos(input)?;
        Ok(self.ledger.quote_withdrawal(amount)?)
    }

    /// Commit a confirmed withdrawal and return to the dashboard.
    pub fn withdraw(&mut self, input: &str) -> Result<WithdrawalReceipt, AppError> {
        self.require_login()?;
        let amount = parse_pesos(input)?;
        let receipt = self.ledger.withdraw(amount)?;
        self.screen = Screen::Dashboard;
        Ok(receipt)
    }

    pub fn deposit(&mut self, input: &str) -> Result<Transaction, AppError> {
        self.require_login()?;
        let amount = parse_pesos(input)?;
        Ok(self.ledger.deposit(amount)?)
    }

    fn require_login(&self) -> Result<(), AppError> {
        if self.user.is_none() {
            return Err(AppError::NotLoggedIn);
        }
        Ok(())
    }
}
