use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use super::{CommissionRate, Pesos, Transaction, TransactionId, TransactionKind, format_pesos};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error(
        "Insufficient funds: amount {amount} plus commission {fee} is {total_debit}, balance is {balance}"
    )]
    InsufficientFunds {
        amount: Pesos,
        fee: Pesos,
        total_debit: Pesos,
        balance: Pesos,
    },

    #[error("Invalid seed: {0}")]
    InvalidSeed(String),
}

impl LedgerError {
    /// How much the balance falls short of the requested debit, if that is
    /// why the operation failed.
    pub fn shortfall(&self) -> Option<Pesos> {
        match self {
            LedgerError::InsufficientFunds {
                total_debit,
                balance,
                ..
            } => Some(total_debit - balance),
            _ => None,
        }
    }
}

/// Outcome of a committed withdrawal, surfaced for the confirmation screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WithdrawalReceipt {
    pub transaction: Transaction,
    pub fee: Pesos,
    pub total_debit: Pesos,
    pub balance_after: Pesos,
}

/// Fee preview for a withdrawal that has not been committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WithdrawalQuote {
    pub amount: Pesos,
    pub fee: Pesos,
    pub total_debit: Pesos,
    pub balance: Pesos,
    pub sufficient: bool,
}

/// Result of recomputing the balance from history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntegrityReport {
    pub transaction_count: usize,
    pub opening_balance: Pesos,
    /// `None` if replaying the history overflows
    pub expected_balance: Option<Pesos>,
    pub actual_balance: Pesos,
    /// Lowest balance reached while replaying, opening balance included
    pub lowest_balance: Pesos,
    pub sequence_ok: bool,
}

impl IntegrityReport {
    pub fn is_healthy(&self) -> bool {
        self.sequence_ok
            && self.expected_balance == Some(self.actual_balance)
            && self.opening_balance >= 0
            && self.lowest_balance >= 0
    }
}

/// In-memory wallet: a balance plus an append-only transaction history.
///
/// The only mutators are [`Ledger::deposit`] and [`Ledger::withdraw`] (and their
/// `_at` variants). Both validate before touching any state, so a failed call
/// leaves the ledger exactly as it was.
#[derive(Debug, Clone)]
pub struct Ledger {
    /// Balance before any transaction in `history`
    opening_balance: Pesos,
    balance: Pesos,
    history: Vec<Transaction>,
    next_id: TransactionId,
    commission: CommissionRate,
}

impl Ledger {
    /// Create an empty ledger with a zero balance.
    pub fn new(commission: CommissionRate) -> Self {
        Self {
            opening_balance: 0,
            balance: 0,
            history: Vec::new(),
            next_id: 1,
            commission,
        }
    }

    /// Create a ledger whose seed balance is recorded as an opening deposit
    /// with id 1. A zero seed yields an empty ledger.
    pub fn opened_with(
        seed_balance: Pesos,
        opened_at: DateTime<Utc>,
        commission: CommissionRate,
    ) -> Result<Self, LedgerError> {
        if seed_balance < 0 {
            return Err(LedgerError::InvalidSeed(format!(
                "seed balance cannot be negative ({})",
                seed_balance
            )));
        }

        let mut ledger = Self::new(commission);
        if seed_balance > 0 {
            ledger.deposit_at(seed_balance, opened_at)?;
        }
        Ok(ledger)
    }

    /// Create a ledger from a balance and a pre-existing history.
    ///
    /// The history is taken as already reflected in `balance`; the balance
    /// before it is derived so that integrity checks stay meaningful.
    /// New ids continue after the last seeded id.
    pub fn from_seed(
        balance: Pesos,
        history: Vec<Transaction>,
        commission: CommissionRate,
    ) -> Result<Self, LedgerError> {
        if balance < 0 {
            return Err(LedgerError::InvalidSeed(format!(
                "seed balance cannot be negative ({})",
                balance
            )));
        }

        let mut last_id: TransactionId = 0;
        let mut net: Pesos = 0;
        for tx in &history {
            if tx.id() <= last_id {
                return Err(LedgerError::InvalidSeed(format!(
                    "transaction ids must be positive and strictly increasing (found {} after {})",
                    tx.id(),
                    last_id
                )));
            }
            if tx.amount() <= 0 {
                return Err(LedgerError::InvalidSeed(format!(
                    "transaction {} has a non-positive amount",
                    tx.id()
                )));
            }
            if tx.fee() < 0 || (tx.kind() == TransactionKind::Deposit && tx.fee() != 0) {
                return Err(LedgerError::InvalidSeed(format!(
                    "transaction {} has an invalid fee",
                    tx.id()
                )));
            }
            let debit = tx.amount().checked_add(tx.fee()).ok_or_else(seed_overflow)?;
            let effect = match tx.kind() {
                TransactionKind::Deposit => tx.amount(),
                TransactionKind::Withdrawal => -debit,
            };
            net = net.checked_add(effect).ok_or_else(seed_overflow)?;
            last_id = tx.id();
        }

        let opening_balance = balance.checked_sub(net).ok_or_else(seed_overflow)?;
        if opening_balance < 0 {
            return Err(LedgerError::InvalidSeed(format!(
                "history implies a negative opening balance ({})",
                opening_balance
            )));
        }

        let mut running = opening_balance;
        for tx in &history {
            running = running
                .checked_add(tx.balance_effect())
                .ok_or_else(seed_overflow)?;
            if running < 0 {
                return Err(LedgerError::InvalidSeed(format!(
                    "transaction {} drives the balance negative ({})",
                    tx.id(),
                    running
                )));
            }
        }

        Ok(Self {
            opening_balance,
            balance,
            history,
            next_id: last_id + 1,
            commission,
        })
    }

    pub fn commission(&self) -> CommissionRate {
        self.commission
    }

    pub fn current_balance(&self) -> Pesos {
        self.balance
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Full history in chronological order (oldest first).
    pub fn history(&self) -> &[Transaction] {
        &self.history
    }

    /// Full history, newest first.
    pub fn all_transactions(&self) -> Vec<&Transaction> {
        self.history.iter().rev().collect()
    }

    /// The last `n` transactions, newest first.
    pub fn recent_transactions(&self, n: usize) -> Vec<&Transaction> {
        self.history.iter().rev().take(n).collect()
    }

    pub fn deposit(&mut self, amount: Pesos) -> Result<Transaction, LedgerError> {
        self.deposit_at(amount, Utc::now())
    }

    pub fn deposit_at(
        &mut self,
        amount: Pesos,
        timestamp: DateTime<Utc>,
    ) -> Result<Transaction, LedgerError> {
        validate_amount(amount)?;
        let new_balance = self.balance.checked_add(amount).ok_or_else(|| {
            tracing::debug!(amount, balance = self.balance, "deposit rejected: overflow");
            LedgerError::InvalidAmount(format!(
                "depositing {} would overflow the balance",
                format_pesos(amount)
            ))
        })?;

        let tx = Transaction::deposit(self.take_id(), amount, timestamp);
        self.balance = new_balance;
        self.history.push(tx.clone());

        tracing::info!(id = tx.id(), amount, balance = self.balance, "deposit recorded");
        Ok(tx)
    }

    /// Compute the fee and total debit for `amount` without committing.
    pub fn quote_withdrawal(&self, amount: Pesos) -> Result<WithdrawalQuote, LedgerError> {
        validate_amount(amount)?;
        let fee = self.commission.fee_for(amount);
        let total_debit = amount.checked_add(fee).ok_or_else(|| {
            LedgerError::InvalidAmount(format!(
                "{} plus commission is out of range",
                format_pesos(amount)
            ))
        })?;

        Ok(WithdrawalQuote {
            amount,
            fee,
            total_debit,
            balance: self.balance,
            sufficient: total_debit <= self.balance,
        })
    }

    pub fn withdraw(&mut self, amount: Pesos) -> Result<WithdrawalReceipt, LedgerError> {
        self.withdraw_at(amount, Utc::now())
    }

    pub fn withdraw_at(
        &mut self,
        amount: Pesos,
        timestamp: DateTime<Utc>,
    ) -> Result<WithdrawalReceipt, LedgerError> {
        let quote = self.quote_withdrawal(amount)?;
        if !quote.sufficient {
            tracing::debug!(
                amount,
                fee = quote.fee,
                balance = self.balance,
                "withdrawal rejected: insufficient funds"
            );
            return Err(LedgerError::InsufficientFunds {
                amount: quote.amount,
                fee: quote.fee,
                total_debit: quote.total_debit,
                balance: quote.balance,
            });
        }

        let tx = Transaction::withdrawal(self.take_id(), amount, quote.fee, timestamp);
        self.balance -= quote.total_debit;
        self.history.push(tx.clone());

        tracing::info!(
            id = tx.id(),
            amount,
            fee = quote.fee,
            balance = self.balance,
            "withdrawal recorded"
        );
        Ok(WithdrawalReceipt {
            transaction: tx,
            fee: quote.fee,
            total_debit: quote.total_debit,
            balance_after: self.balance,
        })
    }

    /// Recompute the balance from the opening balance and the history.
    pub fn check_integrity(&self) -> IntegrityReport {
        let mut lowest_balance = self.opening_balance;
        let expected_balance = self
            .history
            .iter()
            .try_fold(self.opening_balance, |balance, tx| {
                let next = balance.checked_add(tx.balance_effect())?;
                lowest_balance = lowest_balance.min(next);
                Some(next)
            });
        let sequence_ok = self
            .history
            .windows(2)
            .all(|pair| pair[0].id() < pair[1].id())
            && self.history.first().is_none_or(|tx| tx.id() > 0)
            && self.history.last().is_none_or(|tx| tx.id() < self.next_id);

        IntegrityReport {
            transaction_count: self.history.len(),
            opening_balance: self.opening_balance,
            expected_balance,
            actual_balance: self.balance,
            lowest_balance,
            sequence_ok,
        }
    }

    fn take_id(&mut self) -> TransactionId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

fn seed_overflow() -> LedgerError {
    LedgerError::InvalidSeed("seed history overflows".to_string())
}

fn validate_amount(amount: Pesos) -> Result<(), LedgerError> {
    if amount <= 0 {
        tracing::debug!(amount, "rejected non-positive amount");
        return Err(LedgerError::InvalidAmount(
            "Amount must be positive".to_string(),
        ));
    }
    Ok(())
}
