use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Pesos;

/// Sequence number assigned by the ledger, starting at 1.
pub type TransactionId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money entering the wallet; never charged a fee
    Deposit,
    /// Money leaving the wallet; principal plus commission is debited
    Withdrawal,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Deposit => "deposit",
            TransactionKind::Withdrawal => "withdrawal",
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single movement recorded by the ledger.
/// Transactions are immutable: fields are read through accessors and
/// only the ledger can create them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    id: TransactionId,
    kind: TransactionKind,
    /// Principal in pesos, excluding the fee (always positive)
    amount: Pesos,
    /// Commission charged on top of the principal (zero for deposits)
    fee: Pesos,
    timestamp: DateTime<Utc>,
}

impl Transaction {
    pub(crate) fn deposit(id: TransactionId, amount: Pesos, timestamp: DateTime<Utc>) -> Self {
        Self {
            id,
            kind: TransactionKind::Deposit,
            amount,
            fee: 0,
            timestamp,
        }
    }

    pub(crate) fn withdrawal(
        id: TransactionId,
        amount: Pesos,
        fee: Pesos,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            kind: TransactionKind::Withdrawal,
            amount,
            fee,
            timestamp,
        }
    }

    /// Build a historical record for seeding a ledger.
    /// The values are checked when the ledger is constructed.
    pub fn seeded(
        id: TransactionId,
        kind: TransactionKind,
        amount: Pesos,
        fee: Pesos,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            kind,
            amount,
            fee,
            timestamp,
        }
    }

    pub fn id(&self) -> TransactionId {
        self.id
    }

    pub fn kind(&self) -> TransactionKind {
        self.kind
    }

    pub fn amount(&self) -> Pesos {
        self.amount
    }

    pub fn fee(&self) -> Pesos {
        self.fee
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn is_deposit(&self) -> bool {
        self.kind == TransactionKind::Deposit
    }

    /// Amount actually taken from the balance (principal + fee).
    /// Zero for deposits.
    pub fn total_debit(&self) -> Pesos {
        match self.kind {
            TransactionKind::Deposit => 0,
            TransactionKind::Withdrawal => self.amount + self.fee,
        }
    }

    /// Signed change this transaction made to the balance.
    pub fn balance_effect(&self) -> Pesos {
        match self.kind {
            TransactionKind::Deposit => self.amount,
            TransactionKind::Withdrawal => -(self.amount + self.fee),
        }
    }
}
