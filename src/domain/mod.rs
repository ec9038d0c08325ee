mod commission;
mod ledger;
mod money;
mod transaction;

pub use commission::*;
pub use ledger::*;
pub use money::*;
pub use transaction::*;
