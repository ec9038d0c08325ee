// Application layer: configuration, the session controller that drives a
// ledger through the wallet screens, and the user-facing error type.

pub mod config;
pub mod error;
pub mod session;

pub use config::*;
pub use error::*;
pub use session::*;
