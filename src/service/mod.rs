//! Transactional execution services.

pub mod transaction;

pub use transaction::{NamedOperation, TransactionService};
