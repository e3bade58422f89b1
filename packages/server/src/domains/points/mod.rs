//! Points domain - append-only ledger and its read-side aggregations
//!
//! Every balance change goes through [`ledger::record_transaction`], which
//! adjusts `users.total_points` and appends the matching ledger row on the
//! same connection, so the two can only commit together.

pub mod activities;
pub mod errors;
pub mod ledger;
pub mod models;
pub mod types;

pub use errors::LedgerError;
pub use ledger::{audit_balance, record_transaction, spend_points};
pub use models::{
    NewPointsTransaction, PointsReference, PointsSource, PointsTransaction, ReferenceType,
    TransactionKind,
};
pub use types::{BalanceAudit, PointsSummary};
