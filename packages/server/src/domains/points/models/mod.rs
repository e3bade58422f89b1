pub mod points_transaction;

pub use points_transaction::{
    NewPointsTransaction, PointsReference, PointsSource, PointsTransaction, ReferenceType,
    TransactionKind, TypeTotals,
};
