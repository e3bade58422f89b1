//! Typed ids for every persisted entity.

pub use super::id::Id;

/// Marker for users (identity ledger rows).
pub struct User;

/// Marker for redeemable QR codes.
pub struct QrCode;

/// Marker for per-user scan records.
pub struct QrScan;

/// Marker for points ledger entries.
pub struct PointsTransaction;

pub type UserId = Id<User>;
pub type QrCodeId = Id<QrCode>;
pub type QrScanId = Id<QrScan>;
pub type PointsTransactionId = Id<PointsTransaction>;
