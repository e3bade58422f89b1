//! QR codes domain - the redemption engine
//!
//! A scan walks `Received -> CodeResolved -> WindowChecked -> DuplicateChecked
//! -> CapacityChecked -> Awarded | Rejected`. The award re-checks duplicate
//! and capacity at write time (unique scan row, conditional counter update)
//! so concurrent scans cannot double-award or exceed `max_scans`.

pub mod activities;
pub mod errors;
pub mod models;
pub mod types;

pub use activities::{redeem, scan_history};
pub use errors::RedemptionError;
pub use models::{NewQrCode, QrCode, QrCodeType, QrScan, ScanHistoryEntry};
pub use types::{RedemptionStage, ScanReceipt};
