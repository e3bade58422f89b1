pub mod qr_code;
pub mod qr_scan;

pub use qr_code::{NewQrCode, QrCode, QrCodeType};
pub use qr_scan::{QrScan, ScanHistoryEntry};
