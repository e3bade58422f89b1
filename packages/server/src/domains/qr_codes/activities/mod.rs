pub mod history;
pub mod redeem;

pub use history::scan_history;
pub use redeem::redeem;
