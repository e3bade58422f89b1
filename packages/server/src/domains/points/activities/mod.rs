pub mod balance;
pub mod history;
pub mod summary;

pub use balance::get_balance;
pub use history::{get_history, HistoryQuery};
pub use summary::summarize;
