// HTTP routes
pub mod auth;
pub mod health;
pub mod points;
pub mod qr_codes;

pub use health::*;
