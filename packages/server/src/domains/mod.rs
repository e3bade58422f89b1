// Business domains
pub mod auth;
pub mod points;
pub mod qr_codes;
pub mod users;
