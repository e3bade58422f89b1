// Loyalty rewards API core
//
// Phone OTP authentication, bearer token lifecycle, QR code redemption and
// the points ledger. Business logic lives in domains/*, infrastructure
// traits and the dependency container in kernel/, HTTP in server/.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
