//! Users domain - the identity ledger
//!
//! Durable user records keyed by phone number, carrying the denormalised
//! points balance that the points ledger keeps in step.

pub mod errors;
pub mod models;

pub use errors::UserError;
pub use models::{NewUser, User, UserRole};
