pub mod user;

pub use user::{generate_referral_code, NewUser, User, UserRole};
