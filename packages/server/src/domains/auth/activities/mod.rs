//! Auth activities - business logic called from the HTTP layer
//!
//! Each activity takes `&ServerDeps` and returns a typed `AuthError`.

pub mod current_user;
pub mod logout;
pub mod refresh;
pub mod register;
pub mod send_otp;
pub mod verify_otp;

pub use current_user::current_user;
pub use logout::logout;
pub use refresh::refresh;
pub use register::{register, RegisterProfile};
pub use send_otp::send_otp;
pub use verify_otp::verify_otp;
