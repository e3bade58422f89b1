// Common types and utilities shared across the application

pub mod entity_ids;
pub mod error_code;
pub mod id;
pub mod pagination;
pub mod phone;

pub use entity_ids::*;
pub use error_code::{ErrorClass, ErrorCode};
pub use id::Id;
pub use pagination::{Page, PageParams, PageWindow};
pub use phone::{mask_phone, normalize_phone};
