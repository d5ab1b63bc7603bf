//! Domain models for the web service.

pub mod admin_user;
pub mod blocked_date;
pub mod photo;
pub mod session;

pub use admin_user::AdminUser;
pub use blocked_date::BlockedDate;
pub use photo::{NewPhoto, Photo, PhotoError, PhotoMeta};
pub use session::{CurrentAdmin, keys as session_keys};
