//! Business logic services.
//!
//! - `auth` - Admin password login with lockout
//! - `email` - Order notifications via the Resend API
//! - `orders` - Order validation, admission and submission

pub mod auth;
pub mod email;
pub mod orders;

pub use auth::{AuthError, AuthService};
pub use email::{EmailError, EmailService, MailTransport};
pub use orders::{OrderError, OrderService, ValidationErrors};
