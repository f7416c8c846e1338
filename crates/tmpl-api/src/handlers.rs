//! Request handlers.

pub mod admin;
pub mod health;
pub mod renders;
pub mod templates;
pub mod webhooks;

pub use admin::*;
pub use health::*;
pub use renders::*;
pub use templates::*;
pub use webhooks::*;
