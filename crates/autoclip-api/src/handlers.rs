//! Request handlers.

pub mod clips;
pub mod health;

pub use clips::*;
pub use health::*;
