//! Caller identity and namespace authorization

pub mod authorizer;
pub mod identity;

pub use authorizer::check_namespace;
pub use identity::{Identity, Role};
