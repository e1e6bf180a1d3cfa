pub mod core;
pub mod error;
pub mod handlers;
pub mod markdown;
pub mod types;

pub use core::PostsManager;
pub use error::PostsError;
pub use types::*;

#[cfg(test)]
mod tests;
