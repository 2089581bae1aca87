mod error;
pub mod executor;
pub mod materialize;
pub mod operations;
pub mod providers;
pub mod traits;

#[cfg(test)]
pub mod mocks;

pub use error::{CleanupFailure, OperationError, Result};
