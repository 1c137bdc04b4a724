/// Shared error type and result helpers
pub mod error;
pub mod result;
