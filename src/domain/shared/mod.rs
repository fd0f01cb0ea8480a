//! Shared kernel - Common types used across the campaign and telephony contexts

pub mod error;
pub mod value_objects;

pub use error::{DomainError, Result};
pub use value_objects::*;
