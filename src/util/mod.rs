//! Shared error handling.
//!
//! - [`Error`] / [`Result`] - crate-wide error type

mod error;

pub use error::*;
