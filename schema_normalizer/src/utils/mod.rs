//! Utilities
//!
//! Naming helpers and logging setup used across the library.

pub mod logging;
pub mod naming;

pub use naming::{pluralize, singularize, type_name};
