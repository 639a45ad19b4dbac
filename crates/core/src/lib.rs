//! Core types for pail
//!
//! This crate defines the foundational types used throughout the system:
//! - Value: structured record payload
//! - VersionId: identifier of a version in a store
//! - WriterId: identifier of one writer task
//! - Category / AttributePath: relative sub-paths inside a version
//! - Error: error type hierarchy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod types;
pub mod value;

pub use error::{Error, Result};
pub use types::{AttributePath, Category, VersionId, WriterId};
pub use value::Value;
