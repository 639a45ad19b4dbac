//! Version store integration tests
//!
//! Exercises the staged-write / commit / rollback lifecycle on the local
//! filesystem, version selection, retention and failure paths.
//!
//! ```bash
//! cargo test --test store
//! cargo test --test store lifecycle::
//! ```

#[path = "../common/mod.rs"]
mod common;

mod faults;
mod lifecycle;
mod selection;
