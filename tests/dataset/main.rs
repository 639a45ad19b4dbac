//! Partitioned dataset integration tests
//!
//! Record round-trips, concurrent writers, attribute-filtered reads and
//! the tap lifecycle, on the local filesystem.
//!
//! ```bash
//! cargo test --test dataset
//! cargo test --test dataset taps::
//! ```

#[path = "../common/mod.rs"]
mod common;

mod concurrency;
mod filtering;
mod roundtrip;
