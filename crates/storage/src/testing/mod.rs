//! Testing utilities for the storage layer
//!
//! - **FaultyBackend**: wraps a backend and injects I/O errors into
//!   rename, remove, write or list calls
//!
//! # Example
//!
//! ```ignore
//! use pail_storage::testing::{FaultPoint, FaultyBackend};
//!
//! let backend = Arc::new(FaultyBackend::new(Arc::new(InMemoryBackend::new())));
//! backend.set_fault(FaultPoint::Rename, true);
//! // succeed_version now fails with Error::Commit
//! ```

mod faulty;

pub use faulty::{faulty_memory_backend, FaultPoint, FaultyBackend};
