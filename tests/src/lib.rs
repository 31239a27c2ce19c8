//! # Testament Test Suite
//!
//! Unified test crate containing cross-crate scenarios:
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── end_to_end.rs   # Lifecycle → events → projection → queries
//!     └── replay.rs       # Idempotent replay, ordering, checkpoint resume
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p testament-tests
//!
//! # By category
//! cargo test -p testament-tests integration::
//! ```

#![allow(unused_imports)]

pub mod integration;
