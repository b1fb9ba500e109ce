//! Nullable infrastructure for deterministic testing.
//!
//! The engine takes time as an explicit parameter and reaches its records
//! only through the `ballot-store` traits. This crate provides test-friendly
//! implementations of both that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the filesystem or network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod clock;
pub mod store;

pub use clock::NullClock;
pub use store::{LedgerSnapshot, NullLedger};
