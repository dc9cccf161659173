//! Companion tooling for compiled constraint systems.
//!
//! Nothing here is part of the build path: these helpers exist so tests
//! and diagnostics can assign witnesses to a finished system and observe
//! which constraint or assertion fails.

pub mod witness;

pub use witness::Witness;
