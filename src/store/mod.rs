//! Backing store collaborators.
//!
//! The engine trait is the external contract the mapping layer sits on:
//! atomic get/put/remove/clear over one namespace plus a per-key mutation
//! notification callback. Two adaptors ship with the crate: a persistent
//! sled-backed engine and an in-memory engine for embedding and tests.

mod engine;
mod mem_engine;
mod sled_engine;

pub use engine::*;
pub use mem_engine::*;
pub use sled_engine::*;

#[cfg(test)]
mod mem_engine_test;
