//! Broadcast stream of changed key names.
//!
//! Wraps the backing engine's native listener mechanism behind a single
//! multicast channel. The native registration is created lazily on first
//! subscription and torn down when the last subscriber drops, so no
//! listener registrations leak.

mod key_change_bus;

pub use key_change_bus::*;
