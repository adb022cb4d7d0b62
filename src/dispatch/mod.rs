//! Contract binding and call dispatch.
//!
//! [`ContractBinder::bind`] interprets a declared contract once: the whole
//! contract is validated eagerly and every method's descriptor is computed
//! up front, so per-call dispatch is a concurrent table lookup keyed by
//! method identity followed by a forward to the accessor.

mod bound;

pub use bound::*;

#[cfg(test)]
mod bound_test;
