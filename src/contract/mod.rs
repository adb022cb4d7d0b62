//! Contract declaration and method classification.
//!
//! A contract is pure data: an ordered set of [`MethodSpec`] declarations
//! a client wants backed by the key-value store. The builder replaces the
//! annotation surface of reflective implementations; the classification
//! algorithm itself is unchanged and runs over declared signatures only,
//! never over call-time argument values.

mod descriptor;
mod spec;

pub use descriptor::*;
pub use spec::*;
