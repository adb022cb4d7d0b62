//! Type resolution for declared method signatures.
//!
//! A declared return or parameter type is described by [`TypeSpec`]. The
//! resolver strips container wrappers (a stream of `T` resolves to `T`) and
//! computes the payload type converters must receive, so the accessor never
//! hands a converter a generic wrapper type.

mod type_spec;

pub use type_spec::*;

#[cfg(test)]
mod type_spec_test;
