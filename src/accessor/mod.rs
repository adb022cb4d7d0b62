//! The preference accessor façade.
//!
//! [`Preference`] executes classified operations against the backing
//! engine: typed scalar fast paths, converter-backed object marshalling,
//! and watch-style reads that return replay-first live streams fed by the
//! key change bus.

mod preference;
mod value;
mod watch;

pub use preference::*;
pub use value::*;
pub use watch::*;
