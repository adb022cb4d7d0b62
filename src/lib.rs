//! A declarative, reactive preference layer over an embedded key-value
//! store.
//!
//! Declare a contract — a set of accessor method signatures described as
//! typed data — and bind it to get a working implementation: each method
//! is classified once (get/put/remove/clear), its store key resolved, and
//! every call dispatched to a typed accessor. Watch-style reads return
//! replay-first live streams fed by a shared per-key change bus.
//!
//! ```
//! use pref_engine::{
//!     CallArgs, ContractBinder, ContractSpec, MethodSpec, Outcome, ScalarKind, TypeSpec,
//! };
//!
//! # fn main() -> pref_engine::Result<()> {
//! let contract = ContractSpec::new("UserStore")
//!     .method(MethodSpec::new("put_user").param(TypeSpec::Scalar(ScalarKind::Text)))
//!     .method(
//!         MethodSpec::new("get_user")
//!             .returns(TypeSpec::Scalar(ScalarKind::Text))
//!             .default_param(TypeSpec::Scalar(ScalarKind::Text)),
//!     )
//!     .method(MethodSpec::new("remove_user").remove_marker());
//!
//! let store = ContractBinder::new().bind(contract)?;
//!
//! store.invoke_by_name("put_user", CallArgs::one("alice"))?;
//! let outcome = store.invoke_by_name("get_user", CallArgs::one("nobody"))?;
//! match outcome {
//!     Outcome::Value(value) => assert_eq!(value.as_text(), Some("alice")),
//!     other => panic!("unexpected outcome: {other:?}"),
//! }
//! # Ok(())
//! # }
//! ```

mod accessor;
mod bus;
mod config;
mod contract;
mod convert;
mod dispatch;
mod errors;
mod store;
mod types;

pub use accessor::*;
pub use bus::*;
pub use config::*;
pub use contract::*;
pub use convert::*;
pub use dispatch::*;
pub use errors::*;
pub use store::*;
pub use types::*;
