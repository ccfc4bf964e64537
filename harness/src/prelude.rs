//! Contains some reexport from this crate and other dependencies.
//! use:
//! ```
//! use harness::prelude::*;
//! ```
//! to have all thats needed in this crate

pub use crate::runner::*;
pub use crate::sample::*;
pub use crate::scenario::*;
pub use crate::user::*;

pub use crate::test::DummyScenario;

/// re-export of tokio-main
pub use tokio::main;

/// serde re-export
pub use serde;
/// serde_json re-export
pub use serde_json;

pub use async_trait::async_trait;
pub use serde::{Deserialize, Serialize};
