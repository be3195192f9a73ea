//! Data models for the tea farm operations application.
//!
//! Shared by the REST server and the client so both sides agree on the wire format.

mod dashboard;
mod field;
mod harvest;
mod patch;
mod task;
mod user;
mod validation;
mod weather;

pub use dashboard::*;
pub use field::*;
pub use harvest::*;
pub use patch::{merge_nullable, nullable};
pub use task::*;
pub use user::*;
pub use validation::{Validate, ValidationError};
pub use weather::*;
