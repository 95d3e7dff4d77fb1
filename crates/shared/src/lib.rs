//! Wire schemas and small helpers shared by the admin client crates.

pub mod domain;
pub mod error;
pub mod protocol;
pub mod util;
