//! # Contracts
//!
//! Frozen interface contracts (ICD), defining inter-module data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Timestamps are seconds since the Unix epoch (`u64`)
//! - `0` means "fill in at dispatch time"

mod config;
mod error;
mod notification;
mod plugin;
mod schema;
mod value;

pub mod net;

pub use config::*;
pub use error::*;
pub use notification::*;
pub use plugin::*;
pub use schema::*;
pub use value::*;
