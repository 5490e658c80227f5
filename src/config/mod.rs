//! # Configuration Module
//!
//! Wire constants and sizing defaults for turrow live in one place. Values
//! that depend on each other are co-located and checked with compile-time
//! assertions so a change to one cannot silently break another.
//!
//! ## Module Organization
//!
//! - [`constants`]: framing header, system schema ids, buffer sizing

pub mod constants;
pub use constants::*;
