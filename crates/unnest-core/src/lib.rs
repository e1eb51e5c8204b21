//! Core types for unnest.
//!
//! This crate provides the data structures shared by the flatten and prune
//! passes: errors, run configuration and the directory classification rule.

mod class;
mod config;
mod error;

pub use class::{DirClass, DirListing};
pub use config::{ConflictPolicy, UnnestConfig, UnnestConfigBuilder};
pub use error::{ConflictKind, Result, UnnestError};
