//! Core building blocks for the gateway CLI: runtime settings, the crate
//! error type, and the single-flight async resource cache every interactive
//! action runs through.

pub mod config;
pub mod error;
pub mod resource;
pub mod utils;

pub use error::{Error, Result};
