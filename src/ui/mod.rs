//! Terminal rendering for interactive actions.

pub mod action;
pub mod views;

pub use action::AsyncAction;
