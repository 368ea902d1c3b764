//! Operator-facing services built on the core and API layers.

pub mod app;
pub mod gateway;
pub mod openapi;
pub mod plugins;
