//! Gateway API access: endpoint resolution, authentication and dispatch.

pub mod auth;
pub mod endpoints;
pub mod request;

pub use endpoints::{EndpointPair, resolve};
pub use request::{ApiClient, RequestOptions, compile_path};
