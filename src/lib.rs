//! HTTP request model with base path / script path resolution.

pub mod config;
pub mod http;
pub mod observability;
pub mod paths;
pub mod request;

pub use config::AppConfig;
pub use paths::{PathState, Resolution};
pub use request::{Request, RequestError, RequestOverrides, RequestResult, Scheme};
