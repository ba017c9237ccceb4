//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check that defaults can actually build a request
//! - Validate value ranges (payload limit > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use axum::http::Method;
use thiserror::Error;

use crate::config::schema::AppConfig;
use crate::request::Scheme;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("defaults.scheme \"{0}\" is not http or https")]
    UnsupportedScheme(String),

    #[error("defaults.method \"{0}\" is not a valid HTTP method")]
    InvalidMethod(String),

    #[error("defaults.host must not be empty")]
    EmptyHost,

    #[error("deployment.base_path \"{0}\" must start with '/'")]
    RelativeBasePath(String),

    #[error("deployment.max_payload_bytes must be greater than zero")]
    ZeroPayloadLimit,
}

/// Check a parsed configuration, collecting every error.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let defaults = &config.defaults;

    if defaults.scheme.parse::<Scheme>().is_err() {
        errors.push(ValidationError::UnsupportedScheme(defaults.scheme.clone()));
    }
    if defaults.method.is_empty()
        || Method::from_bytes(defaults.method.to_ascii_uppercase().as_bytes()).is_err()
    {
        errors.push(ValidationError::InvalidMethod(defaults.method.clone()));
    }
    if defaults.host.trim().is_empty() {
        errors.push(ValidationError::EmptyHost);
    }

    if let Some(base_path) = &config.deployment.base_path {
        if !base_path.starts_with('/') {
            errors.push(ValidationError::RelativeBasePath(base_path.clone()));
        }
    }
    if config.deployment.max_payload_bytes == 0 {
        errors.push(ValidationError::ZeroPayloadLimit);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
