//! Server-side adapter subsystem.
//!
//! # Data Flow
//! ```text
//! axum::http::Request (already decoded by hyper)
//!     → headers.rs (canonical header names)
//!     → context.rs (host, port, scheme, credentials, body → RequestOverrides)
//!     → Request::with_defaults (path triple reconciled against deployment base path)
//!     → request extensions → handlers
//! ```

pub mod context;
pub mod headers;

pub use context::{build_request, overrides_from_parts, request_context_middleware, ContextState};
pub use headers::{canonical_header_name, collect_headers};
