//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! paths::resolver   → debug events on demotion / degradation
//! http::context     → warn events on rejected requests
//! config::loader    → debug event on load
//!     → logging.rs (subscriber: EnvFilter + fmt to stderr)
//! ```

pub mod logging;

pub use logging::init_logging;
