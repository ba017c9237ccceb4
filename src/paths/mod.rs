//! Request path resolution subsystem.
//!
//! # Data Flow
//! ```text
//! raw path / base path / script path
//!     → segments.rs (normalize, split into segments)
//!     → resolver.rs (derive base+script from path, or compose path from base+script)
//!     → PathState (consistent triple) + Resolution (what happened)
//! ```
//!
//! # Design Decisions
//! - `""` is the root base path; absence is `None`, never an empty string
//! - A script path of `/` contributes nothing to the composed path
//! - Inconsistent base paths degrade silently; the `Resolution` records it

pub mod resolver;
pub mod segments;

pub use resolver::{compose_path, derive_from_path, fixup_pair, PathChange, PathState, Resolution};
pub use segments::{normalize, PathSegments};
