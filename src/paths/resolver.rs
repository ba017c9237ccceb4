//! Reconciliation of the (path, base path, script path) triple.
//!
//! # Responsibilities
//! - Derive base and script paths from the full path (downward)
//! - Compose the full path from base and script paths (upward)
//! - Apply one field mutation and return the new consistent triple
//!
//! # Design Decisions
//! - Every function takes and returns the whole triple; nothing is patched in place
//! - Folder/entry comparisons operate on whole segments, never on byte offsets
//! - A base path that does not fit the path clears both halves instead of failing

use serde::Serialize;

use crate::paths::segments::{normalize, PathSegments};

/// Outcome of the last downward derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// Neither base path nor script path is declared; nothing to reconcile.
    #[default]
    Untracked,
    /// The declared base path is present in the path as-is.
    Confirmed,
    /// The base path entry was not found and the base path moved up to its folder.
    Demoted,
    /// The base path folder is not a prefix of the path; both halves were cleared.
    Degraded,
}

/// A single mutation of one member of the triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathChange {
    SetPath(String),
    RemovePath,
    SetBasePath(String),
    RemoveBasePath,
    SetScriptPath(String),
    RemoveScriptPath,
}

/// The request path together with its optional base/script decomposition.
///
/// When both `base_path` and `script_path` are present,
/// `path == base_path + script_path`, except that a script path of `/` adds
/// nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathState {
    pub path: String,
    pub base_path: Option<String>,
    pub script_path: Option<String>,
}

impl Default for PathState {
    fn default() -> Self {
        Self {
            path: "/".to_string(),
            base_path: None,
            script_path: None,
        }
    }
}

impl PathState {
    /// Apply one change and reconcile the rest of the triple.
    ///
    /// Changing the path only re-derives the decomposition. Changing either half
    /// first reconciles against the current path, then recomposes the path.
    pub fn apply(self, change: PathChange) -> (PathState, Resolution) {
        let (next, resolution) = match change {
            PathChange::SetPath(raw) => derive_from_path(PathState {
                path: normalize(&raw),
                ..self
            }),
            PathChange::RemovePath => derive_from_path(PathState {
                path: "/".to_string(),
                ..self
            }),
            PathChange::SetBasePath(raw) => recompose(PathState {
                base_path: Some(normalize(&raw)),
                ..self
            }),
            PathChange::RemoveBasePath => recompose(PathState {
                base_path: None,
                ..self
            }),
            PathChange::SetScriptPath(raw) => recompose(PathState {
                script_path: Some(normalize(&raw)),
                ..self
            }),
            PathChange::RemoveScriptPath => recompose(PathState {
                script_path: None,
                ..self
            }),
        };

        match resolution {
            Resolution::Degraded => tracing::debug!(
                path = %next.path,
                "Declared base path does not fit the request path; base and script paths cleared"
            ),
            Resolution::Demoted => tracing::debug!(
                path = %next.path,
                base_path = next.base_path.as_deref().unwrap_or_default(),
                "Base path entry not found in request path; base path demoted to its folder"
            ),
            _ => {}
        }

        (next, resolution)
    }
}

fn recompose(state: PathState) -> (PathState, Resolution) {
    let (state, resolution) = derive_from_path(state);
    (compose_path(state), resolution)
}

/// Remove the representational redundancy between base and script path.
///
/// A base path of `/` becomes `""`, and a missing half is defaulted when the
/// other one is present (`/` for the script path, `""` for the base path).
pub fn fixup_pair(state: PathState) -> PathState {
    let base_path = match state.base_path {
        Some(base) if base == "/" => Some(String::new()),
        other => other,
    };

    match (base_path, state.script_path) {
        (Some(base), None) => PathState {
            path: state.path,
            base_path: Some(base),
            script_path: Some("/".to_string()),
        },
        (None, Some(script)) => PathState {
            path: state.path,
            base_path: Some(String::new()),
            script_path: Some(script),
        },
        (base_path, script_path) => PathState {
            path: state.path,
            base_path,
            script_path,
        },
    }
}

/// Derive base and script paths from the full path.
///
/// Does nothing unless at least one half is declared. The last segment of the
/// base path is its entry (for instance a front controller); the remaining
/// segments are its folder. If the folder is not a prefix of the path, both
/// halves are cleared. If the segment following the folder is the entry, the base
/// path is kept; otherwise it is demoted to the folder. The script path is
/// whatever follows the resulting base path, or `/` when nothing does.
pub fn derive_from_path(state: PathState) -> (PathState, Resolution) {
    if state.base_path.is_none() && state.script_path.is_none() {
        return (state, Resolution::Untracked);
    }

    let state = fixup_pair(state);
    let path = PathSegments::parse(&state.path);
    let base = PathSegments::parse(state.base_path.as_deref().unwrap_or_default());

    let Some((folder, entry)) = base.split_entry() else {
        // Root base path: the whole path is routed by the application.
        return (
            PathState {
                script_path: Some(path.render_path()),
                base_path: Some(String::new()),
                path: state.path,
            },
            Resolution::Confirmed,
        );
    };

    let Some(below_folder) = path.strip_prefix(&folder) else {
        return (
            PathState {
                path: state.path,
                base_path: None,
                script_path: None,
            },
            Resolution::Degraded,
        );
    };

    if below_folder.get(0) == Some(entry) {
        let script = path
            .strip_prefix(&base)
            .unwrap_or_default()
            .render_path();
        (
            PathState {
                path: state.path,
                base_path: Some(base.render_base()),
                script_path: Some(script),
            },
            Resolution::Confirmed,
        )
    } else {
        let demoted = folder.render_base();
        // A folder of empty segments (`//a`) is not a normalized base path; the
        // nearest one is the root.
        let (base_path, script_path) = if demoted.ends_with('/') {
            (String::new(), path.render_path())
        } else {
            (demoted, below_folder.render_path())
        };
        (
            PathState {
                path: state.path,
                base_path: Some(base_path),
                script_path: Some(script_path),
            },
            Resolution::Demoted,
        )
    }
}

/// Compose the full path from base and script paths.
///
/// Leaves the path untouched when neither half is declared.
pub fn compose_path(state: PathState) -> PathState {
    let state = fixup_pair(state);
    let path = match (&state.base_path, &state.script_path) {
        (Some(base), Some(script)) => PathSegments::parse(base)
            .join(&PathSegments::parse(script))
            .render_path(),
        _ => return state,
    };
    PathState { path, ..state }
}
