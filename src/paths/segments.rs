//! Path normalization and the segment model.
//!
//! Paths handled here are URL paths, not filesystem paths: `/` is the only
//! separator and segments are compared byte for byte. Empty segments produced by
//! doubled slashes are kept so that rendering a parsed path gives back the same
//! string.

/// Normalize a raw path.
///
/// Every trailing `/` is stripped and a leading `/` is added when missing. The
/// result is never empty; an empty or all-slash input yields `/`.
pub fn normalize(raw: &str) -> String {
    let trimmed = raw.trim_end_matches('/');
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

/// An ordered sequence of `/`-delimited segments.
///
/// The root path (`/`) and the root base path (`""`) both have zero segments;
/// the `render_*` methods decide how the empty sequence is spelled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathSegments {
    segments: Vec<String>,
}

impl PathSegments {
    /// Split a normalized path (or the empty root base path) into segments.
    pub fn parse(normalized: &str) -> Self {
        let body = normalized.strip_prefix('/').unwrap_or(normalized);
        if body.is_empty() {
            return Self::default();
        }
        Self {
            segments: body.split('/').map(str::to_string).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.segments.get(index).map(String::as_str)
    }

    /// Split off the final segment.
    ///
    /// Returns the parent folder and the entry name, or `None` for the root.
    pub fn split_entry(&self) -> Option<(PathSegments, &str)> {
        let (entry, folder) = self.segments.split_last()?;
        Some((
            Self {
                segments: folder.to_vec(),
            },
            entry.as_str(),
        ))
    }

    /// Returns true if `prefix` matches the leading segments of `self`.
    pub fn starts_with(&self, prefix: &PathSegments) -> bool {
        self.segments.starts_with(&prefix.segments)
    }

    /// The segments left after removing `prefix`, if it is a prefix.
    pub fn strip_prefix(&self, prefix: &PathSegments) -> Option<PathSegments> {
        if !self.starts_with(prefix) {
            return None;
        }
        Some(Self {
            segments: self.segments[prefix.len()..].to_vec(),
        })
    }

    /// Concatenate two sequences.
    pub fn join(&self, tail: &PathSegments) -> PathSegments {
        let mut segments = self.segments.clone();
        segments.extend(tail.segments.iter().cloned());
        Self { segments }
    }

    /// Render as a full request path; the empty sequence is `/`.
    pub fn render_path(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }

    /// Render as a base path; the empty sequence is the root base path `""`.
    pub fn render_base(&self) -> String {
        if self.segments.is_empty() {
            String::new()
        } else {
            self.render_path()
        }
    }
}
