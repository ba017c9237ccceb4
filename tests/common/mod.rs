//! Shared helpers for integration tests.

use reqpath::{Request, RequestOverrides};

/// Build a request for `path` with no base path declared.
#[allow(dead_code)]
pub fn request_at(path: &str) -> Request {
    Request::new("http://localhost", RequestOverrides::new().path(path)).unwrap()
}

/// Every string in `alphabet` up to `max_len` characters, for exhaustive checks.
#[allow(dead_code)]
pub fn all_strings(alphabet: &[char], max_len: usize) -> Vec<String> {
    let mut out = vec![String::new()];
    let mut frontier = vec![String::new()];
    for _ in 0..max_len {
        let mut next = Vec::new();
        for prefix in &frontier {
            for c in alphabet {
                let mut s = prefix.clone();
                s.push(*c);
                next.push(s);
            }
        }
        out.extend(next.iter().cloned());
        frontier = next;
    }
    out
}
