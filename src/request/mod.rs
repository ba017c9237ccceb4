//! The request value object.
//!
//! # Responsibilities
//! - Hold one inbound request: method, URL components, query, headers, form
//!   fields, uploads, raw body, route parameters
//! - Keep path, base path and script path consistent on every mutation
//! - Decompose and recompose URLs
//! - Default the port from the scheme
//!
//! # Design Decisions
//! - Absent optional values are `None`, never empty strings
//! - Path bookkeeping is delegated to [`PathState::apply`]; setters only pick the change
//! - Header names are canonicalized on write and on lookup

pub mod error;
pub mod fields;
pub mod overrides;
pub mod parts;
pub mod scheme;

use std::collections::BTreeMap;

use axum::http::Method;
use serde::Serialize;

use crate::config::RequestDefaults;
use crate::http::headers::canonical_header_name;
use crate::paths::{PathChange, PathState, Resolution};

pub use error::{RequestError, RequestResult};
pub use fields::{encode_form, parse_form, FieldMap, FieldValue, UploadedFile};
pub use overrides::RequestOverrides;
pub use parts::{parse_url, UrlParts};
pub use scheme::Scheme;

/// Values the `set_default_*` methods return to.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Baseline {
    method: Method,
    scheme: Scheme,
    host: String,
}

impl Baseline {
    fn from_defaults(defaults: &RequestDefaults) -> RequestResult<Self> {
        Ok(Self {
            method: parse_method(&defaults.method)?,
            scheme: defaults.scheme.parse()?,
            host: defaults.host.clone(),
        })
    }
}

fn parse_method(method: &str) -> RequestResult<Method> {
    let upper = method.to_ascii_uppercase();
    Method::from_bytes(upper.as_bytes()).map_err(|_| RequestError::InvalidMethod(method.to_string()))
}

/// One inbound HTTP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    baseline: Baseline,
    method: Method,
    scheme: Scheme,
    user: Option<String>,
    pass: Option<String>,
    host: String,
    port: Option<u16>,
    fragment: Option<String>,
    paths: PathState,
    resolution: Resolution,
    search: FieldMap,
    headers: BTreeMap<String, String>,
    post: FieldMap,
    files: BTreeMap<String, UploadedFile>,
    payload: Vec<u8>,
    params: BTreeMap<String, String>,
}

impl Request {
    /// Build a request from a URL and overrides, starting from the built-in defaults.
    pub fn new(url: &str, overrides: RequestOverrides) -> RequestResult<Self> {
        Self::with_defaults(url, overrides, &RequestDefaults::default())
    }

    /// Build a request from a URL alone.
    pub fn parse(url: &str) -> RequestResult<Self> {
        Self::new(url, RequestOverrides::default())
    }

    /// Build a request from a URL and overrides, starting from configured defaults.
    ///
    /// Defaults are applied first, then the URL, then every present override.
    pub fn with_defaults(
        url: &str,
        overrides: RequestOverrides,
        defaults: &RequestDefaults,
    ) -> RequestResult<Self> {
        let baseline = Baseline::from_defaults(defaults)?;
        let mut request = Self {
            method: baseline.method.clone(),
            scheme: baseline.scheme,
            host: baseline.host.clone(),
            port: Some(baseline.scheme.default_port()),
            baseline,
            user: None,
            pass: None,
            fragment: None,
            paths: PathState::default(),
            resolution: Resolution::Untracked,
            search: FieldMap::new(),
            headers: BTreeMap::new(),
            post: FieldMap::new(),
            files: BTreeMap::new(),
            payload: Vec::new(),
            params: BTreeMap::new(),
        };

        request.set_url(url)?;
        request.apply_overrides(overrides)?;
        Ok(request)
    }

    fn apply_overrides(&mut self, overrides: RequestOverrides) -> RequestResult<()> {
        let RequestOverrides {
            method,
            scheme,
            user,
            pass,
            host,
            port,
            path,
            base_path,
            script_path,
            search,
            headers,
            post,
            files,
            payload,
            params,
        } = overrides;

        if let Some(method) = method {
            self.set_method(&method)?;
        }
        if let Some(scheme) = scheme {
            self.set_scheme(&scheme)?;
        }
        if let Some(user) = user {
            self.set_user(user);
        }
        if let Some(pass) = pass {
            self.set_pass(pass);
        }
        if let Some(host) = host {
            self.set_host(host);
        }
        if let Some(port) = port {
            self.set_port(port);
        }
        if let Some(path) = path {
            self.set_path(&path);
        }
        if let Some(base_path) = base_path {
            self.set_base_path(&base_path);
        }
        if let Some(script_path) = script_path {
            self.set_script_path(&script_path);
        }
        if let Some(search) = search {
            self.set_search_vars(search);
        }
        if let Some(headers) = headers {
            self.set_headers(headers);
        }
        if let Some(post) = post {
            self.set_post_vars(post);
        }
        if let Some(files) = files {
            self.set_files(files);
        }
        if let Some(payload) = payload {
            self.set_payload(payload);
        }
        if let Some(params) = params {
            self.set_params(params);
        }
        Ok(())
    }

    // --- URL ---

    /// `scheme://host[:port]path[?query]`.
    ///
    /// The port is written whenever one is set, even if it is the scheme default.
    pub fn url(&self) -> String {
        let mut url = format!("{}://{}", self.scheme, self.host);
        if let Some(port) = self.port {
            url.push_str(&format!(":{}", port));
        }
        url.push_str(&self.paths.path);
        if !self.search.is_empty() {
            url.push('?');
            url.push_str(&self.query_string());
        }
        url
    }

    /// Apply every component present in `url`.
    ///
    /// Components are applied one by one; if the scheme is rejected nothing has
    /// been applied yet. A query string replaces the search parameters.
    pub fn set_url(&mut self, url: &str) -> RequestResult<()> {
        let parts = parse_url(url)?;

        if let Some(scheme) = parts.scheme {
            self.set_scheme(&scheme)?;
        }
        if let Some(host) = parts.host {
            self.set_host(host);
        }
        if let Some(port) = parts.port {
            self.set_port(port);
        }
        if let Some(path) = parts.path {
            self.set_path(&path);
        }
        if let Some(user) = parts.user {
            self.set_user(user);
        }
        if let Some(pass) = parts.pass {
            self.set_pass(pass);
        }
        if let Some(fragment) = parts.fragment {
            self.set_fragment(fragment);
        }
        if let Some(query) = parts.query {
            self.set_search_vars(parse_form(query.as_bytes()));
        }
        Ok(())
    }

    // --- Method ---

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Set the method; it is upper-cased first.
    pub fn set_method(&mut self, method: &str) -> RequestResult<()> {
        self.method = parse_method(method)?;
        Ok(())
    }

    pub fn set_default_method(&mut self) {
        self.method = self.baseline.method.clone();
    }

    // --- Scheme & port ---

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    /// Set the scheme from its name.
    ///
    /// Only `http` and `https` are accepted. If the port is still 80 it moves to
    /// the new scheme's default; any other port is left alone.
    pub fn set_scheme(&mut self, scheme: &str) -> RequestResult<()> {
        self.scheme = scheme.parse()?;
        if self.port == Some(80) {
            self.set_default_port();
        }
        Ok(())
    }

    pub fn set_default_scheme(&mut self) {
        self.scheme = self.baseline.scheme;
        if self.port == Some(80) {
            self.set_default_port();
        }
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    pub fn set_port(&mut self, port: u16) {
        self.port = Some(port);
    }

    pub fn remove_port(&mut self) {
        self.port = None;
    }

    /// 443 for https, 80 otherwise.
    pub fn default_port(&self) -> u16 {
        self.scheme.default_port()
    }

    pub fn set_default_port(&mut self) {
        self.port = Some(self.default_port());
    }

    // --- Credentials, host, fragment ---

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn set_user(&mut self, user: impl Into<String>) {
        self.user = Some(user.into());
    }

    pub fn remove_user(&mut self) {
        self.user = None;
    }

    pub fn pass(&self) -> Option<&str> {
        self.pass.as_deref()
    }

    pub fn set_pass(&mut self, pass: impl Into<String>) {
        self.pass = Some(pass.into());
    }

    pub fn remove_pass(&mut self) {
        self.pass = None;
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn set_host(&mut self, host: impl Into<String>) {
        self.host = host.into();
    }

    pub fn set_default_host(&mut self) {
        self.host = self.baseline.host.clone();
    }

    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    pub fn set_fragment(&mut self, fragment: impl Into<String>) {
        self.fragment = Some(fragment.into());
    }

    pub fn remove_fragment(&mut self) {
        self.fragment = None;
    }

    // --- Paths ---

    /// The full request path; always absolute.
    pub fn path(&self) -> &str {
        &self.paths.path
    }

    pub fn set_path(&mut self, path: &str) {
        self.change_paths(PathChange::SetPath(path.to_string()));
    }

    /// Reset the path to `/`.
    pub fn remove_path(&mut self) {
        self.change_paths(PathChange::RemovePath);
    }

    pub fn has_base_path(&self) -> bool {
        self.paths.base_path.is_some()
    }

    /// The deployment prefix; `Some("")` is the root.
    pub fn base_path(&self) -> Option<&str> {
        self.paths.base_path.as_deref()
    }

    pub fn set_base_path(&mut self, base_path: &str) {
        self.change_paths(PathChange::SetBasePath(base_path.to_string()));
    }

    pub fn remove_base_path(&mut self) {
        self.change_paths(PathChange::RemoveBasePath);
    }

    pub fn has_script_path(&self) -> bool {
        self.paths.script_path.is_some()
    }

    /// The part of the path below the base path.
    pub fn script_path(&self) -> Option<&str> {
        self.paths.script_path.as_deref()
    }

    pub fn set_script_path(&mut self, script_path: &str) {
        self.change_paths(PathChange::SetScriptPath(script_path.to_string()));
    }

    pub fn remove_script_path(&mut self) {
        self.change_paths(PathChange::RemoveScriptPath);
    }

    pub fn path_state(&self) -> &PathState {
        &self.paths
    }

    /// How the last path mutation was reconciled.
    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    fn change_paths(&mut self, change: PathChange) {
        let (paths, resolution) = std::mem::take(&mut self.paths).apply(change);
        self.paths = paths;
        self.resolution = resolution;
    }

    // --- Query parameters ---

    pub fn search_vars(&self) -> &FieldMap {
        &self.search
    }

    pub fn set_search_vars(&mut self, search: FieldMap) {
        self.search = search;
    }

    pub fn clear_search_vars(&mut self) {
        self.search.clear();
    }

    pub fn search(&self, name: &str) -> Option<&FieldValue> {
        self.search.get(name)
    }

    pub fn set_search(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.search.insert(name.into(), value.into());
    }

    pub fn remove_search(&mut self, name: &str) {
        self.search.remove(name);
    }

    /// The search parameters, form-urlencoded.
    pub fn query_string(&self) -> String {
        encode_form(&self.search)
    }

    // --- Headers ---

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    pub fn set_headers(&mut self, headers: BTreeMap<String, String>) {
        self.headers = headers
            .into_iter()
            .map(|(name, value)| (canonical_header_name(&name), value))
            .collect();
    }

    pub fn clear_headers(&mut self) {
        self.headers.clear();
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&canonical_header_name(name)).map(String::as_str)
    }

    pub fn header_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.header(name).unwrap_or(default)
    }

    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.insert(canonical_header_name(name), value.into());
    }

    pub fn remove_header(&mut self, name: &str) {
        self.headers.remove(&canonical_header_name(name));
    }

    // --- Form fields ---

    pub fn post_vars(&self) -> &FieldMap {
        &self.post
    }

    pub fn set_post_vars(&mut self, post: FieldMap) {
        self.post = post;
    }

    pub fn clear_post_vars(&mut self) {
        self.post.clear();
    }

    pub fn post(&self, name: &str) -> Option<&FieldValue> {
        self.post.get(name)
    }

    pub fn set_post(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.post.insert(name.into(), value.into());
    }

    pub fn remove_post(&mut self, name: &str) {
        self.post.remove(name);
    }

    // --- Uploads ---

    pub fn files(&self) -> &BTreeMap<String, UploadedFile> {
        &self.files
    }

    pub fn set_files(&mut self, files: BTreeMap<String, UploadedFile>) {
        self.files = files;
    }

    pub fn clear_files(&mut self) {
        self.files.clear();
    }

    pub fn file(&self, name: &str) -> Option<&UploadedFile> {
        self.files.get(name)
    }

    pub fn set_file(&mut self, name: impl Into<String>, file: UploadedFile) {
        self.files.insert(name.into(), file);
    }

    pub fn remove_file(&mut self, name: &str) {
        self.files.remove(name);
    }

    // --- Body ---

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn set_payload(&mut self, payload: impl Into<Vec<u8>>) {
        self.payload = payload.into();
    }

    pub fn clear_payload(&mut self) {
        self.payload.clear();
    }

    // --- Route parameters ---

    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }

    pub fn set_params(&mut self, params: BTreeMap<String, String>) {
        self.params = params;
    }

    pub fn clear_params(&mut self) {
        self.params.clear();
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn param_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.param(name).unwrap_or(default)
    }

    pub fn set_param(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.params.insert(name.into(), value.into());
    }

    pub fn remove_param(&mut self, name: &str) {
        self.params.remove(name);
    }

    /// A serializable view of the request. The password is left out.
    pub fn snapshot(&self) -> RequestSnapshot<'_> {
        RequestSnapshot {
            url: self.url(),
            method: self.method.as_str(),
            scheme: self.scheme,
            host: &self.host,
            port: self.port,
            user: self.user.as_deref(),
            fragment: self.fragment.as_deref(),
            paths: &self.paths,
            resolution: self.resolution,
            search: &self.search,
            headers: &self.headers,
            post: &self.post,
            files: &self.files,
            params: &self.params,
            payload_bytes: self.payload.len(),
        }
    }
}

/// Serializable view returned by [`Request::snapshot`].
#[derive(Debug, Serialize)]
pub struct RequestSnapshot<'a> {
    pub url: String,
    pub method: &'a str,
    pub scheme: Scheme,
    pub host: &'a str,
    pub port: Option<u16>,
    pub user: Option<&'a str>,
    pub fragment: Option<&'a str>,
    #[serde(flatten)]
    pub paths: &'a PathState,
    pub resolution: Resolution,
    pub search: &'a FieldMap,
    pub headers: &'a BTreeMap<String, String>,
    pub post: &'a FieldMap,
    pub files: &'a BTreeMap<String, UploadedFile>,
    pub params: &'a BTreeMap<String, String>,
    pub payload_bytes: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let req = Request::parse("").unwrap();
        assert_eq!(*req.method(), Method::GET);
        assert_eq!(req.scheme(), Scheme::Http);
        assert_eq!(req.host(), "localhost");
        assert_eq!(req.port(), Some(80));
        assert_eq!(req.path(), "/");
        assert_eq!(req.base_path(), None);
        assert_eq!(req.script_path(), None);
        assert_eq!(req.resolution(), Resolution::Untracked);
        assert!(req.headers().is_empty());
        assert!(req.payload().is_empty());
    }

    #[test]
    fn test_url_round_trip() {
        let req = Request::parse("https://example.com/app/index.php/?b=2&a=1#frag").unwrap();
        assert_eq!(req.scheme(), Scheme::Https);
        assert_eq!(req.port(), Some(443));
        assert_eq!(req.path(), "/app/index.php");
        assert_eq!(req.fragment(), Some("frag"));
        assert_eq!(req.url(), "https://example.com:443/app/index.php?a=1&b=2");
    }

    #[test]
    fn test_url_without_port() {
        let mut req = Request::parse("http://example.com/x").unwrap();
        req.remove_port();
        assert_eq!(req.url(), "http://example.com/x");
    }

    #[test]
    fn test_set_method_uppercases() {
        let mut req = Request::parse("/").unwrap();
        req.set_method("post").unwrap();
        assert_eq!(*req.method(), Method::POST);
        assert!(matches!(req.set_method("GE T"), Err(RequestError::InvalidMethod(_))));
        assert_eq!(*req.method(), Method::POST);
        req.set_default_method();
        assert_eq!(*req.method(), Method::GET);
    }

    #[test]
    fn test_scheme_port_defaulting() {
        let mut req = Request::parse("/").unwrap();
        req.set_scheme("https").unwrap();
        assert_eq!(req.port(), Some(443));

        let mut req = Request::parse("/").unwrap();
        req.set_port(8080);
        req.set_scheme("https").unwrap();
        assert_eq!(req.port(), Some(8080));

        let mut req = Request::parse("/").unwrap();
        let err = req.set_scheme("ftp").unwrap_err();
        assert_eq!(err.to_string(), "Unsupported scheme \"ftp\"");
        assert_eq!(req.scheme(), Scheme::Http);
        assert_eq!(req.port(), Some(80));
    }

    #[test]
    fn test_headers_are_canonical() {
        let mut req = Request::parse("/").unwrap();
        req.set_header("content-type", "text/plain");
        assert_eq!(req.header("CONTENT_TYPE"), Some("text/plain"));
        assert_eq!(req.headers().keys().collect::<Vec<_>>(), vec!["Content-Type"]);
        assert_eq!(req.header_or("Accept", "*/*"), "*/*");
        req.remove_header("Content-Type");
        assert!(req.headers().is_empty());
    }

    #[test]
    fn test_collections() {
        let mut req = Request::parse("/?page=2").unwrap();
        assert_eq!(req.search("page").and_then(FieldValue::as_str), Some("2"));
        req.set_search("q", "rust");
        req.remove_search("page");
        assert_eq!(req.query_string(), "q=rust");
        req.clear_search_vars();
        assert!(req.search_vars().is_empty());

        req.set_post("name", "Ada");
        assert_eq!(req.post("name"), Some(&FieldValue::from("Ada")));
        req.clear_post_vars();
        assert_eq!(req.post("name"), None);

        req.set_param("id", "5");
        assert_eq!(req.param("id"), Some("5"));
        assert_eq!(req.param_or("slug", "none"), "none");
        req.remove_param("id");
        assert!(req.params().is_empty());

        req.set_file(
            "avatar",
            UploadedFile {
                file_name: "me.png".into(),
                content_type: Some("image/png".into()),
                temp_path: "/tmp/upload-1".into(),
                size: 42,
                error: None,
            },
        );
        assert_eq!(req.file("avatar").map(|f| f.size), Some(42));
        req.remove_file("avatar");
        assert!(req.files().is_empty());

        req.set_payload("raw body");
        assert_eq!(req.payload(), b"raw body");
        req.clear_payload();
        assert!(req.payload().is_empty());
    }

    #[test]
    fn test_credentials() {
        let mut req = Request::parse("http://alice:pw@example.com/").unwrap();
        assert_eq!(req.user(), Some("alice"));
        assert_eq!(req.pass(), Some("pw"));
        req.remove_user();
        req.remove_pass();
        assert_eq!(req.user(), None);
        assert_eq!(req.pass(), None);
    }

    #[test]
    fn test_configured_defaults() {
        let defaults = RequestDefaults {
            method: "head".into(),
            scheme: "https".into(),
            host: "internal.example".into(),
        };
        let mut req = Request::with_defaults("/x", RequestOverrides::default(), &defaults).unwrap();
        assert_eq!(*req.method(), Method::HEAD);
        assert_eq!(req.port(), Some(443));
        assert_eq!(req.url(), "https://internal.example:443/x");

        req.set_host("other");
        req.set_default_host();
        assert_eq!(req.host(), "internal.example");
    }

    #[test]
    fn test_snapshot_omits_password() {
        let req = Request::parse("http://alice:pw@example.com/app").unwrap();
        let json = serde_json::to_value(req.snapshot()).unwrap();
        assert_eq!(json["path"], "/app");
        assert_eq!(json["base_path"], serde_json::Value::Null);
        assert_eq!(json["resolution"], "untracked");
        assert_eq!(json["user"], "alice");
        assert!(json.get("pass").is_none());
    }
}
