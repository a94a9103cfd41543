//! Request matching.
//!
//! # Responsibilities
//! - Clean the request path
//! - Find the first route whose method and pattern both accept the request
//! - Extract path params, query params, and form data into a [`RouteMatch`]
//!
//! # Design Decisions
//! - Linear scan in registration order, stopping at the first hit
//! - Method compared before the pattern is evaluated
//! - Path params override same-named query params
//! - Repeated query keys: the last occurrence in the query string wins

use std::collections::HashMap;
use std::sync::Arc;

use axum::http::{HeaderMap, Method, Request, Uri};
use percent_encoding::percent_decode_str;

use crate::routing::form::{is_form_post, FormData};
use crate::routing::router::{Route, Router};

/// Result of matching one request against the route table.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    pub route: Arc<Route>,
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    /// Raw capture groups, undecoded, in pattern order.
    pub captures: Vec<Option<String>>,
    /// Decoded path parameters in declaration order.
    pub path_params: Vec<(String, String)>,
    /// Query-string parameters only.
    pub query: HashMap<String, String>,
    /// Query parameters overlaid with path parameters.
    pub params: HashMap<String, String>,
    /// Decoded form body for url-encoded POSTs.
    pub body: Option<HashMap<String, String>>,
}

impl RouteMatch {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    pub fn form_value(&self, name: &str) -> Option<&str> {
        self.body.as_ref()?.get(name).map(String::as_str)
    }
}

impl PartialEq for RouteMatch {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.route, &other.route)
            && self.method == other.method
            && self.uri == other.uri
            && self.headers == other.headers
            && self.captures == other.captures
            && self.path_params == other.path_params
            && self.query == other.query
            && self.params == other.params
            && self.body == other.body
    }
}

impl Router {
    /// Match a request against the route table.
    ///
    /// `form` is the already-decoded body; it is attached only to url-encoded POSTs.
    pub fn match_request<B>(&self, request: &Request<B>, form: Option<&FormData>) -> Option<RouteMatch> {
        let path = clean_path(request.uri().path());
        let method = request.method();

        let (route, captures) = self.routes().iter().find_map(|route| {
            if route.method() != method {
                return None;
            }
            route.compiled().captures(&path).map(|caps| (route, caps))
        })?;

        let path_params = extract_params(route.param_names(), &captures);
        let query = parse_query(request.uri().query());

        let mut params = query.clone();
        params.extend(path_params.iter().cloned());

        let body = if is_form_post(method, request.headers()) {
            form.map(FormData::to_map)
        } else {
            None
        };

        tracing::debug!(
            method = %method,
            path = %path,
            pattern = %route.pattern(),
            params = ?path_params,
            "Route matched"
        );

        Some(RouteMatch {
            route: Arc::clone(route),
            method: method.clone(),
            uri: request.uri().clone(),
            headers: request.headers().clone(),
            captures,
            path_params,
            query,
            params,
            body,
        })
    }
}

/// Collapse any run of leading slashes into one.
pub fn clean_path(path: &str) -> String {
    let rest = path.trim_start_matches('/');
    if rest.len() == path.len() {
        return path.to_string();
    }
    let mut cleaned = String::with_capacity(rest.len() + 1);
    cleaned.push('/');
    cleaned.push_str(rest);
    cleaned
}

/// Parse a query string; a repeated key keeps its last value.
pub fn parse_query(query: Option<&str>) -> HashMap<String, String> {
    query
        .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default()
}

fn extract_params(names: &[String], captures: &[Option<String>]) -> Vec<(String, String)> {
    names
        .iter()
        .zip(captures)
        .filter_map(|(name, value)| {
            let value = value.as_deref()?;
            let decoded = percent_decode_str(value).decode_utf8_lossy().into_owned();
            Some((name.clone(), decoded))
        })
        .collect()
}
