//! Decoded `application/x-www-form-urlencoded` data.

use std::collections::HashMap;

use axum::http::{header, HeaderMap, Method};

/// The only content type whose body is decoded before matching.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// True for a POST whose content type is exactly the form type.
pub fn is_form_post(method: &Method, headers: &HeaderMap) -> bool {
    *method == Method::POST
        && headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == FORM_CONTENT_TYPE)
}

/// Ordered key/value pairs read from a form body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    pairs: Vec<(String, String)>,
}

impl FormData {
    /// Parse url-encoded bytes. `+` decodes to a space.
    pub fn parse(bytes: &[u8]) -> Self {
        Self {
            pairs: url::form_urlencoded::parse(bytes).into_owned().collect(),
        }
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Flatten into a map; a repeated key keeps its last value.
    pub fn to_map(&self) -> HashMap<String, String> {
        self.pairs.iter().cloned().collect()
    }
}

impl FromIterator<(String, String)> for FormData {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self {
            pairs: iter.into_iter().collect(),
        }
    }
}
