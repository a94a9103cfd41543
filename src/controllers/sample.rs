//! Demo CRUD controller.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::http::response::{html, text};
use crate::routing::{HandlerResult, RouteMatch};

/// Characters left alone by a URI-component encoder.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub async fn index(_req: RouteMatch) -> HandlerResult {
    Ok(html("<html><body>SampleController@index</body></html>"))
}

pub async fn show(req: RouteMatch) -> HandlerResult {
    let id = req.param("id").unwrap_or_default();
    Ok(html(format!(
        "<html><body>SampleController@show: id={id}</body></html>"
    )))
}

/// Echo the posted form, keys sorted, values component-encoded.
pub async fn store(req: RouteMatch) -> HandlerResult {
    let mut fields: Vec<(&String, &String)> = req.body.iter().flatten().collect();
    fields.sort();
    let posted = fields
        .iter()
        .map(|(k, v)| format!("{k}={}", utf8_percent_encode(v, COMPONENT)))
        .collect::<Vec<_>>()
        .join("&");
    Ok(text(format!("SampleController@store: Posted Data = {posted}")))
}

pub async fn update(req: RouteMatch) -> HandlerResult {
    let id = req.param("id").unwrap_or_default();
    Ok(text(format!("SampleController@update: id={id}")))
}

pub async fn destroy(req: RouteMatch) -> HandlerResult {
    let id = req.param("id").unwrap_or_default();
    Ok(text(format!("SampleController@destroy: id={id}")))
}
