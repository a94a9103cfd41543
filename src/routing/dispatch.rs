//! Per-request dispatch.
//!
//! # Data Flow
//! ```text
//! Request
//!     → form POST? read body once, rebuild request from the bytes
//!     → match_request
//!     → matched: route handler(RouteMatch)
//!     → unmatched: pass-through(request)
//! ```
//!
//! # Design Decisions
//! - The form read is the only await before matching
//! - The default-handler slot is never used for unmatched requests
//! - Handler panics, sync or async, become `DispatchError::HandlerPanicked`

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Instant;

use axum::body::Body;
use axum::http::{Request, Response};
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use thiserror::Error;

use crate::observability::metrics;
use crate::routing::form::{is_form_post, FormData};
use crate::routing::handler::BoxError;
use crate::routing::router::Router;

/// Action taken for requests no route accepts.
pub trait PassThrough: Send + Sync {
    fn forward(&self, request: Request<Body>) -> BoxFuture<'static, Result<Response<Body>, BoxError>>;
}

impl<F, Fut> PassThrough for F
where
    F: Fn(Request<Body>) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Response<Body>, BoxError>> + Send + 'static,
{
    fn forward(&self, request: Request<Body>) -> BoxFuture<'static, Result<Response<Body>, BoxError>> {
        self(request).boxed()
    }
}

/// Failure of a single dispatch.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("failed to read form body: {0}")]
    FormBody(#[source] axum::Error),

    #[error("route handler failed: {0}")]
    Handler(#[source] BoxError),

    #[error("route handler panicked: {0}")]
    HandlerPanicked(String),

    #[error("pass-through failed: {0}")]
    PassThrough(#[source] BoxError),
}

impl Router {
    /// Route one request to its handler, or to `pass_through` when nothing matches.
    pub async fn dispatch<P>(&self, request: Request<Body>, pass_through: &P) -> Result<Response<Body>, DispatchError>
    where
        P: PassThrough + ?Sized,
    {
        let start = Instant::now();
        let (request, form) = match self.read_form(request).await {
            Ok(read) => read,
            Err(e) => {
                metrics::record_dispatch("error", start);
                return Err(e);
            }
        };

        let Some(matched) = self.match_request(&request, form.as_ref()) else {
            tracing::debug!(
                method = %request.method(),
                path = %request.uri().path(),
                "No route matched, passing through"
            );
            let result = pass_through
                .forward(request)
                .await
                .map_err(DispatchError::PassThrough);
            metrics::record_dispatch(outcome("pass_through", &result), start);
            return result;
        };

        let handler = matched.route.handler().clone();
        let result = match std::panic::catch_unwind(AssertUnwindSafe(|| handler.call(matched))) {
            Ok(fut) => match AssertUnwindSafe(fut).catch_unwind().await {
                Ok(res) => res.map_err(DispatchError::Handler),
                Err(panic) => Err(DispatchError::HandlerPanicked(panic_message(panic))),
            },
            Err(panic) => Err(DispatchError::HandlerPanicked(panic_message(panic))),
        };

        if let Err(e) = &result {
            tracing::error!(error = %e, "Route handler failed");
        }
        metrics::record_dispatch(outcome("matched", &result), start);
        result
    }

    /// Buffer a url-encoded POST body and hand back an equivalent request.
    async fn read_form(&self, request: Request<Body>) -> Result<(Request<Body>, Option<FormData>), DispatchError> {
        if !is_form_post(request.method(), request.headers()) {
            return Ok((request, None));
        }

        let (parts, body) = request.into_parts();
        let bytes = axum::body::to_bytes(body, self.form_limit())
            .await
            .map_err(DispatchError::FormBody)?;
        let form = FormData::parse(&bytes);

        tracing::debug!(fields = form.pairs().len(), bytes = bytes.len(), "Form body decoded");

        Ok((Request::from_parts(parts, Body::from(bytes)), Some(form)))
    }
}

fn outcome<T>(label: &'static str, result: &Result<T, DispatchError>) -> &'static str {
    if result.is_ok() {
        label
    } else {
        "error"
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::form::FORM_CONTENT_TYPE;
    use crate::routing::handler::Handler;
    use crate::routing::matcher::RouteMatch;
    use axum::http::{header, Method, StatusCode};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    async fn body_text(response: Response<Body>) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn echo(label: &'static str) -> Handler {
        Handler::new(move |m: RouteMatch| async move {
            let id = m.param("id").unwrap_or("-").to_string();
            Ok::<_, BoxError>(Response::new(Body::from(format!("{label}:{id}"))))
        })
    }

    fn upstream() -> impl PassThrough {
        |req: Request<Body>| async move {
            let text = format!("upstream:{}", req.uri().path());
            Ok::<_, BoxError>(Response::new(Body::from(text)))
        }
    }

    #[tokio::test]
    async fn test_dispatch_invokes_first_match() {
        let mut router = Router::new();
        router.get("/users/:id", echo("first")).get("/users/:id", echo("second"));

        let req = Request::get("/users/5").body(Body::empty()).unwrap();
        let res = router.dispatch(req, &upstream()).await.unwrap();
        assert_eq!(body_text(res).await, "first:5");
    }

    #[tokio::test]
    async fn test_empty_router_passes_through() {
        let router = Router::new();
        let req = Request::get("/anything").body(Body::empty()).unwrap();
        let res = router.dispatch(req, &upstream()).await.unwrap();
        assert_eq!(body_text(res).await, "upstream:/anything");
    }

    #[tokio::test]
    async fn test_default_handler_not_used_on_miss() {
        let mut router = Router::new();
        router.get("/", echo("root"));
        let req = Request::get("/").body(Body::empty()).unwrap();
        let res = router.dispatch(req, &upstream()).await.unwrap();
        assert_eq!(body_text(res).await, "upstream:/");
    }

    #[tokio::test]
    async fn test_form_post_exposes_body_and_keeps_bytes_for_pass_through() {
        let mut router = Router::new();
        router.post(
            "/people",
            Handler::new(|m: RouteMatch| async move {
                let text = format!(
                    "{}/{}/{}",
                    m.form_value("name").unwrap_or(""),
                    m.form_value("age").unwrap_or(""),
                    m.param("name").is_some()
                );
                Ok::<_, BoxError>(Response::new(Body::from(text)))
            }),
        );

        let form_req = |uri: &str| {
            Request::post(uri)
                .header(header::CONTENT_TYPE, FORM_CONTENT_TYPE)
                .body(Body::from("name=Jane&age=30"))
                .unwrap()
        };

        let res = router.dispatch(form_req("/people"), &upstream()).await.unwrap();
        assert_eq!(body_text(res).await, "Jane/30/false");

        let echo_body = |req: Request<Body>| async move {
            let bytes = axum::body::to_bytes(req.into_body(), usize::MAX).await?;
            Ok::<_, BoxError>(Response::new(Body::from(bytes)))
        };
        let res = router.dispatch(form_req("/elsewhere"), &echo_body).await.unwrap();
        assert_eq!(body_text(res).await, "name=Jane&age=30");
    }

    #[tokio::test]
    async fn test_large_form_passes_through_by_default() {
        let router = Router::new();
        let body = format!("blob={}", "a".repeat(2 * 1024 * 1024));
        let req = Request::post("/anything")
            .header(header::CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(Body::from(body.clone()))
            .unwrap();

        let echo_len = |req: Request<Body>| async move {
            let bytes = axum::body::to_bytes(req.into_body(), usize::MAX).await?;
            Ok::<_, BoxError>(Response::new(Body::from(bytes.len().to_string())))
        };
        let res = router.dispatch(req, &echo_len).await.unwrap();
        assert_eq!(body_text(res).await, body.len().to_string());
    }

    #[tokio::test]
    async fn test_form_over_limit_is_rejected() {
        let router = Router::new().with_form_limit(4);
        let req = Request::post("/people")
            .header(header::CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(Body::from("name=Jane"))
            .unwrap();
        let err = router.dispatch(req, &upstream()).await.unwrap_err();
        assert!(matches!(err, DispatchError::FormBody(_)));
    }

    #[test]
    fn test_form_read_failure_counts_as_error() {
        let recorder = metrics_exporter_prometheus::PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        let router = Router::new().with_form_limit(4);
        let req = Request::post("/people")
            .header(header::CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(Body::from("name=Jane"))
            .unwrap();

        let result = ::metrics::with_local_recorder(&recorder, || {
            router.dispatch(req, &upstream()).now_or_never()
        });
        assert!(matches!(result, Some(Err(DispatchError::FormBody(_)))));
        assert!(handle
            .render()
            .contains(r#"edge_router_dispatch_total{outcome="error"} 1"#));
    }

    #[tokio::test]
    async fn test_handler_error_is_rejection() {
        let mut router = Router::new();
        router.get(
            "/fail",
            Handler::new(|_m: RouteMatch| async { Err::<Response<Body>, BoxError>("boom".into()) }),
        );
        let req = Request::get("/fail").body(Body::empty()).unwrap();
        let err = router.dispatch(req, &upstream()).await.unwrap_err();
        assert!(matches!(err, DispatchError::Handler(_)));
        assert!(err.to_string().contains("boom"));
    }

    #[tokio::test]
    async fn test_handler_panic_is_caught() {
        let mut router = Router::new();
        router.get(
            "/panic",
            Handler::new(|_m: RouteMatch| async {
                if true {
                    panic!("handler exploded");
                }
                Ok::<_, BoxError>(Response::new(Body::empty()))
            }),
        );
        let req = Request::get("/panic").body(Body::empty()).unwrap();
        let err = router.dispatch(req, &upstream()).await.unwrap_err();
        match err {
            DispatchError::HandlerPanicked(msg) => assert_eq!(msg, "handler exploded"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_pass_through_error_is_rejection() {
        let router = Router::new();
        let failing = |_req: Request<Body>| async { Err::<Response<Body>, BoxError>("down".into()) };
        let req = Request::get("/x").body(Body::empty()).unwrap();
        let err = router.dispatch(req, &failing).await.unwrap_err();
        assert!(matches!(err, DispatchError::PassThrough(_)));
    }

    #[tokio::test]
    async fn test_method_mismatch_passes_through() {
        let calls = Arc::new(AtomicUsize::new(0));
        let c = calls.clone();
        let mut router = Router::new();
        router.get(
            "/items/:id",
            Handler::new(move |_m: RouteMatch| {
                c.fetch_add(1, Ordering::SeqCst);
                async { Ok::<_, BoxError>(Response::new(Body::empty())) }
            }),
        );
        let req = Request::builder()
            .method(Method::DELETE)
            .uri("/items/1")
            .body(Body::empty())
            .unwrap();
        let res = router.dispatch(req, &upstream()).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_text(res).await, "upstream:/items/1");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
