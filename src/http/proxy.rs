//! Pass-through to the upstream origin.
//!
//! # Responsibilities
//! - Rewrite the request URI to the configured upstream authority
//! - Forward the request unchanged otherwise (method, headers, body)
//! - Bound the upstream round trip with a timeout
//!
//! # Design Decisions
//! - One pooled hyper client per process
//! - Upstream errors surface as `ProxyError`, rendered by the caller

use std::str::FromStr;
use std::time::Duration;

use axum::body::Body;
use axum::http::uri::{Authority, Scheme};
use axum::http::{Request, Response, Uri};
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;
use thiserror::Error;

use crate::config::{TimeoutConfig, UpstreamConfig};
use crate::routing::{BoxError, PassThrough};

/// Failure forwarding a request upstream.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("invalid upstream authority '{0}'")]
    Authority(String),

    #[error("failed to build upstream URI: {0}")]
    Uri(#[from] axum::http::uri::InvalidUriParts),

    #[error("upstream request failed: {0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),

    #[error("upstream timed out after {0:?}")]
    Timeout(Duration),
}

/// Forwards unmatched requests to a single upstream.
#[derive(Clone)]
pub struct UpstreamProxy {
    client: Client<HttpConnector, Body>,
    authority: Authority,
    timeout: Duration,
}

impl UpstreamProxy {
    pub fn new(upstream: &UpstreamConfig, timeouts: &TimeoutConfig) -> Result<Self, ProxyError> {
        let authority = Authority::from_str(&upstream.address)
            .map_err(|_| ProxyError::Authority(upstream.address.clone()))?;
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());

        Ok(Self {
            client,
            authority,
            timeout: Duration::from_secs(timeouts.upstream_secs),
        })
    }

    pub fn authority(&self) -> &Authority {
        &self.authority
    }

    /// Point the request at the upstream, keeping path and query.
    pub fn rewrite_uri(&self, uri: &Uri) -> Result<Uri, ProxyError> {
        let mut parts = uri.clone().into_parts();
        parts.scheme = Some(Scheme::HTTP);
        parts.authority = Some(self.authority.clone());
        if parts.path_and_query.is_none() {
            parts.path_and_query = Some(axum::http::uri::PathAndQuery::from_static("/"));
        }
        Ok(Uri::from_parts(parts)?)
    }

    pub async fn send(&self, request: Request<Body>) -> Result<Response<Body>, ProxyError> {
        let (mut parts, body) = request.into_parts();
        parts.uri = self.rewrite_uri(&parts.uri)?;

        tracing::debug!(
            method = %parts.method,
            uri = %parts.uri,
            "Forwarding to upstream"
        );

        let request = Request::from_parts(parts, body);
        let response = tokio::time::timeout(self.timeout, self.client.request(request))
            .await
            .map_err(|_| ProxyError::Timeout(self.timeout))??;

        let (parts, body) = response.into_parts();
        Ok(Response::from_parts(parts, Body::new(body)))
    }
}

impl PassThrough for UpstreamProxy {
    fn forward(&self, request: Request<Body>) -> BoxFuture<'static, Result<Response<Body>, BoxError>> {
        let proxy = self.clone();
        async move { proxy.send(request).await.map_err(BoxError::from) }.boxed()
    }
}
