//! HTTP primitive backed by reqwest.

use reqwest::{Client, Method, Request, Response};
use thiserror::Error;
use tower::service_fn;
use tower::util::BoxCloneSyncService;
use url::Url;

use crate::config::ClientConfig;
use crate::intercept::BoxPrimitive;

/// Errors raised while preparing HTTP calls.
#[derive(Debug, Error)]
pub enum HttpError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("unsupported URL scheme '{0}' (expected http or https)")]
    UnsupportedScheme(String),
}

/// Build the client used by [`primitive`].
pub fn build_client(config: &ClientConfig) -> Result<Client, HttpError> {
    Client::builder()
        .timeout(config.timeout())
        .user_agent(config.user_agent.as_str())
        .build()
        .map_err(HttpError::Client)
}

/// Wrap `client` as a slot primitive.
pub fn primitive(client: Client) -> BoxPrimitive<Request, Response, reqwest::Error> {
    BoxCloneSyncService::new(service_fn(move |request: Request| {
        let client = client.clone();
        async move { client.execute(request).await }
    }))
}

/// Parse `raw` into a GET request.
pub fn get_request(raw: &str) -> Result<Request, HttpError> {
    let url = Url::parse(raw).map_err(|source| HttpError::InvalidUrl {
        url: raw.to_string(),
        source,
    })?;

    match url.scheme() {
        "http" | "https" => Ok(Request::new(Method::GET, url)),
        other => Err(HttpError::UnsupportedScheme(other.to_string())),
    }
}
