//! HTTP client construction for gateway requests.

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder};

use crate::client::ClientError;
use crate::options::{HttpTransport, TransportOptions};

/// Build a configured HTTP client from transport options.
///
/// An unparsable proxy URL is a configuration error rather than being
/// silently skipped.
pub fn build_http_client(
    transport_options: &TransportOptions<HttpTransport>,
) -> Result<Client, ClientError> {
    let mut builder = Client::builder();

    if let Some(timeout) = transport_options.timeout {
        builder = builder.timeout(timeout);
    }

    if let Some(proxy_url) = &transport_options.provider.proxy {
        let proxy = reqwest::Proxy::all(proxy_url)
            .map_err(|e| ClientError::Config(format!("invalid proxy URL {}: {}", proxy_url, e)))?;
        builder = builder.proxy(proxy);
    }

    Ok(builder.build()?)
}

/// Start an authenticated POST that expects an event-stream reply.
///
/// Adds the bearer token, JSON content type and any extra headers.
pub fn event_stream_post(
    client: &Client,
    url: &str,
    transport: &HttpTransport,
) -> Result<RequestBuilder, ClientError> {
    let api_key = transport
        .api_key
        .as_ref()
        .ok_or_else(|| ClientError::Config("API key is required".to_string()))?;

    let mut request = client
        .post(url)
        .header(AUTHORIZATION, format!("Bearer {}", api_key.expose_secret()))
        .header(CONTENT_TYPE, "application/json")
        .header(ACCEPT, "text/event-stream");

    if let Some(headers) = &transport.extra_headers {
        for (key, value) in headers {
            request = request.header(key, value);
        }
    }

    Ok(request)
}
