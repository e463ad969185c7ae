//! Request primitive shared by the platform clients.

use crate::{provision::ClientError, APP_USER_AGENT};
use reqwest::{
    header::{ACCEPT, CONTENT_TYPE},
    Client, Method, RequestBuilder,
};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, Instrument, Span};
use url::{ParseError, Url};

pub(crate) fn client() -> Result<Client, ClientError> {
    Ok(Client::builder().user_agent(APP_USER_AGENT).build()?)
}

/// Append `segments` to the path of `base`, percent-encoding each one so ids
/// returned by a platform cannot alter the endpoint.
pub(crate) fn endpoint_url(base: &str, segments: &[&str]) -> Result<Url, ClientError> {
    let mut url = Url::parse(base)?;

    url.path_segments_mut()
        .map_err(|()| ClientError::Url(ParseError::RelativeUrlWithCannotBeABaseBase))?
        .pop_if_empty()
        .extend(segments);

    debug!("endpoint URL: {}", url);

    Ok(url)
}

/// Build an authenticated JSON request.
pub(crate) fn request(
    client: &Client,
    method: Method,
    url: Url,
    token: &SecretString,
    body: Option<&Value>,
) -> RequestBuilder {
    let request = client
        .request(method, url)
        .bearer_auth(token.expose_secret())
        .header(ACCEPT, "application/json")
        .header(CONTENT_TYPE, "application/json");

    match body {
        Some(body) => request.json(body),
        None => request,
    }
}

/// Send `request` inside `span` and decode a 2xx JSON body.
///
/// Any other status is returned as `ClientError::Status` with the raw body text.
pub(crate) async fn send<T: DeserializeOwned>(
    request: RequestBuilder,
    span: Span,
) -> Result<T, ClientError> {
    let response = request.send().instrument(span).await?;

    if !response.status().is_success() {
        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => {
                debug!("Failed to read {} response body: {}", status, err);
                String::new()
            }
        };

        return Err(ClientError::Status { status, body });
    }

    Ok(response.json::<T>().await?)
}
