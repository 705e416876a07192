use reqwest::{Body, Method, RequestBuilder, StatusCode, header::HeaderMap};
use serde::{Serialize, de::DeserializeOwned};
use tokio_util::sync::CancellationToken;

use crate::{
    photos_api::types::{ApiError, ErrorEnvelope},
    stream::Cursor,
};

/// Sends requests relative to a base URL and decodes JSON responses.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        log::debug!("Creating transport with base URL '{base_url}'");
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// GET `path` with `query` and decode the response.
    pub async fn get<Q, R>(
        &self,
        path: &str,
        query: &Q,
        cancellation_token: &CancellationToken,
    ) -> Result<R, ApiError>
    where
        Q: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let request = self.client.get(self.url(path)).query(query);
        self.fetch_json(request, cancellation_token).await
    }

    /// GET one page: like [`Self::get`] with `pageToken` appended unless the cursor is the start.
    pub async fn get_page<Q, R>(
        &self,
        path: &str,
        query: &Q,
        cursor: &Cursor,
        cancellation_token: &CancellationToken,
    ) -> Result<R, ApiError>
    where
        Q: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let mut request = self.client.get(self.url(path)).query(query);
        if !cursor.is_end() {
            request = request.query(&[("pageToken", cursor.as_str())]);
        }
        self.fetch_json(request, cancellation_token).await
    }

    /// POST `body` as JSON to `path` and decode the response.
    pub async fn post<B, R>(
        &self,
        path: &str,
        body: &B,
        cancellation_token: &CancellationToken,
    ) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let request = self.client.post(self.url(path)).json(body);
        self.fetch_json(request, cancellation_token).await
    }

    /// PATCH `body` as JSON to `path` with `query` and decode the response.
    pub async fn patch<Q, B, R>(
        &self,
        path: &str,
        query: &Q,
        body: &B,
        cancellation_token: &CancellationToken,
    ) -> Result<R, ApiError>
    where
        Q: Serialize + ?Sized,
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let request = self
            .client
            .request(Method::PATCH, self.url(path))
            .query(query)
            .json(body);
        self.fetch_json(request, cancellation_token).await
    }

    /// POST a raw body to `path` and return the response body as text.
    pub async fn post_body(
        &self,
        path: &str,
        headers: HeaderMap,
        body: Body,
        cancellation_token: &CancellationToken,
    ) -> Result<String, ApiError> {
        let request = self
            .client
            .post(self.url(path))
            .headers(headers)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(body);
        self.fetch_text(request, cancellation_token).await
    }

    async fn fetch_json<R: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        cancellation_token: &CancellationToken,
    ) -> Result<R, ApiError> {
        let text = self.fetch_text(request, cancellation_token).await?;
        // Empty-bodied successes decode like `{}`.
        let text = if text.trim().is_empty() { "{}" } else { &text };
        serde_json::from_str(text).map_err(ApiError::from)
    }

    async fn fetch_text(
        &self,
        request: RequestBuilder,
        cancellation_token: &CancellationToken,
    ) -> Result<String, ApiError> {
        let request = request.build()?;

        log::trace!("Sending request: {:?}", request);

        tokio::select! {
            _ = cancellation_token.cancelled() => {
                log::info!("Cancellation requested, aborting request.");
                Err(ApiError::Cancelled)
            }
            request_result = self.client.execute(request) => {
                let response = request_result?;
                log::trace!("Received response: {:?}", response);
                Self::read_response(response).await
            }
        }
    }

    async fn read_response(response: reqwest::Response) -> Result<String, ApiError> {
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound);
        }
        let text = response.text().await?;
        if status.is_client_error() || status.is_server_error() {
            return Err(Self::decode_error(status, text));
        }
        Ok(text)
    }

    fn decode_error(status: StatusCode, body: String) -> ApiError {
        match serde_json::from_str::<ErrorEnvelope>(&body) {
            Ok(envelope) => ApiError::Api(envelope.error),
            Err(e) => {
                log::debug!("Error response with status {status} is not an error envelope: {e}");
                ApiError::UnexpectedStatus { status, body }
            }
        }
    }
}
