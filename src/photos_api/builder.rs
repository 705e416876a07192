use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};

use crate::photos_api::{
    API_BASE_URL, access_token::AccessToken, client::PhotosClient, transport::HttpTransport,
};

/// Settings that do not depend on the caller's credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: API_BASE_URL.to_owned(),
        }
    }
}

/// Builds a [`PhotosClient`] that authenticates every request with one access token.
pub struct PhotosClientBuilder {
    access_token: AccessToken,
    config: ClientConfig,
    http_client: Option<reqwest::Client>,
}

impl PhotosClientBuilder {
    pub fn new(access_token: AccessToken) -> Self {
        Self {
            access_token,
            config: ClientConfig::default(),
            http_client: None,
        }
    }

    /// Send requests somewhere other than the public API, e.g. a local mock server.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    pub fn with_config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Use a preconfigured client. It is expected to send the `Authorization` header itself.
    pub fn with_http_client(mut self, http_client: reqwest::Client) -> Self {
        self.http_client = Some(http_client);
        self
    }

    pub fn build(self) -> Result<PhotosClient, ClientBuildError> {
        let base_url = self.config.base_url;
        reqwest::Url::parse(&base_url).map_err(|e| ClientBuildError::InvalidBaseUrl {
            url: base_url.clone(),
            reason: e.to_string(),
        })?;

        let http_client = match self.http_client {
            Some(http_client) => http_client,
            None => {
                let mut headers = HeaderMap::new();
                let mut authorization = HeaderValue::from_str(&self.access_token.bearer())
                    .map_err(|_| ClientBuildError::InvalidAccessToken)?;
                authorization.set_sensitive(true);
                headers.insert(AUTHORIZATION, authorization);
                log::debug!("Default http headers: {:?}", headers);
                reqwest::Client::builder().default_headers(headers).build()?
            }
        };

        log::info!("Using Photos Library API at {base_url}");
        Ok(PhotosClient::new(HttpTransport::new(http_client, base_url)))
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ClientBuildError {
    #[error("Access token is not a valid header value")]
    InvalidAccessToken,
    #[error("Could not create http client")]
    Http(#[from] reqwest::Error),
    #[error("Invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
