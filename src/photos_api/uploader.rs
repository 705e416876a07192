use std::path::Path;

use reqwest::{
    Body,
    header::{CONTENT_LENGTH, HeaderMap, HeaderValue},
};
use tokio_util::{io::ReaderStream, sync::CancellationToken};

use crate::photos_api::{headers, transport::HttpTransport, types::ApiError};

const UPLOADS_PATH: &str = "v1/uploads";

/// Uploads raw media bytes and hands back upload tokens for `batch_create`.
#[derive(Clone, Debug)]
pub struct MediaUploader {
    transport: HttpTransport,
}

impl MediaUploader {
    pub fn new(transport: HttpTransport) -> Self {
        Self { transport }
    }

    /// Upload the file at `path` and return its upload token.
    ///
    /// The file is streamed from disk. Without an explicit `content_type` the MIME type
    /// is guessed from the file extension, falling back to `application/octet-stream`.
    pub async fn upload_file(
        &self,
        path: &Path,
        content_type: Option<&str>,
        cancellation_token: &CancellationToken,
    ) -> Result<String, ApiError> {
        let io_error = |io_error| ApiError::Io {
            path: path.display().to_string(),
            io_error,
        };
        let file = tokio::fs::File::open(path).await.map_err(io_error)?;
        let length = file.metadata().await.map_err(io_error)?.len();
        let file_name = Self::file_name(path);
        let content_type = content_type.unwrap_or_else(|| Self::content_type(path));
        log::debug!("Uploading '{file_name}' as {content_type} ({length} bytes)");

        let mut upload_headers = HeaderMap::new();
        upload_headers.insert(headers::UPLOAD_PROTOCOL, HeaderValue::from_static("raw"));
        upload_headers.insert(headers::UPLOAD_FILE_NAME, HeaderValue::from_str(&file_name)?);
        upload_headers.insert(
            headers::UPLOAD_CONTENT_TYPE,
            HeaderValue::from_str(content_type)?,
        );
        upload_headers.insert(CONTENT_LENGTH, HeaderValue::from(length));

        let body = Body::wrap_stream(ReaderStream::new(file));
        let upload_token = self
            .transport
            .post_body(UPLOADS_PATH, upload_headers, body, cancellation_token)
            .await?;
        Ok(upload_token.trim().to_owned())
    }

    pub(crate) fn file_name(path: &Path) -> String {
        path.file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    fn content_type(path: &Path) -> &'static str {
        mime_guess::from_path(path)
            .first_raw()
            .unwrap_or("application/octet-stream")
    }
}
