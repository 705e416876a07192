pub mod access_token;
pub mod albums;
pub mod builder;
pub mod client;
pub mod media_items;
pub mod model;
pub mod options;
pub mod shared_albums;
pub mod transport;
pub mod types;
pub mod uploader;

use std::num::NonZeroUsize;

/// Default location of the Photos Library API.
pub const API_BASE_URL: &str = "https://photoslibrary.googleapis.com";

/// Page size requested when the caller does not set one.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Server-side limit on ids per batch request.
pub const MAX_BATCH_IDS: NonZeroUsize = NonZeroUsize::new(50).unwrap();

mod headers {
    pub const UPLOAD_PROTOCOL: &str = "X-Goog-Upload-Protocol";
    pub const UPLOAD_FILE_NAME: &str = "X-Goog-Upload-File-Name";
    pub const UPLOAD_CONTENT_TYPE: &str = "X-Goog-Upload-Content-Type";
}

/// Reject id lists longer than [`MAX_BATCH_IDS`] before any request is made.
pub(crate) fn check_batch_size(ids: &[String]) -> Result<(), types::ApiError> {
    if ids.len() > MAX_BATCH_IDS.get() {
        return Err(types::ApiError::TooManyIds {
            count: ids.len(),
            max: MAX_BATCH_IDS.get(),
        });
    }
    Ok(())
}
