use crate::photos_api::{
    albums::AlbumsService, media_items::MediaItemsService, shared_albums::SharedAlbumsService,
    transport::HttpTransport, uploader::MediaUploader,
};

/// Entry point to the Photos Library API. Create one with
/// [`PhotosClientBuilder`](crate::photos_api::builder::PhotosClientBuilder).
///
/// All services share one transport and its connection pool.
#[derive(Clone, Debug)]
pub struct PhotosClient {
    transport: HttpTransport,
    albums: AlbumsService,
    media_items: MediaItemsService,
    shared_albums: SharedAlbumsService,
    uploader: MediaUploader,
}

impl PhotosClient {
    pub fn new(transport: HttpTransport) -> Self {
        let uploader = MediaUploader::new(transport.clone());
        Self {
            albums: AlbumsService::new(transport.clone()),
            media_items: MediaItemsService::new(transport.clone(), uploader.clone()),
            shared_albums: SharedAlbumsService::new(transport.clone()),
            uploader,
            transport,
        }
    }

    pub fn albums(&self) -> &AlbumsService {
        &self.albums
    }

    pub fn media_items(&self) -> &MediaItemsService {
        &self.media_items
    }

    pub fn shared_albums(&self) -> &SharedAlbumsService {
        &self.shared_albums
    }

    pub fn uploader(&self) -> &MediaUploader {
        &self.uploader
    }

    pub fn base_url(&self) -> &str {
        self.transport.base_url()
    }
}
