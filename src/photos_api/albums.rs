use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use serde::{Deserialize, Serialize, de::IgnoredAny};
use tokio_util::sync::CancellationToken;

use crate::{
    photos_api::{
        MAX_BATCH_IDS, check_batch_size,
        model::{Album, ShareInfo, SharedAlbumOptions},
        options::{ListAlbumsOptions, resolve, update_mask},
        transport::HttpTransport,
        types::ApiError,
    },
    stream::{Cursor, ItemStream, Page, batch, collect, paginate},
};

const ALBUMS_PATH: &str = "v1/albums";

/// Where a new media item or enrichment is placed in an album.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumPosition {
    pub position: PositionType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relative_media_item_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relative_enrichment_item_id: Option<String>,
}

impl AlbumPosition {
    pub fn first() -> Self {
        Self {
            position: PositionType::FirstInAlbum,
            ..Self::default()
        }
    }

    pub fn last() -> Self {
        Self {
            position: PositionType::LastInAlbum,
            ..Self::default()
        }
    }

    pub fn after_media_item(id: impl Into<String>) -> Self {
        Self {
            position: PositionType::AfterMediaItem,
            relative_media_item_id: Some(id.into()),
            ..Self::default()
        }
    }

    pub fn after_enrichment_item(id: impl Into<String>) -> Self {
        Self {
            position: PositionType::AfterEnrichmentItem,
            relative_enrichment_item_id: Some(id.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PositionType {
    #[default]
    PositionTypeUnspecified,
    FirstInAlbum,
    LastInAlbum,
    AfterMediaItem,
    AfterEnrichmentItem,
}

/// Album fields that can be named in a patch update mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AlbumField {
    Title,
    CoverPhotoMediaItemId,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatLng {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub location_name: String,
    pub lat_lng: LatLng,
}

/// Enrichment to add to an album; exactly one kind per item.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NewEnrichmentItem {
    TextEnrichment { text: String },
    LocationEnrichment { location: Location },
    MapEnrichment { origin: Location, destination: Location },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EnrichmentItem {
    pub id: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ListAlbumsResponse {
    albums: Vec<Album>,
    next_page_token: String,
}

#[derive(Debug, Serialize)]
struct CreateAlbumRequest<'a> {
    album: &'a Album,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ShareAlbumRequest {
    shared_album_options: SharedAlbumOptions,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ShareAlbumResponse {
    share_info: ShareInfo,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AddEnrichmentRequest<'a> {
    new_enrichment_item: &'a NewEnrichmentItem,
    album_position: &'a AlbumPosition,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddEnrichmentResponse {
    enrichment_item: EnrichmentItem,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MediaItemIdsRequest<'a> {
    media_item_ids: &'a [String],
}

/// Operations on the user's albums.
#[derive(Clone, Debug)]
pub struct AlbumsService {
    transport: HttpTransport,
}

impl AlbumsService {
    pub fn new(transport: HttpTransport) -> Self {
        Self { transport }
    }

    /// Fetch one page of albums.
    pub async fn list(
        &self,
        options: Option<&ListAlbumsOptions>,
        cursor: &Cursor,
        cancellation_token: &CancellationToken,
    ) -> Result<Page<Album>, ApiError> {
        Self::list_page(&self.transport, &resolve(options), cursor, cancellation_token).await
    }

    /// Stream every album, following page tokens until the last page.
    pub fn list_stream(
        &self,
        options: Option<&ListAlbumsOptions>,
        cancellation_token: CancellationToken,
    ) -> ItemStream<Album> {
        let transport = self.transport.clone();
        let options = resolve(options);
        let token = cancellation_token.clone();
        paginate(
            move |cursor: Cursor| {
                let transport = transport.clone();
                let options = options.clone();
                let token = token.clone();
                async move { Self::list_page(&transport, &options, &cursor, &token).await }
            },
            cancellation_token,
        )
    }

    /// Fetch every album, or fail with the first error.
    pub async fn list_all(
        &self,
        options: Option<&ListAlbumsOptions>,
        cancellation_token: CancellationToken,
    ) -> Result<Vec<Album>, ApiError> {
        collect(self.list_stream(options, cancellation_token)).await
    }

    async fn list_page(
        transport: &HttpTransport,
        options: &ListAlbumsOptions,
        cursor: &Cursor,
        cancellation_token: &CancellationToken,
    ) -> Result<Page<Album>, ApiError> {
        let response: ListAlbumsResponse = transport
            .get_page(ALBUMS_PATH, options, cursor, cancellation_token)
            .await?;
        Ok(Page::new(response.albums, response.next_page_token))
    }

    pub async fn get(
        &self,
        album_id: &str,
        cancellation_token: &CancellationToken,
    ) -> Result<Album, ApiError> {
        self.transport
            .get(&format!("{ALBUMS_PATH}/{album_id}"), &(), cancellation_token)
            .await
    }

    pub async fn create(
        &self,
        title: &str,
        cancellation_token: &CancellationToken,
    ) -> Result<Album, ApiError> {
        let album = Album {
            title: title.to_owned(),
            ..Album::default()
        };
        log::debug!("Creating album '{title}'");
        self.transport
            .post(ALBUMS_PATH, &CreateAlbumRequest { album: &album }, cancellation_token)
            .await
    }

    /// Update the fields of `album` named in `fields`. An empty mask sends no `updateMask`.
    pub async fn patch(
        &self,
        album: &Album,
        fields: &[AlbumField],
        cancellation_token: &CancellationToken,
    ) -> Result<Album, ApiError> {
        let mut query = Vec::new();
        if !fields.is_empty() {
            query.push(("updateMask", update_mask(fields)));
        }
        self.transport
            .patch(
                &format!("{ALBUMS_PATH}/{}", album.id),
                &query,
                album,
                cancellation_token,
            )
            .await
    }

    pub async fn share(
        &self,
        album_id: &str,
        options: SharedAlbumOptions,
        cancellation_token: &CancellationToken,
    ) -> Result<ShareInfo, ApiError> {
        let response: ShareAlbumResponse = self
            .transport
            .post(
                &format!("{ALBUMS_PATH}/{album_id}:share"),
                &ShareAlbumRequest {
                    shared_album_options: options,
                },
                cancellation_token,
            )
            .await?;
        Ok(response.share_info)
    }

    pub async fn unshare(
        &self,
        album_id: &str,
        cancellation_token: &CancellationToken,
    ) -> Result<(), ApiError> {
        let _: IgnoredAny = self
            .transport
            .post(
                &format!("{ALBUMS_PATH}/{album_id}:unshare"),
                &serde_json::json!({}),
                cancellation_token,
            )
            .await?;
        Ok(())
    }

    pub async fn add_enrichment(
        &self,
        album_id: &str,
        enrichment: &NewEnrichmentItem,
        position: &AlbumPosition,
        cancellation_token: &CancellationToken,
    ) -> Result<EnrichmentItem, ApiError> {
        let request = AddEnrichmentRequest {
            new_enrichment_item: enrichment,
            album_position: position,
        };
        let response: AddEnrichmentResponse = self
            .transport
            .post(
                &format!("{ALBUMS_PATH}/{album_id}:addEnrichment"),
                &request,
                cancellation_token,
            )
            .await?;
        Ok(response.enrichment_item)
    }

    /// Add up to [`MAX_BATCH_IDS`] media items to an album.
    pub async fn batch_add_media_items(
        &self,
        album_id: &str,
        media_item_ids: &[String],
        cancellation_token: &CancellationToken,
    ) -> Result<(), ApiError> {
        Self::post_media_item_ids(
            &self.transport,
            &format!("{ALBUMS_PATH}/{album_id}:batchAddMediaItems"),
            media_item_ids,
            cancellation_token,
        )
        .await
    }

    /// Remove up to [`MAX_BATCH_IDS`] media items from an album.
    pub async fn batch_remove_media_items(
        &self,
        album_id: &str,
        media_item_ids: &[String],
        cancellation_token: &CancellationToken,
    ) -> Result<(), ApiError> {
        Self::post_media_item_ids(
            &self.transport,
            &format!("{ALBUMS_PATH}/{album_id}:batchRemoveMediaItems"),
            media_item_ids,
            cancellation_token,
        )
        .await
    }

    /// Add any number of media items, one request per chunk of [`MAX_BATCH_IDS`].
    ///
    /// Stops at the first failed chunk; chunks before it stay applied.
    pub async fn batch_add_media_items_all(
        &self,
        album_id: &str,
        media_item_ids: Vec<String>,
        cancellation_token: CancellationToken,
    ) -> Result<(), ApiError> {
        let path = format!("{ALBUMS_PATH}/{album_id}:batchAddMediaItems");
        self.post_media_item_ids_chunked(path, media_item_ids, cancellation_token)
            .await
    }

    /// Remove any number of media items, one request per chunk of [`MAX_BATCH_IDS`].
    ///
    /// Stops at the first failed chunk; chunks before it stay applied.
    pub async fn batch_remove_media_items_all(
        &self,
        album_id: &str,
        media_item_ids: Vec<String>,
        cancellation_token: CancellationToken,
    ) -> Result<(), ApiError> {
        let path = format!("{ALBUMS_PATH}/{album_id}:batchRemoveMediaItems");
        self.post_media_item_ids_chunked(path, media_item_ids, cancellation_token)
            .await
    }

    async fn post_media_item_ids_chunked(
        &self,
        path: String,
        media_item_ids: Vec<String>,
        cancellation_token: CancellationToken,
    ) -> Result<(), ApiError> {
        let chunk_count = media_item_ids.len().div_ceil(MAX_BATCH_IDS.get());
        let applied = Arc::new(AtomicUsize::new(0));
        let transport = self.transport.clone();
        let token = cancellation_token.clone();
        let applied_by_fetcher = Arc::clone(&applied);
        let stream = batch(
            media_item_ids,
            MAX_BATCH_IDS,
            move |chunk: Vec<String>| {
                let transport = transport.clone();
                let path = path.clone();
                let token = token.clone();
                let applied = Arc::clone(&applied_by_fetcher);
                async move {
                    Self::post_media_item_ids(&transport, &path, &chunk, &token).await?;
                    applied.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, ApiError>(Vec::<()>::new())
                }
            },
            cancellation_token,
        );
        stream.collect_all().await?;
        let applied = applied.load(Ordering::SeqCst);
        if applied < chunk_count {
            log::info!("Stopped after {applied} of {chunk_count} chunks.");
            return Err(ApiError::Cancelled);
        }
        Ok(())
    }

    async fn post_media_item_ids(
        transport: &HttpTransport,
        path: &str,
        media_item_ids: &[String],
        cancellation_token: &CancellationToken,
    ) -> Result<(), ApiError> {
        check_batch_size(media_item_ids)?;
        let _: IgnoredAny = transport
            .post(path, &MediaItemIdsRequest { media_item_ids }, cancellation_token)
            .await?;
        Ok(())
    }
}
