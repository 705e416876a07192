use std::path::Path;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::{
    photos_api::{
        DEFAULT_PAGE_SIZE, MAX_BATCH_IDS,
        albums::AlbumPosition,
        check_batch_size,
        model::{MediaItem, MediaItemResult, NewMediaItemResult},
        options::{ListMediaItemsOptions, RequestOptions, WithPageToken, resolve, update_mask},
        transport::HttpTransport,
        types::ApiError,
        uploader::MediaUploader,
    },
    stream::{Cursor, ItemStream, Page, batch, collect, paginate},
};

const MEDIA_ITEMS_PATH: &str = "v1/mediaItems";

/// Body options for searching media items.
///
/// Without `album_id` or `filters` the search returns the whole library.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<SearchFilters>,
}

impl RequestOptions for SearchOptions {
    fn defaults() -> Self {
        Self {
            page_size: Some(DEFAULT_PAGE_SIZE),
            ..Self::default()
        }
    }

    fn overlay(self, caller: &Self) -> Self {
        Self {
            page_size: caller.page_size.or(self.page_size),
            album_id: caller.album_id.clone().or(self.album_id),
            filters: caller.filters.clone().or(self.filters),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_filter: Option<DateFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_filter: Option<ContentFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_type_filter: Option<MediaTypeFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature_filter: Option<FeatureFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_archived_media: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_non_app_created_data: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DateFilter {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dates: Vec<Date>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ranges: Vec<DateRange>,
}

/// A calendar date; a zero component matches any value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Date {
    pub year: u32,
    pub month: u32,
    pub day: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start_date: Date,
    pub end_date: Date,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentFilter {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub included_content_categories: Vec<ContentCategory>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub excluded_content_categories: Vec<ContentCategory>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaTypeFilter {
    pub media_types: Vec<MediaType>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureFilter {
    pub included_features: Vec<Feature>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContentCategory {
    Animals,
    Arts,
    Birthdays,
    Cityscapes,
    Crafts,
    Documents,
    Fashion,
    Flowers,
    Food,
    Gardens,
    Holidays,
    Houses,
    Landmarks,
    Landscapes,
    Night,
    People,
    Performances,
    Pets,
    Receipts,
    Screenshots,
    Selfies,
    Sport,
    Travel,
    Utility,
    Weddings,
    Whiteboards,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MediaType {
    AllMedia,
    Photo,
    Video,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Feature {
    None,
    Favorites,
}

/// Media item fields that can be named in a patch update mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MediaItemField {
    Description,
}

/// Request for creating media items from upload tokens.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchCreateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album_id: Option<String>,
    pub new_media_items: Vec<NewMediaItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album_position: Option<AlbumPosition>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMediaItem {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub simple_media_item: SimpleMediaItem,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleMediaItem {
    pub upload_token: String,
    pub file_name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct MediaItemsResponse {
    media_items: Vec<MediaItem>,
    next_page_token: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct BatchGetResponse {
    media_item_results: Vec<MediaItemResult>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct BatchCreateResponse {
    new_media_item_results: Vec<NewMediaItemResult>,
}

/// Operations on the user's media items.
#[derive(Clone, Debug)]
pub struct MediaItemsService {
    transport: HttpTransport,
    uploader: MediaUploader,
}

impl MediaItemsService {
    pub fn new(transport: HttpTransport, uploader: MediaUploader) -> Self {
        Self {
            transport,
            uploader,
        }
    }

    pub async fn get(
        &self,
        media_item_id: &str,
        cancellation_token: &CancellationToken,
    ) -> Result<MediaItem, ApiError> {
        self.transport
            .get(
                &format!("{MEDIA_ITEMS_PATH}/{media_item_id}"),
                &(),
                cancellation_token,
            )
            .await
    }

    /// Fetch one page of the library.
    pub async fn list(
        &self,
        options: Option<&ListMediaItemsOptions>,
        cursor: &Cursor,
        cancellation_token: &CancellationToken,
    ) -> Result<Page<MediaItem>, ApiError> {
        Self::list_page(&self.transport, &resolve(options), cursor, cancellation_token).await
    }

    /// Stream the whole library page by page.
    pub fn list_stream(
        &self,
        options: Option<&ListMediaItemsOptions>,
        cancellation_token: CancellationToken,
    ) -> ItemStream<MediaItem> {
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

    pub async fn list_all(
        &self,
        options: Option<&ListMediaItemsOptions>,
        cancellation_token: CancellationToken,
    ) -> Result<Vec<MediaItem>, ApiError> {
        collect(self.list_stream(options, cancellation_token)).await
    }

    async fn list_page(
        transport: &HttpTransport,
        options: &ListMediaItemsOptions,
        cursor: &Cursor,
        cancellation_token: &CancellationToken,
    ) -> Result<Page<MediaItem>, ApiError> {
        let response: MediaItemsResponse = transport
            .get_page(MEDIA_ITEMS_PATH, options, cursor, cancellation_token)
            .await?;
        Ok(Page::new(response.media_items, response.next_page_token))
    }

    /// Fetch one page of search results.
    pub async fn search(
        &self,
        options: Option<&SearchOptions>,
        cursor: &Cursor,
        cancellation_token: &CancellationToken,
    ) -> Result<Page<MediaItem>, ApiError> {
        Self::search_page(&self.transport, &resolve(options), cursor, cancellation_token).await
    }

    /// Stream every search result page by page.
    pub fn search_stream(
        &self,
        options: Option<&SearchOptions>,
        cancellation_token: CancellationToken,
    ) -> ItemStream<MediaItem> {
        let transport = self.transport.clone();
        let options = resolve(options);
        let token = cancellation_token.clone();
        paginate(
            move |cursor: Cursor| {
                let transport = transport.clone();
                let options = options.clone();
                let token = token.clone();
                async move { Self::search_page(&transport, &options, &cursor, &token).await }
            },
            cancellation_token,
        )
    }

    pub async fn search_all(
        &self,
        options: Option<&SearchOptions>,
        cancellation_token: CancellationToken,
    ) -> Result<Vec<MediaItem>, ApiError> {
        collect(self.search_stream(options, cancellation_token)).await
    }

    async fn search_page(
        transport: &HttpTransport,
        options: &SearchOptions,
        cursor: &Cursor,
        cancellation_token: &CancellationToken,
    ) -> Result<Page<MediaItem>, ApiError> {
        let body = WithPageToken {
            options,
            page_token: cursor.as_str(),
        };
        let response: MediaItemsResponse = transport
            .post(
                &format!("{MEDIA_ITEMS_PATH}:search"),
                &body,
                cancellation_token,
            )
            .await?;
        Ok(Page::new(response.media_items, response.next_page_token))
    }

    /// Fetch up to [`MAX_BATCH_IDS`] media items by id.
    ///
    /// Ids the server cannot resolve come back as entries carrying a status instead of an item.
    pub async fn batch_get(
        &self,
        media_item_ids: &[String],
        cancellation_token: &CancellationToken,
    ) -> Result<Vec<MediaItemResult>, ApiError> {
        Self::batch_get_chunk(&self.transport, media_item_ids, cancellation_token).await
    }

    /// Stream the results for any number of ids, one request per chunk of [`MAX_BATCH_IDS`].
    pub fn batch_get_stream(
        &self,
        media_item_ids: Vec<String>,
        cancellation_token: CancellationToken,
    ) -> ItemStream<MediaItemResult> {
        let transport = self.transport.clone();
        let token = cancellation_token.clone();
        batch(
            media_item_ids,
            MAX_BATCH_IDS,
            move |chunk: Vec<String>| {
                let transport = transport.clone();
                let token = token.clone();
                async move { Self::batch_get_chunk(&transport, &chunk, &token).await }
            },
            cancellation_token,
        )
    }

    pub async fn batch_get_all(
        &self,
        media_item_ids: Vec<String>,
        cancellation_token: CancellationToken,
    ) -> Result<Vec<MediaItemResult>, ApiError> {
        collect(self.batch_get_stream(media_item_ids, cancellation_token)).await
    }

    async fn batch_get_chunk(
        transport: &HttpTransport,
        media_item_ids: &[String],
        cancellation_token: &CancellationToken,
    ) -> Result<Vec<MediaItemResult>, ApiError> {
        check_batch_size(media_item_ids)?;
        let query: Vec<(&str, &str)> = media_item_ids
            .iter()
            .map(|id| ("mediaItemIds", id.as_str()))
            .collect();
        let response: BatchGetResponse = transport
            .get(
                &format!("{MEDIA_ITEMS_PATH}:batchGet"),
                &query,
                cancellation_token,
            )
            .await?;
        Ok(response.media_item_results)
    }

    /// Update the fields of `media_item` named in `fields`.
    pub async fn patch(
        &self,
        media_item: &MediaItem,
        fields: &[MediaItemField],
        cancellation_token: &CancellationToken,
    ) -> Result<MediaItem, ApiError> {
        let mut query = Vec::new();
        if !fields.is_empty() {
            query.push(("updateMask", update_mask(fields)));
        }
        self.transport
            .patch(
                &format!("{MEDIA_ITEMS_PATH}/{}", media_item.id),
                &query,
                media_item,
                cancellation_token,
            )
            .await
    }

    /// Create media items from previously uploaded bytes.
    pub async fn batch_create(
        &self,
        request: &BatchCreateRequest,
        cancellation_token: &CancellationToken,
    ) -> Result<Vec<NewMediaItemResult>, ApiError> {
        let response: BatchCreateResponse = self
            .transport
            .post(
                &format!("{MEDIA_ITEMS_PATH}:batchCreate"),
                request,
                cancellation_token,
            )
            .await?;
        Ok(response.new_media_item_results)
    }

    /// Upload every file, then create one media item per upload.
    ///
    /// Uploads run one after another, each typed by its file extension; the first failed upload aborts before anything is created.
    pub async fn batch_create_from_files<P: AsRef<Path>>(
        &self,
        album_id: Option<&str>,
        paths: &[P],
        position: Option<AlbumPosition>,
        cancellation_token: &CancellationToken,
    ) -> Result<Vec<NewMediaItemResult>, ApiError> {
        let mut new_media_items = Vec::with_capacity(paths.len());
        for path in paths {
            let path = path.as_ref();
            let upload_token = self
                .uploader
                .upload_file(path, None, cancellation_token)
                .await?;
            new_media_items.push(NewMediaItem {
                description: String::new(),
                simple_media_item: SimpleMediaItem {
                    upload_token,
                    file_name: MediaUploader::file_name(path),
                },
            });
        }
        let request = BatchCreateRequest {
            album_id: album_id.map(str::to_owned),
            new_media_items,
            album_position: position,
        };
        self.batch_create(&request, cancellation_token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use wiremock::{
        Mock, MockServer, Request, ResponseTemplate,
        matchers::{body_json, header, method, path, query_param, query_param_is_missing},
    };

    fn service(server: &MockServer) -> MediaItemsService {
        let transport = HttpTransport::new(reqwest::Client::new(), server.uri());
        MediaItemsService::new(transport.clone(), MediaUploader::new(transport))
    }

    fn item_json(id: &str) -> serde_json::Value {
        serde_json::json!({"id": id, "mimeType": "image/jpeg", "filename": format!("{id}.jpg")})
    }

    #[tokio::test]
    async fn list_stream_yields_items_across_pages() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/mediaItems"))
            .and(query_param_is_missing("pageToken"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "mediaItems": [item_json("a"), item_json("b")],
                "nextPageToken": "p2"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/mediaItems"))
            .and(query_param("pageToken", "p2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "mediaItems": [item_json("c")],
                "nextPageToken": ""
            })))
            .expect(1)
            .mount(&server)
            .await;

        let items = service(&server)
            .list_all(None, CancellationToken::new())
            .await
            .unwrap();
        let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn list_failure_on_second_page_discards_first_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/mediaItems"))
            .and(query_param_is_missing("pageToken"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "mediaItems": [item_json("a")],
                "nextPageToken": "p2"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/mediaItems"))
            .and(query_param("pageToken", "p2"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let result = service(&server)
            .list_all(None, CancellationToken::new())
            .await;
        assert_matches!(result, Err(ApiError::NotFound));
    }

    #[tokio::test]
    async fn search_posts_filters_and_page_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/mediaItems:search"))
            .and(body_json(serde_json::json!({
                "pageSize": 50,
                "filters": {
                    "contentFilter": {"includedContentCategories": ["PETS", "FOOD"]},
                    "mediaTypeFilter": {"mediaTypes": ["PHOTO"]},
                    "dateFilter": {"ranges": [{
                        "startDate": {"year": 2020, "month": 1, "day": 1},
                        "endDate": {"year": 2020, "month": 12, "day": 31}
                    }]}
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "mediaItems": [item_json("a")],
                "nextPageToken": "s2"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/mediaItems:search"))
            .and(body_json(serde_json::json!({
                "pageSize": 50,
                "filters": {
                    "contentFilter": {"includedContentCategories": ["PETS", "FOOD"]},
                    "mediaTypeFilter": {"mediaTypes": ["PHOTO"]},
                    "dateFilter": {"ranges": [{
                        "startDate": {"year": 2020, "month": 1, "day": 1},
                        "endDate": {"year": 2020, "month": 12, "day": 31}
                    }]}
                },
                "pageToken": "s2"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "mediaItems": [item_json("b")]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let options = SearchOptions {
            filters: Some(SearchFilters {
                content_filter: Some(ContentFilter {
                    included_content_categories: vec![ContentCategory::Pets, ContentCategory::Food],
                    ..ContentFilter::default()
                }),
                media_type_filter: Some(MediaTypeFilter {
                    media_types: vec![MediaType::Photo],
                }),
                date_filter: Some(DateFilter {
                    ranges: vec![DateRange {
                        start_date: Date { year: 2020, month: 1, day: 1 },
                        end_date: Date { year: 2020, month: 12, day: 31 },
                    }],
                    ..DateFilter::default()
                }),
                ..SearchFilters::default()
            }),
            ..SearchOptions::default()
        };
        let items = service(&server)
            .search_all(Some(&options), CancellationToken::new())
            .await
            .unwrap();
        let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn search_by_album_with_explicit_page_size() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/mediaItems:search"))
            .and(body_json(serde_json::json!({"pageSize": 100, "albumId": "al"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let options = SearchOptions {
            page_size: Some(100),
            album_id: Some("al".into()),
            filters: None,
        };
        let page = service(&server)
            .search(Some(&options), &Cursor::start(), &CancellationToken::new())
            .await
            .unwrap();
        assert!(page.items.is_empty());
    }

    #[tokio::test]
    async fn batch_get_sends_repeated_ids() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/mediaItems:batchGet"))
            .respond_with(|request: &Request| {
                let ids: Vec<String> = request
                    .url
                    .query_pairs()
                    .filter(|(key, _)| key == "mediaItemIds")
                    .map(|(_, value)| value.into_owned())
                    .collect();
                let results: Vec<_> = ids
                    .iter()
                    .map(|id| serde_json::json!({"mediaItem": item_json(id)}))
                    .collect();
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"mediaItemResults": results}))
            })
            .mount(&server)
            .await;

        let ids = vec!["x".to_string(), "y".to_string()];
        let results = service(&server)
            .batch_get(&ids, &CancellationToken::new())
            .await
            .unwrap();
        let got: Vec<String> = results
            .into_iter()
            .map(|r| r.media_item.unwrap().id)
            .collect();
        assert_eq!(got, ids);
    }

    #[tokio::test]
    async fn batch_get_all_chunks_in_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/mediaItems:batchGet"))
            .respond_with(|request: &Request| {
                let results: Vec<_> = request
                    .url
                    .query_pairs()
                    .filter(|(key, _)| key == "mediaItemIds")
                    .map(|(_, id)| serde_json::json!({"mediaItem": {"id": id}}))
                    .collect();
                assert!(results.len() <= 50);
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"mediaItemResults": results}))
            })
            .expect(3)
            .mount(&server)
            .await;

        let ids: Vec<String> = (0..120).map(|i| format!("id{i}")).collect();
        let results = service(&server)
            .batch_get_all(ids.clone(), CancellationToken::new())
            .await
            .unwrap();
        let got: Vec<String> = results
            .into_iter()
            .map(|r| r.media_item.unwrap().id)
            .collect();
        assert_eq!(got, ids);
    }

    #[tokio::test]
    async fn batch_get_rejects_oversized_slice() {
        let server = MockServer::start().await;
        let ids: Vec<String> = (0..51).map(|i| i.to_string()).collect();
        let result = service(&server)
            .batch_get(&ids, &CancellationToken::new())
            .await;
        assert_matches!(result, Err(ApiError::TooManyIds { count: 51, max: 50 }));
    }

    #[tokio::test]
    async fn batch_get_all_with_no_ids_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let results = service(&server)
            .batch_get_all(vec![], CancellationToken::new())
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn patch_description() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/v1/mediaItems/m1"))
            .and(query_param("updateMask", "description"))
            .and(body_json(serde_json::json!({"id": "m1", "description": "new"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "m1", "description": "new"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let item = MediaItem {
            id: "m1".into(),
            description: "new".into(),
            ..MediaItem::default()
        };
        let patched = service(&server)
            .patch(&item, &[MediaItemField::Description], &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(patched.description, "new");
    }

    #[tokio::test]
    async fn create_from_files_uploads_then_creates() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/uploads"))
            .and(header("X-Goog-Upload-Protocol", "raw"))
            .and(header("X-Goog-Upload-File-Name", "photo.jpg"))
            .and(header("X-Goog-Upload-Content-Type", "image/jpeg"))
            .respond_with(ResponseTemplate::new(200).set_body_string("upload-token-1"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/mediaItems:batchCreate"))
            .and(body_json(serde_json::json!({
                "albumId": "al",
                "newMediaItems": [{
                    "simpleMediaItem": {"uploadToken": "upload-token-1", "fileName": "photo.jpg"}
                }],
                "albumPosition": {"position": "LAST_IN_ALBUM"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "newMediaItemResults": [{
                    "uploadToken": "upload-token-1",
                    "status": {"code": 0, "message": "Success"},
                    "mediaItem": item_json("created")
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("photo.jpg");
        std::fs::File::create(&file_path)
            .unwrap()
            .write_all(b"not really a jpeg")
            .unwrap();

        let results = service(&server)
            .batch_create_from_files(
                Some("al"),
                &[file_path],
                Some(AlbumPosition::last()),
                &CancellationToken::new(),
            )
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].media_item.as_ref().unwrap().id, "created");
    }
}
