//! Resource representations shared by the services.

use serde::{Deserialize, Serialize};

/// A collection of media items.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Album {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub product_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_writeable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub share_info: Option<ShareInfo>,
    /// Decimal string, as sent by the API.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub media_items_count: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub cover_photo_base_url: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub cover_photo_media_item_id: String,
}

/// Sharing state of an album.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShareInfo {
    pub shared_album_options: SharedAlbumOptions,
    pub shareable_url: String,
    pub share_token: String,
    pub is_joined: bool,
    pub is_owned: bool,
    pub is_joinable: bool,
}

/// Options applied when sharing an album.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SharedAlbumOptions {
    pub is_collaborative: bool,
    pub is_commentable: bool,
}

/// A photo or video in the library.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MediaItem {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub product_url: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub base_url: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub mime_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_metadata: Option<MediaMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contributor_info: Option<ContributorInfo>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub filename: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MediaMetadata {
    pub creation_time: String,
    pub width: String,
    pub height: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<PhotoMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<VideoMetadata>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PhotoMetadata {
    pub camera_make: String,
    pub camera_model: String,
    pub focal_length: f32,
    pub aperture_f_number: f32,
    pub iso_equivalent: u32,
    pub exposure_time: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VideoMetadata {
    pub camera_make: String,
    pub camera_model: String,
    pub fps: f64,
    pub status: String,
}

/// Who added a media item to a shared album.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContributorInfo {
    pub profile_picture_base_url: String,
    pub display_name: String,
}

/// Per-item outcome inside a successful batch response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemStatus {
    pub code: i32,
    pub message: String,
}

/// One entry of a batch get: the item, or the reason it could not be fetched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MediaItemResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_item: Option<MediaItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ItemStatus>,
}

/// One entry of a batch create.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewMediaItemResult {
    pub upload_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ItemStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_item: Option<MediaItem>,
}
