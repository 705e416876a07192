//! Typed client for the Photos Library API.
//!
//! List and batch endpoints are exposed as cancellable [`stream::ItemStream`]s;
//! the `*_all` variants collect a stream into a `Vec` or fail with its error.

pub mod photos_api;
pub mod stream;

pub use photos_api::{
    access_token::AccessToken,
    builder::{ClientBuildError, PhotosClientBuilder},
    client::PhotosClient,
    types::{ApiError, ApiStatus},
};
