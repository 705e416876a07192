use serde::{Deserialize, Serialize, de::IgnoredAny};
use tokio_util::sync::CancellationToken;

use crate::{
    photos_api::{
        model::Album,
        options::{ListAlbumsOptions, resolve},
        transport::HttpTransport,
        types::ApiError,
    },
    stream::{Cursor, ItemStream, Page, collect, paginate},
};

const SHARED_ALBUMS_PATH: &str = "v1/sharedAlbums";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ListSharedAlbumsResponse {
    shared_albums: Vec<Album>,
    next_page_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ShareTokenRequest<'a> {
    share_token: &'a str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct JoinResponse {
    album: Album,
}

/// Operations on albums shared with the user.
#[derive(Clone, Debug)]
pub struct SharedAlbumsService {
    transport: HttpTransport,
}

impl SharedAlbumsService {
    pub fn new(transport: HttpTransport) -> Self {
        Self { transport }
    }

    /// Look up a shared album by its share token.
    pub async fn get(
        &self,
        share_token: &str,
        cancellation_token: &CancellationToken,
    ) -> Result<Album, ApiError> {
        self.transport
            .get(
                &format!("{SHARED_ALBUMS_PATH}/{share_token}"),
                &(),
                cancellation_token,
            )
            .await
    }

    pub async fn join(
        &self,
        share_token: &str,
        cancellation_token: &CancellationToken,
    ) -> Result<Album, ApiError> {
        let response: JoinResponse = self
            .transport
            .post(
                &format!("{SHARED_ALBUMS_PATH}:join"),
                &ShareTokenRequest { share_token },
                cancellation_token,
            )
            .await?;
        Ok(response.album)
    }

    pub async fn leave(
        &self,
        share_token: &str,
        cancellation_token: &CancellationToken,
    ) -> Result<(), ApiError> {
        let _: IgnoredAny = self
            .transport
            .post(
                &format!("{SHARED_ALBUMS_PATH}:leave"),
                &ShareTokenRequest { share_token },
                cancellation_token,
            )
            .await?;
        Ok(())
    }

    pub async fn list(
        &self,
        options: Option<&ListAlbumsOptions>,
        cursor: &Cursor,
        cancellation_token: &CancellationToken,
    ) -> Result<Page<Album>, ApiError> {
        Self::list_page(&self.transport, &resolve(options), cursor, cancellation_token).await
    }

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
        let response: ListSharedAlbumsResponse = transport
            .get_page(SHARED_ALBUMS_PATH, options, cursor, cancellation_token)
            .await?;
        Ok(Page::new(response.shared_albums, response.next_page_token))
    }
}
