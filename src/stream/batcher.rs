use std::{future::Future, num::NonZeroUsize};

use tokio_util::sync::CancellationToken;

use crate::{
    photos_api::types::ApiError,
    stream::{Delivery, ItemStream, channel, deliver},
};

/// Executes one batch call for at most a fixed number of ids.
///
/// Implemented for any `FnMut(Vec<String>) -> impl Future<Output = Result<Vec<T>, ApiError>>`.
pub trait BatchFetcher<T>: Send + 'static {
    fn fetch_batch(
        &mut self,
        ids: Vec<String>,
    ) -> impl Future<Output = Result<Vec<T>, ApiError>> + Send;
}

impl<T, F, Fut> BatchFetcher<T> for F
where
    F: FnMut(Vec<String>) -> Fut + Send + 'static,
    Fut: Future<Output = Result<Vec<T>, ApiError>> + Send,
{
    fn fetch_batch(
        &mut self,
        ids: Vec<String>,
    ) -> impl Future<Output = Result<Vec<T>, ApiError>> + Send {
        self(ids)
    }
}

/// Split `ids` into ordered chunks of at most `chunk_size` ids.
///
/// Yields `ceil(len / chunk_size)` chunks and nothing at all for an empty list.
pub fn chunk_ids(ids: Vec<String>, chunk_size: NonZeroUsize) -> Vec<Vec<String>> {
    let mut chunks = Vec::with_capacity(ids.len().div_ceil(chunk_size.get()));
    let mut ids = ids.into_iter().peekable();
    while ids.peek().is_some() {
        chunks.push(ids.by_ref().take(chunk_size.get()).collect());
    }
    chunks
}

/// Spawn a producer that runs `fetcher` over `ids` chunk by chunk and streams the results.
///
/// Chunks are processed in order. The first failing chunk ends the stream with its
/// error and no later chunk is requested.
pub fn batch<T, F>(
    ids: Vec<String>,
    chunk_size: NonZeroUsize,
    fetcher: F,
    cancellation_token: CancellationToken,
) -> ItemStream<T>
where
    T: Send + 'static,
    F: BatchFetcher<T>,
{
    let (sink, stream) = channel();
    tokio::spawn(async move {
        let mut fetcher = fetcher;
        let chunks = chunk_ids(ids, chunk_size);
        let chunk_count = chunks.len();
        log::debug!("Processing {chunk_count} chunks of at most {chunk_size} ids.");
        for (index, chunk) in chunks.into_iter().enumerate() {
            if cancellation_token.is_cancelled() {
                log::info!("Cancellation requested, stopping batch after {index} of {chunk_count} chunks.");
                return;
            }
            let result = tokio::select! {
                biased;
                _ = cancellation_token.cancelled() => {
                    log::info!("Cancellation requested, abandoning batch call.");
                    return;
                }
                result = fetcher.fetch_batch(chunk) => result,
            };
            let items = match result {
                Ok(items) => items,
                Err(_) if cancellation_token.is_cancelled() => {
                    log::info!("Batch call aborted by cancellation.");
                    return;
                }
                Err(e) => {
                    log::debug!("Chunk {} of {} failed: {}", index + 1, chunk_count, e);
                    sink.fail(e);
                    return;
                }
            };
            if let Delivery::Stopped = deliver(&sink, items, &cancellation_token).await {
                return;
            }
        }
    });
    stream
}
