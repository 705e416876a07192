use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::{
    photos_api::types::ApiError,
    stream::{Cursor, Delivery, ItemStream, Page, channel, deliver},
};

/// Fetches one page of a collection given the cursor returned by the previous page.
///
/// Implemented for any `FnMut(Cursor) -> impl Future<Output = Result<Page<T>, ApiError>>`,
/// so resource services pass closures.
pub trait PageFetcher<T>: Send + 'static {
    fn fetch_page(
        &mut self,
        cursor: Cursor,
    ) -> impl Future<Output = Result<Page<T>, ApiError>> + Send;
}

impl<T, F, Fut> PageFetcher<T> for F
where
    F: FnMut(Cursor) -> Fut + Send + 'static,
    Fut: Future<Output = Result<Page<T>, ApiError>> + Send,
{
    fn fetch_page(
        &mut self,
        cursor: Cursor,
    ) -> impl Future<Output = Result<Page<T>, ApiError>> + Send {
        self(cursor)
    }
}

/// Spawn a producer that walks every page of `fetcher` and streams the items in order.
///
/// Pages are fetched strictly one after another. The stream ends after the first
/// page carrying an empty cursor, after the first failed fetch (with that error),
/// or silently once `cancellation_token` fires.
pub fn paginate<T, F>(fetcher: F, cancellation_token: CancellationToken) -> ItemStream<T>
where
    T: Send + 'static,
    F: PageFetcher<T>,
{
    let (sink, stream) = channel();
    tokio::spawn(async move {
        let mut fetcher = fetcher;
        let mut cursor = Cursor::start();
        let mut page_count = 0usize;
        loop {
            if cancellation_token.is_cancelled() {
                log::info!("Cancellation requested, stopping pagination after {page_count} pages.");
                return;
            }
            let page = tokio::select! {
                biased;
                _ = cancellation_token.cancelled() => {
                    log::info!("Cancellation requested, abandoning page fetch.");
                    return;
                }
                page = fetcher.fetch_page(cursor) => page,
            };
            let Page { items, next_cursor } = match page {
                Ok(page) => page,
                Err(_) if cancellation_token.is_cancelled() => {
                    log::info!("Page fetch aborted by cancellation.");
                    return;
                }
                Err(e) => {
                    log::debug!("Page fetch {} failed: {}", page_count + 1, e);
                    sink.fail(e);
                    return;
                }
            };
            page_count += 1;
            log::trace!(
                "Fetched page {} with {} items, has next page: {}",
                page_count,
                items.len(),
                !next_cursor.is_end()
            );
            if let Delivery::Stopped = deliver(&sink, items, &cancellation_token).await {
                return;
            }
            if next_cursor.is_end() {
                log::debug!("Pagination finished after {page_count} pages.");
                return;
            }
            cursor = next_cursor;
        }
    });
    stream
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{photos_api::types::ApiStatus, stream::collect};
    use assert_matches::assert_matches;
    use futures::StreamExt;
    use pretty_assertions::assert_eq;
    use std::sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    };

    /// Serves scripted pages keyed by call index and records the cursors it was called with.
    #[derive(Clone)]
    struct ScriptedPages {
        pages: Arc<Vec<Result<Page<&'static str>, u16>>>,
        cursors: Arc<Mutex<Vec<Cursor>>>,
    }

    impl ScriptedPages {
        fn new(pages: Vec<Result<Page<&'static str>, u16>>) -> Self {
            Self {
                pages: Arc::new(pages),
                cursors: Arc::default(),
            }
        }

        fn fetcher(&self) -> impl PageFetcher<&'static str> + use<> {
            let pages = self.pages.clone();
            let cursors = self.cursors.clone();
            move |cursor: Cursor| {
                let mut seen = cursors.lock().unwrap();
                let index = seen.len();
                seen.push(cursor);
                let page = pages[index].clone();
                async move {
                    page.map_err(|code| {
                        ApiError::Api(ApiStatus {
                            code: i32::from(code),
                            message: "scripted failure".into(),
                            status: "INTERNAL".into(),
                        })
                    })
                }
            }
        }

        fn cursors(&self) -> Vec<Cursor> {
            self.cursors.lock().unwrap().clone()
        }
    }

    #[tokio::test]
    async fn collects_pages_in_order() {
        let script = ScriptedPages::new(vec![
            Ok(Page::new(vec!["a", "b"], "x")),
            Ok(Page::last(vec!["c"])),
        ]);
        let items = collect(paginate(script.fetcher(), CancellationToken::new())).await;
        assert_matches!(items, Ok(items) => assert_eq!(items, vec!["a", "b", "c"]));
        assert_eq!(script.cursors(), vec![Cursor::start(), Cursor::from("x")]);
    }

    #[tokio::test]
    async fn single_page_is_fetched_once() {
        let script = ScriptedPages::new(vec![Ok(Page::last(vec!["only"]))]);
        let items = collect(paginate(script.fetcher(), CancellationToken::new())).await;
        assert_matches!(items, Ok(items) => assert_eq!(items, vec!["only"]));
        assert_eq!(script.cursors().len(), 1);
    }

    #[tokio::test]
    async fn empty_pages_are_followed_until_the_cursor_ends() {
        let script = ScriptedPages::new(vec![
            Ok(Page::new(vec![], "1")),
            Ok(Page::new(vec!["a"], "2")),
            Ok(Page::last(vec![])),
        ]);
        let items = collect(paginate(script.fetcher(), CancellationToken::new())).await;
        assert_matches!(items, Ok(items) => assert_eq!(items, vec!["a"]));
        assert_eq!(script.cursors().len(), 3);
    }

    #[tokio::test]
    async fn streaming_form_delivers_prefix_then_one_error() {
        let script = ScriptedPages::new(vec![
            Ok(Page::new(vec!["a", "b"], "x")),
            Err(503),
            Ok(Page::last(vec!["never"])),
        ]);
        let results: Vec<_> = paginate(script.fetcher(), CancellationToken::new())
            .collect()
            .await;
        assert_eq!(results.len(), 3);
        assert_matches!(results[0], Ok("a"));
        assert_matches!(results[1], Ok("b"));
        assert_matches!(&results[2], Err(ApiError::Api(ApiStatus { code: 503, .. })));
        assert_eq!(script.cursors().len(), 2);
    }

    #[tokio::test]
    async fn collect_discards_items_on_error() {
        let script = ScriptedPages::new(vec![Ok(Page::new(vec!["a"], "x")), Err(500)]);
        let result = collect(paginate(script.fetcher(), CancellationToken::new())).await;
        assert_matches!(result, Err(ApiError::Api(ApiStatus { code: 500, .. })));
    }

    #[tokio::test]
    async fn cancelled_before_start_fetches_nothing() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let token = CancellationToken::new();
        token.cancel();
        let stream = paginate(
            move |_cursor: Cursor| {
                counter.fetch_add(1, Ordering::SeqCst);
                async { Ok::<_, ApiError>(Page::last(vec![1u32])) }
            },
            token,
        );
        let results: Vec<_> = stream.collect().await;
        assert!(results.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn cancelled_mid_stream_yields_strict_prefix_without_error() {
        let token = CancellationToken::new();
        // Endless pages of three consecutive numbers.
        let mut next = 0u32;
        let mut stream = paginate(
            move |_cursor: Cursor| {
                let page = Page::new(vec![next, next + 1, next + 2], "more");
                next += 3;
                async move { Ok::<_, ApiError>(page) }
            },
            token.clone(),
        );
        let mut received = Vec::new();
        while let Some(item) = stream.next().await {
            let item = item.expect("no error after cancellation");
            received.push(item);
            if received.len() == 5 {
                token.cancel();
            }
        }
        assert!(received.len() >= 5);
        let expected: Vec<u32> = (0..received.len() as u32).collect();
        assert_eq!(received, expected);
    }

    #[tokio::test]
    async fn fetch_in_flight_is_abandoned_on_cancellation() {
        let token = CancellationToken::new();
        let stream = paginate(
            |_cursor: Cursor| async {
                futures::future::pending::<Result<Page<u8>, ApiError>>().await
            },
            token.clone(),
        );
        token.cancel();
        let result = collect(stream).await;
        assert_matches!(result, Ok(items) => assert!(items.is_empty()));
    }

    #[tokio::test]
    async fn error_caused_by_cancellation_is_not_reported() {
        let token = CancellationToken::new();
        let inner = token.clone();
        let stream = paginate(
            move |_cursor: Cursor| {
                inner.cancel();
                async { Err::<Page<u8>, _>(ApiError::Cancelled) }
            },
            token,
        );
        let results: Vec<_> = stream.collect().await;
        assert!(results.is_empty());
    }
}
