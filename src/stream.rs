//! Cancellable item streams over paginated and batched endpoints.
//!
//! A stream is produced by one background task that owns the fetch state and
//! pushes decoded items into a bounded queue. The consumer holds the receiving
//! side of two channels: the item queue and a one-shot error channel. A stream
//! ends in exactly one of two ways: the item queue closes with every item
//! delivered, or the error channel yields one error after the last item that
//! will ever be delivered. Cancellation ends the stream like the first case.

pub mod batcher;
pub mod collector;
pub mod paginator;

use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use futures::Stream;
use tokio::sync::{mpsc, oneshot};

use crate::photos_api::types::ApiError;

pub use batcher::{BatchFetcher, batch};
pub use collector::collect;
pub use paginator::{PageFetcher, paginate};

/// Number of decoded items that may wait in the queue before the producer blocks.
pub const ITEM_QUEUE_CAPACITY: usize = 50;

/// Opaque page continuation token. The empty token means "no further pages".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cursor(String);

impl Cursor {
    /// The cursor used to request the first page.
    pub fn start() -> Self {
        Self::default()
    }

    pub fn is_end(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Cursor {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl From<&str> for Cursor {
    fn from(token: &str) -> Self {
        Self(token.to_owned())
    }
}

/// One page of items plus the cursor for the next page.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_cursor: Cursor,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, next_cursor: impl Into<Cursor>) -> Self {
        Self {
            items,
            next_cursor: next_cursor.into(),
        }
    }

    /// A page with no successor.
    pub fn last(items: Vec<T>) -> Self {
        Self::new(items, Cursor::start())
    }
}

/// Receiving side of a stream: ordered items, then at most one error.
pub struct ItemStream<T> {
    items: mpsc::Receiver<T>,
    error: Option<oneshot::Receiver<ApiError>>,
}

impl<T> ItemStream<T> {
    /// Split into the item queue and the error channel.
    ///
    /// The error channel resolves with `Err(RecvError)` when the producer finished
    /// without an error.
    pub fn into_parts(self) -> (mpsc::Receiver<T>, oneshot::Receiver<ApiError>) {
        let error = match self.error {
            Some(error) => error,
            // Already observed; hand out a receiver whose sender is gone.
            None => oneshot::channel().1,
        };
        (self.items, error)
    }

    /// Collect every item, or return the first error and discard the rest.
    pub async fn collect_all(self) -> Result<Vec<T>, ApiError> {
        collect(self).await
    }
}

impl<T> Stream for ItemStream<T> {
    type Item = Result<T, ApiError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if let Some(item) = std::task::ready!(self.items.poll_recv(cx)) {
            return Poll::Ready(Some(Ok(item)));
        }
        // Item queue closed; a pending error is surfaced exactly once.
        let Some(error) = self.error.as_mut() else {
            return Poll::Ready(None);
        };
        let outcome = std::task::ready!(Pin::new(error).poll(cx));
        self.error = None;
        Poll::Ready(outcome.ok().map(Err))
    }
}

/// Sending side of a stream, owned by the producer task.
pub(crate) struct ItemSink<T> {
    items: mpsc::Sender<T>,
    error: oneshot::Sender<ApiError>,
}

impl<T> ItemSink<T> {
    /// Report the terminal error. Consumes the sink so the item queue closes right after.
    pub(crate) fn fail(self, error: ApiError) {
        let Self { items, error: error_tx } = self;
        if error_tx.send(error).is_err() {
            log::debug!("Stream consumer is gone, dropping error");
        }
        drop(items);
    }

    pub(crate) fn items(&self) -> &mpsc::Sender<T> {
        &self.items
    }
}

pub(crate) fn channel<T>() -> (ItemSink<T>, ItemStream<T>) {
    let (items_tx, items_rx) = mpsc::channel(ITEM_QUEUE_CAPACITY);
    let (error_tx, error_rx) = oneshot::channel();
    (
        ItemSink {
            items: items_tx,
            error: error_tx,
        },
        ItemStream {
            items: items_rx,
            error: Some(error_rx),
        },
    )
}

/// Outcome of handing a batch of items to the consumer.
#[derive(Debug)]
pub(crate) enum Delivery {
    Delivered,
    /// Cancellation fired or the consumer dropped the stream.
    Stopped,
}

/// Push items in order; every send is a cancellation point.
pub(crate) async fn deliver<T>(
    sink: &ItemSink<T>,
    items: Vec<T>,
    cancellation_token: &tokio_util::sync::CancellationToken,
) -> Delivery {
    for item in items {
        tokio::select! {
            biased;
            _ = cancellation_token.cancelled() => {
                log::info!("Cancellation requested, abandoning item delivery.");
                return Delivery::Stopped;
            }
            sent = sink.items().send(item) => {
                if sent.is_err() {
                    log::debug!("Stream consumer dropped, stopping producer.");
                    return Delivery::Stopped;
                }
            }
        }
    }
    Delivery::Delivered
}
