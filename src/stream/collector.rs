use crate::{photos_api::types::ApiError, stream::ItemStream};

/// Drain a stream into a vector.
///
/// Returns every item in delivery order once the stream ends cleanly, or the first
/// error as soon as it is observed. Items received before an error are dropped.
/// A stream ended by cancellation yields the items received so far.
pub async fn collect<T>(stream: ItemStream<T>) -> Result<Vec<T>, ApiError> {
    let (mut items, mut error) = stream.into_parts();
    let mut collected = Vec::new();
    let mut error_pending = true;
    loop {
        tokio::select! {
            biased;
            outcome = &mut error, if error_pending => match outcome {
                Ok(e) => return Err(e),
                // Producer finished without an error; keep draining items.
                Err(_) => error_pending = false,
            },
            item = items.recv() => match item {
                Some(item) => collected.push(item),
                None if error_pending => {
                    // The error, if any, is sent before the item queue closes.
                    return match error.await {
                        Ok(e) => Err(e),
                        Err(_) => Ok(collected),
                    };
                }
                None => return Ok(collected),
            },
        }
    }
}
