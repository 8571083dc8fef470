use std::fmt::Display;
use std::future::Future;

use futures::future::join_all;
use tracing::{Instrument, debug, error, info, info_span};
use uuid::Uuid;

use crate::item::{BatchSummary, Outcome, WorkItem};
use crate::limiter::ConcurrencyLimiter;

/// Runs `transform` over every item with at most `limiter.capacity()` calls in
/// flight, returning one [`Outcome`] per item in input order.
///
/// All items are submitted up front; the limiter decides when each one starts.
/// A transformer error is logged with the item's topic and becomes a
/// [`Status::Failed`](crate::item::Status::Failed) outcome for that item only:
/// the batch always runs to completion and never returns an error. Each item is
/// transformed exactly once.
///
/// Units run on the caller's task, so a transformer that panics takes the
/// whole batch down with it.
pub async fn run_batch<F, Fut, T, E>(
    items: &[WorkItem],
    transform: F,
    limiter: &ConcurrencyLimiter,
) -> Vec<Outcome>
where
    F: Fn(WorkItem) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let batch_id = Uuid::new_v4();
    let span = info_span!(
        "batch",
        %batch_id,
        items = items.len(),
        cap = limiter.capacity()
    );

    async {
        info!("starting batch");
        let transform = &transform;

        let units = items.iter().enumerate().map(|(index, item)| {
            let item = item.clone();
            async move {
                let topic = item.topic.clone();
                let result = limiter
                    .run(|| {
                        debug!(index, topic = %topic, "admitted");
                        transform(item)
                    })
                    .await;

                match result {
                    Ok(_) => Outcome::succeeded(topic),
                    Err(err) => {
                        error!(index, topic = %topic, error = %err, "generation failed");
                        Outcome::failed(topic)
                    }
                }
            }
        });

        // join_all yields results in submission order, whatever order they settle in.
        let outcomes = join_all(units).await;

        let summary = BatchSummary::from_outcomes(&outcomes);
        info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            "batch settled"
        );
        outcomes
    }
    .instrument(span)
    .await
}
