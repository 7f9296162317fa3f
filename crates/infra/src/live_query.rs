//! Live queries: result streams that re-deliver after relevant writes.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::future::BoxFuture;
use futures::stream::{self, BoxStream, Stream, StreamExt};
use tracing::warn;

use itemstore_events::Subscription;
use itemstore_inventory::ItemChange;

use crate::error::{StoreError, StoreResult};
use crate::item_store::ItemEnvelope;

/// A standing read request.
///
/// The first poll runs the query against the current state. After that the
/// stream waits on its change subscription and re-runs the query whenever a
/// relevant change commits. Changes that pile up between polls are coalesced
/// into a single re-run, so a consumer always sees the latest state.
///
/// - A query that finds nothing (`Ok(None)`) emits nothing and keeps waiting.
/// - A store fault is yielded once as `Err` and then the stream ends.
/// - The stream ends when the owning store (and with it the bus) is dropped.
///
/// Dropping a `LiveQuery` releases its bus registration.
pub struct LiveQuery<T> {
    inner: BoxStream<'static, StoreResult<T>>,
}

impl<T> core::fmt::Debug for LiveQuery<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LiveQuery").finish_non_exhaustive()
    }
}

struct WatchState<Q, R> {
    subscription: Subscription<ItemEnvelope>,
    query: Q,
    relevant: R,
    primed: bool,
    failed: bool,
}

impl<T: Send + 'static> LiveQuery<T> {
    /// Build a live query from an already-registered subscription.
    ///
    /// The subscription must be registered before the first query runs, so
    /// that no commit can slip between the snapshot and the first wait.
    pub(crate) fn watch<Q, R>(subscription: Subscription<ItemEnvelope>, relevant: R, query: Q) -> Self
    where
        Q: Fn() -> BoxFuture<'static, StoreResult<Option<T>>> + Send + 'static,
        R: Fn(&ItemChange) -> bool + Send + 'static,
    {
        let state = WatchState {
            subscription,
            query,
            relevant,
            primed: false,
            failed: false,
        };

        let inner = stream::unfold(state, |mut state| async move {
            if state.failed {
                return None;
            }

            loop {
                if state.primed {
                    let Some(first) = state.subscription.recv().await else {
                        return None;
                    };
                    let mut dirty = (state.relevant)(first.payload());
                    for queued in state.subscription.drain_ready() {
                        dirty |= (state.relevant)(queued.payload());
                    }
                    if !dirty {
                        continue;
                    }
                }
                state.primed = true;

                match (state.query)().await {
                    Ok(Some(value)) => return Some((Ok(value), state)),
                    Ok(None) => continue,
                    Err(err) => {
                        warn!(error = %err, "live query terminated by store fault");
                        state.failed = true;
                        return Some((Err(err), state));
                    }
                }
            }
        })
        .boxed();

        Self { inner }
    }
}

impl<T> Stream for LiveQuery<T> {
    type Item = Result<T, StoreError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.poll_next_unpin(cx)
    }
}
