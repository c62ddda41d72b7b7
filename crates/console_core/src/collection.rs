use std::sync::Arc;

use tokio::sync::{broadcast, Mutex};
use tracing::{info, warn};

use crate::store::{CollectionStore, OrderedItem};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}

impl MoveDirection {
    fn offset(self) -> isize {
        match self {
            MoveDirection::Up => -1,
            MoveDirection::Down => 1,
        }
    }
}

/// Disposition of a `move_item` call, observed after the reorder round trip
/// (if any) has completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Server accepted the new order; local state now mirrors its response.
    Reconciled,
    /// Reorder call failed; the optimistic change was discarded and the
    /// collection reloaded from the server.
    RolledBack,
    /// The item is already at the edge of the collection.
    OutOfBounds,
    /// A reorder round trip is still in flight; this move was ignored.
    Busy,
    /// The collection contains an item without a persisted id, so no
    /// canonical id list can be derived.
    Unsaved,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionEvent {
    Loaded { count: usize },
    LoadFailed { message: String },
    /// Optimistic local swap applied; the server has not confirmed yet.
    Reordered,
    Reconciled,
    RolledBack { message: String },
}

struct CollectionState<I> {
    items: Vec<I>,
    reorder_in_flight: bool,
}

/// Client-side view of one ordered collection. Local moves apply
/// immediately; the server's reorder response is authoritative and replaces
/// the optimistic guess, or the whole collection is reloaded on failure.
///
/// One controller per view instance; different collections are fully
/// independent.
pub struct CollectionController<S: CollectionStore> {
    store: Arc<S>,
    inner: Mutex<CollectionState<S::Item>>,
    events: broadcast::Sender<CollectionEvent>,
}

impl<S: CollectionStore> CollectionController<S> {
    pub fn new(store: Arc<S>) -> Arc<Self> {
        let (events, _) = broadcast::channel(64);
        Arc::new(Self {
            store,
            inner: Mutex::new(CollectionState {
                items: Vec::new(),
                reorder_in_flight: false,
            }),
            events,
        })
    }

    /// Replaces the local view with the server's current order. A transport
    /// failure leaves the view unchanged and is reported as an event, never
    /// an error.
    pub async fn load(&self) {
        match self.store.list().await {
            Ok(items) => {
                let count = items.len();
                self.inner.lock().await.items = items;
                let _ = self.events.send(CollectionEvent::Loaded { count });
            }
            Err(err) => {
                warn!("collection load failed: {err}");
                let _ = self.events.send(CollectionEvent::LoadFailed {
                    message: err.to_string(),
                });
            }
        }
    }

    /// Moves the item at `index` one position up or down.
    ///
    /// The swap is applied locally first, then the full ordered id list is
    /// sent to the server in a single reorder call. At most one round trip
    /// is in flight per collection; overlapping moves are ignored.
    pub async fn move_item(&self, index: usize, direction: MoveDirection) -> MoveOutcome {
        let ordered_ids = {
            let mut state = self.inner.lock().await;
            if state.reorder_in_flight {
                warn!(index, "move ignored: reorder already in flight");
                return MoveOutcome::Busy;
            }
            let len = state.items.len();
            let target = index as isize + direction.offset();
            if index >= len || target < 0 || target as usize >= len {
                return MoveOutcome::OutOfBounds;
            }
            if state.items.iter().any(|item| item.item_id().is_none()) {
                warn!(index, "move ignored: collection holds an unsaved item");
                return MoveOutcome::Unsaved;
            }

            state.items.swap(index, target as usize);
            state.reorder_in_flight = true;
            let ids: Vec<i64> = state
                .items
                .iter()
                .filter_map(OrderedItem::item_id)
                .collect();
            let _ = self.events.send(CollectionEvent::Reordered);
            ids
        };

        // Round trip runs outside the lock; readers observe the optimistic
        // order while the request is pending.
        match self.store.reorder(&ordered_ids).await {
            Ok(server_order) => {
                let mut state = self.inner.lock().await;
                state.items = server_order;
                state.reorder_in_flight = false;
                drop(state);
                let _ = self.events.send(CollectionEvent::Reconciled);
                MoveOutcome::Reconciled
            }
            Err(err) => {
                warn!("reorder failed, reloading authoritative order: {err}");
                // Guard stays set through the rollback reload; a move landing
                // before the reload would swap the discarded optimistic order.
                self.load().await;
                self.inner.lock().await.reorder_in_flight = false;
                info!("collection rolled back to server order");
                let _ = self.events.send(CollectionEvent::RolledBack {
                    message: err.to_string(),
                });
                MoveOutcome::RolledBack
            }
        }
    }

    /// Snapshot of the current ordered sequence.
    pub async fn items(&self) -> Vec<S::Item> {
        self.inner.lock().await.items.clone()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<CollectionEvent> {
        self.events.subscribe()
    }
}
