use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use tokio::sync::watch;

use crate::gateway::ListService;

/// Snapshot of one entity list as a view would render it.
#[derive(Debug, Clone, PartialEq)]
pub struct ListState<T> {
    pub data: Vec<T>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> Default for ListState<T> {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            loading: false,
            error: None,
        }
    }
}

/// Whether a finished `refetch` was applied to the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefetchOutcome {
    Applied,
    /// A later `refetch` was issued while this one was in flight.
    Superseded,
}

struct Inner<S: ListService> {
    service: S,
    state: watch::Sender<ListState<S::Record>>,
    latest: AtomicU64,
}

/// Refetchable list of remote records with change notification.
///
/// Clones share state. Every `refetch` takes a new request token and only
/// the most recently issued one may write its result, whatever order the
/// responses arrive in.
pub struct EntityList<S: ListService> {
    inner: Arc<Inner<S>>,
}

impl<S: ListService> Clone for EntityList<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: ListService> EntityList<S> {
    pub fn new(service: S) -> Self {
        let (state, _) = watch::channel(ListState::default());
        Self {
            inner: Arc::new(Inner {
                service,
                state,
                latest: AtomicU64::new(0),
            }),
        }
    }

    pub fn service(&self) -> &S {
        &self.inner.service
    }

    pub fn subscribe(&self) -> watch::Receiver<ListState<S::Record>> {
        self.inner.state.subscribe()
    }

    pub fn snapshot(&self) -> ListState<S::Record> {
        self.inner.state.borrow().clone()
    }

    pub async fn refetch(&self, filter: &S::Filter) -> RefetchOutcome {
        let token = self.inner.latest.fetch_add(1, Ordering::SeqCst) + 1;
        self.inner.state.send_modify(|state| state.loading = true);

        let result = self.inner.service.list(filter).await;

        // The token is compared under the channel's write lock so a newer
        // request cannot slip in between the check and the write.
        let applied = self.inner.state.send_if_modified(|state| {
            if self.inner.latest.load(Ordering::SeqCst) != token {
                return false;
            }
            match result {
                Ok(records) => {
                    state.data = records.into_iter().flatten().collect();
                    state.error = None;
                }
                Err(failure) => {
                    tracing::warn!("Failed to load list: {}", failure);
                    state.error = Some(failure.message);
                }
            }
            state.loading = false;
            true
        });

        if applied {
            RefetchOutcome::Applied
        } else {
            tracing::debug!("Discarding stale list response (request {})", token);
            RefetchOutcome::Superseded
        }
    }
}
