//! Generic fetch/reconcile unit bound to one remote source.
//!
//! A [`Resource`] owns a dependency value `D` and the [`HookState`] of the
//! data `T` fetched for it. Every fetch takes a ticket from a per-resource
//! counter; the result is applied only if no newer fetch was issued and the
//! dependencies did not change meanwhile, and only while the resource is
//! mounted. Anything else is discarded.

use std::{
    future::Future,
    sync::{
        Arc, Mutex, MutexGuard, PoisonError,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
};

use futures_util::future::BoxFuture;
use tokio::sync::watch;
use tracing::debug;

use super::{HookState, HookStatus};
use crate::domain::ApiError;

type Fetcher<D, T> = Arc<dyn Fn(D) -> BoxFuture<'static, Result<T, ApiError>> + Send + Sync>;

/// What happened to a fetch request.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// The response was written to the state.
    Applied,
    /// The failure was written to the state.
    Failed(ApiError),
    /// The response was stale or the resource unmounted; state untouched.
    Discarded,
    /// Dependencies were unchanged and data already present; nothing issued.
    Unchanged,
    /// A newer input arrived within the debounce window; nothing issued.
    Debounced,
}

impl FetchOutcome {
    /// Whether this request wrote its result into the state.
    pub fn was_applied(&self) -> bool {
        matches!(self, Self::Applied | Self::Failed(_))
    }
}

struct Shared<D, T> {
    fetch: Fetcher<D, T>,
    dependencies: Mutex<D>,
    issued: AtomicU64,
    mounted: AtomicBool,
    state: watch::Sender<HookState<T>>,
}

/// Clears `loading` if a fetch future is dropped before its response
/// arrives while its ticket is still the latest.
struct PendingFetch<'a, D, T> {
    shared: &'a Shared<D, T>,
    ticket: u64,
    settled: bool,
}

impl<D, T> PendingFetch<'_, D, T> {
    fn settle(mut self) {
        self.settled = true;
    }
}

impl<D, T> Drop for PendingFetch<'_, D, T> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let shared = self.shared;
        let ticket = self.ticket;
        shared.state.send_if_modified(|state| {
            if shared.issued.load(Ordering::SeqCst) != ticket {
                return false;
            }
            std::mem::replace(&mut state.loading, false)
        });
        debug!(ticket, "fetch abandoned before completion");
    }
}

/// Fetch state for dependencies `D` producing data `T`.
pub struct Resource<D, T> {
    shared: Arc<Shared<D, T>>,
}

impl<D, T> Clone for Resource<D, T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<D, T> Resource<D, T>
where
    D: Clone + PartialEq + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    /// Create an unmounted resource. Nothing is fetched until [`Self::mount`].
    pub fn new<F, Fut>(dependencies: D, fetch: F) -> Self
    where
        F: Fn(D) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        let (state, _) = watch::channel(HookState::default());
        let fetch: Fetcher<D, T> = Arc::new(move |deps| Box::pin(fetch(deps)));
        Self {
            shared: Arc::new(Shared {
                fetch,
                dependencies: Mutex::new(dependencies),
                issued: AtomicU64::new(0),
                mounted: AtomicBool::new(false),
                state,
            }),
        }
    }

    /// Mount and fetch for the current dependencies.
    pub async fn mount(&self) -> FetchOutcome {
        self.mark_mounted();
        self.refetch().await
    }

    pub(crate) fn mark_mounted(&self) {
        self.shared.mounted.store(true, Ordering::SeqCst);
    }

    /// Stop applying results. In-flight responses are discarded.
    pub fn unmount(&self) {
        self.shared.mounted.store(false, Ordering::SeqCst);
        self.invalidate();
    }

    /// Whether results are currently applied.
    pub fn is_mounted(&self) -> bool {
        self.shared.mounted.load(Ordering::SeqCst)
    }

    /// Switch to new dependencies and fetch for them.
    ///
    /// Equal dependencies with data already fetched or in flight issue
    /// nothing.
    pub async fn set_dependencies(&self, dependencies: D) -> FetchOutcome {
        if !self.replace_dependencies(dependencies) && self.state().status() != HookStatus::Idle {
            return FetchOutcome::Unchanged;
        }
        self.refetch().await
    }

    /// Store new dependencies without fetching; returns whether they changed.
    ///
    /// A change invalidates any in-flight fetch, which was issued for the old
    /// dependencies.
    pub(crate) fn replace_dependencies(&self, dependencies: D) -> bool {
        {
            let mut current = self.lock_dependencies();
            if *current == dependencies {
                return false;
            }
            *current = dependencies;
        }
        self.invalidate();
        true
    }

    /// Copy of the current dependencies.
    pub fn dependencies(&self) -> D {
        self.lock_dependencies().clone()
    }

    /// Fetch again for the current dependencies, from any state.
    pub async fn refetch(&self) -> FetchOutcome {
        let shared = &self.shared;
        if !self.is_mounted() {
            debug!("refetch ignored on unmounted resource");
            return FetchOutcome::Discarded;
        }

        let dependencies = self.dependencies();
        let mut ticket = 0;
        shared.state.send_modify(|state| {
            ticket = shared.issued.fetch_add(1, Ordering::SeqCst) + 1;
            state.begin();
        });

        let pending = PendingFetch {
            shared,
            ticket,
            settled: false,
        };
        let result = (shared.fetch)(dependencies).await;
        pending.settle();

        let mut outcome = FetchOutcome::Discarded;
        shared.state.send_if_modified(|state| {
            let current = shared.issued.load(Ordering::SeqCst) == ticket;
            if !current || !shared.mounted.load(Ordering::SeqCst) {
                return false;
            }
            match result {
                Ok(data) => {
                    state.succeed(data);
                    outcome = FetchOutcome::Applied;
                }
                Err(err) => {
                    state.fail(err.to_string());
                    outcome = FetchOutcome::Failed(err);
                }
            }
            true
        });
        if outcome == FetchOutcome::Discarded {
            debug!(ticket, "discarding stale response");
        }
        outcome
    }

    /// Apply a confirmed mutation to the current data.
    pub(crate) fn reconcile(&self, apply: impl FnOnce(&mut Option<T>)) {
        self.shared.state.send_modify(|state| apply(&mut state.data));
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> HookState<T> {
        self.shared.state.borrow().clone()
    }

    /// Watch state changes.
    pub fn subscribe(&self) -> watch::Receiver<HookState<T>> {
        self.shared.state.subscribe()
    }

    fn invalidate(&self) {
        let shared = &self.shared;
        shared.state.send_if_modified(|state| {
            shared.issued.fetch_add(1, Ordering::SeqCst);
            std::mem::replace(&mut state.loading, false)
        });
    }

    fn lock_dependencies(&self) -> MutexGuard<'_, D> {
        self.shared
            .dependencies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
