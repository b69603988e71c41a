use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tracing::trace;

use crate::state::{self, Action, AppState};

type Listener = Box<dyn FnMut(&AppState) + Send>;

struct Inner {
    state: Mutex<AppState>,
    listeners: Mutex<Vec<(u64, Listener)>>,
    next_id: AtomicU64,
}

/// Shared state store. Cloning yields another handle to the same store.
///
/// Every `dispatch` applies the action, then calls each listener once with
/// the resulting state, in registration order, before returning. Listeners
/// must not dispatch or drop a `Subscription` from inside a notification.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<Inner>,
}

impl Dispatcher {
    pub fn new(initial: AppState) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(initial),
                listeners: Mutex::new(Vec::new()),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    pub fn state(&self) -> AppState {
        self.inner.state.lock().clone()
    }

    pub fn dispatch(&self, action: Action) {
        trace!(action = action.kind(), "dispatch");
        let snapshot = {
            let mut state = self.inner.state.lock();
            state::reduce(&mut state, action);
            state.clone()
        };
        let mut listeners = self.inner.listeners.lock();
        for (_, listener) in listeners.iter_mut() {
            listener(&snapshot);
        }
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: FnMut(&AppState) + Send + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.listeners.lock().push((id, Box::new(listener)));
        Subscription {
            id,
            inner: Arc::downgrade(&self.inner),
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner.listeners.lock().len()
    }
}

/// Registration returned by [`Dispatcher::subscribe`]. Dropping it removes the listener.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    inner: Weak<Inner>,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.listeners.lock().retain(|(id, _)| *id != self.id);
        }
    }
}
