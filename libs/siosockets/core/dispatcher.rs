//! Event fan-out.
//!
//! The subscriber table maps event names to ordered handler lists. It is
//! written by caller threads via `register` and read by the connection's
//! read task during dispatch, so the table lives behind a `parking_lot`
//! read-write lock and the handler list is cloned out of the lock before
//! invocation — handlers are free to register further handlers.

use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{error, warn};

enum HandlerFn<E> {
    Sync(Box<dyn Fn(E) + Send + Sync>),
    Async(Box<dyn Fn(E) -> BoxFuture<'static, ()> + Send + Sync>),
}

/// Subscriber table plus fan-out-on-event logic, shared by all namespace
/// clients.
///
/// Handlers fire in registration order; each is isolated, so one failing
/// handler never prevents its siblings from running and never propagates to
/// the dispatch caller. Suspending handlers are spawned fire-and-forget —
/// their completion order relative to subsequent dispatches is not
/// guaranteed.
pub struct EventDispatcher<E> {
    handlers: RwLock<HashMap<String, Vec<Arc<HandlerFn<E>>>>>,
}

impl<E> EventDispatcher<E>
where
    E: Clone + Send + 'static,
{
    pub fn new() -> Self {
        Self {
            handlers: RwLock::new(HashMap::new()),
        }
    }

    /// Register a synchronous handler. Registrations for the same event
    /// accumulate; there is no unsubscribe.
    pub fn register<F>(&self, event: &str, handler: F)
    where
        F: Fn(E) + Send + Sync + 'static,
    {
        self.handlers
            .write()
            .entry(event.to_string())
            .or_default()
            .push(Arc::new(HandlerFn::Sync(Box::new(handler))));
    }

    /// Register a suspending handler, spawned on dispatch without awaiting.
    pub fn register_async<F, Fut>(&self, event: &str, handler: F)
    where
        F: Fn(E) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        self.handlers
            .write()
            .entry(event.to_string())
            .or_default()
            .push(Arc::new(HandlerFn::Async(Box::new(move |value| {
                handler(value).boxed()
            }))));
    }

    /// Number of handlers registered for an event.
    pub fn handler_count(&self, event: &str) -> usize {
        self.handlers.read().get(event).map_or(0, Vec::len)
    }

    /// Invoke every handler registered for `event`, in registration order.
    pub fn dispatch(&self, event: &str, value: E) {
        let snapshot: Vec<Arc<HandlerFn<E>>> = match self.handlers.read().get(event) {
            Some(list) => list.clone(),
            None => return,
        };

        for handler in snapshot {
            match handler.as_ref() {
                HandlerFn::Sync(f) => {
                    let value = value.clone();
                    if catch_unwind(AssertUnwindSafe(|| f(value))).is_err() {
                        error!("[ws] Handler for '{}' panicked", event);
                    }
                }
                HandlerFn::Async(f) => {
                    let fut = f(value.clone());
                    let event = event.to_string();
                    match tokio::runtime::Handle::try_current() {
                        Ok(handle) => {
                            handle.spawn(async move {
                                if AssertUnwindSafe(fut).catch_unwind().await.is_err() {
                                    error!("[ws] Async handler for '{}' panicked", event);
                                }
                            });
                        }
                        Err(_) => {
                            warn!("[ws] Dropping async handler for '{}': no runtime", event)
                        }
                    }
                }
            }
        }
    }
}

impl<E> Default for EventDispatcher<E>
where
    E: Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
