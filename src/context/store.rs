//! Per-task storage of the bound request context.

use std::cell::RefCell;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock, Mutex};

use tokio::task;

use super::BoundContext;
use crate::core::{Request, ResponseHandle};

static NEXT_STORE_ID: AtomicU64 = AtomicU64::new(1);

/// Bindings held by one logical task, at most one per store.
#[derive(Clone, Default)]
struct Slots {
    entries: Vec<(u64, Arc<BoundContext>)>,
}

impl Slots {
    fn get(&self, store: u64) -> Option<Arc<BoundContext>> {
        self.entries
            .iter()
            .find(|(id, _)| *id == store)
            .map(|(_, ctx)| Arc::clone(ctx))
    }

    fn insert(&mut self, store: u64, ctx: Arc<BoundContext>) -> Option<Arc<BoundContext>> {
        match self.entries.iter_mut().find(|(id, _)| *id == store) {
            Some((_, slot)) => Some(std::mem::replace(slot, ctx)),
            None => {
                self.entries.push((store, ctx));
                None
            }
        }
    }

    fn remove(&mut self, store: u64) -> Option<Arc<BoundContext>> {
        let pos = self.entries.iter().position(|(id, _)| *id == store)?;
        Some(self.entries.swap_remove(pos).1)
    }
}

tokio::task_local! {
    static TASK_SLOTS: RefCell<Slots>;
}

// Spawned tokio tasks outside any task scope, keyed by task id. Entries are
// dropped as soon as their last binding goes.
static SPAWNED_SLOTS: LazyLock<Mutex<HashMap<task::Id, Slots>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

// Fallback for code running outside any tokio task: the thread is the task.
thread_local! {
    static THREAD_SLOTS: RefCell<Slots> = RefCell::new(Slots::default());
}

/// Run `f` against the slot table of the current logical task.
///
/// Returns `None` only while thread-local storage is being torn down.
fn with_slots<R>(f: impl FnOnce(&mut Slots) -> R) -> Option<R> {
    if TASK_SLOTS.try_with(|_| ()).is_ok() {
        return TASK_SLOTS.try_with(|slots| f(&mut slots.borrow_mut())).ok();
    }

    if let Some(id) = task::try_id() {
        let mut table = SPAWNED_SLOTS.lock().unwrap_or_else(|e| e.into_inner());
        let slots = table.entry(id).or_default();
        let result = f(slots);
        if slots.entries.is_empty() {
            table.remove(&id);
        }
        return Some(result);
    }

    THREAD_SLOTS.try_with(|slots| f(&mut slots.borrow_mut())).ok()
}

/// Run `fut` as its own logical task.
///
/// The future gets a private slot table seeded with the bindings of the
/// enclosing logical task. Bindings made inside never leak out, and futures
/// interleaved on the same tokio task through `join!` or `select!` never see
/// each other's bindings.
pub fn task_scope<F: Future>(fut: F) -> impl Future<Output = F::Output> {
    let inherited = with_slots(|slots| slots.clone()).unwrap_or_default();
    TASK_SLOTS.scope(RefCell::new(inherited), fut)
}

/// Binds at most one request/response pair to each logical task.
///
/// A logical task is, in order of precedence:
///
/// 1. a future running inside [`task_scope`] (the context middleware runs
///    every request this way),
/// 2. a spawned tokio task, identified by its [`task::Id`], so a binding
///    follows the task across worker threads,
/// 3. the current OS thread, for code outside any tokio task.
///
/// Operations never block on other tasks and never observe bindings made by
/// other tasks. A spawned task that binds directly must unbind (or drop its
/// [`Binding`]) before it finishes.
///
/// The store is a cheap `Copy` handle; copies share bindings, separately
/// created stores do not.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ScopedContextStore {
    id: u64,
}

impl ScopedContextStore {
    pub fn new() -> Self {
        Self {
            id: NEXT_STORE_ID.fetch_add(1, Ordering::Relaxed),
        }
    }

    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Bind a request/response pair to the current task, replacing any
    /// previous binding. A `None` request unbinds instead.
    pub fn bind(
        &self,
        request: impl Into<Option<Arc<Request>>>,
        response: impl Into<Option<ResponseHandle>>,
    ) {
        match request.into() {
            Some(request) => {
                self.replace(Arc::new(BoundContext::new(request, response.into())));
            }
            None => self.unbind(),
        }
    }

    /// Remove the binding of the current task. No-op when unbound.
    pub fn unbind(&self) {
        let removed = with_slots(|slots| slots.remove(self.id)).flatten();
        if removed.is_some() {
            tracing::trace!(store = self.id, "request context unbound");
        }
    }

    /// Context bound to the current task.
    pub fn current_context(&self) -> Option<Arc<BoundContext>> {
        with_slots(|slots| slots.get(self.id)).flatten()
    }

    pub fn current_request(&self) -> Option<Arc<Request>> {
        self.current_context().map(|ctx| Arc::clone(ctx.request()))
    }

    pub fn current_response(&self) -> Option<ResponseHandle> {
        self.current_context()
            .and_then(|ctx| ctx.response().cloned())
    }

    #[inline]
    pub fn is_bound(&self) -> bool {
        self.current_context().is_some()
    }

    /// Bind for the lifetime of the returned guard.
    ///
    /// Dropping the guard (normal return, `?`, panic unwinding or future
    /// cancellation) restores whatever was bound before, which is usually
    /// nothing.
    pub fn enter(&self, request: Arc<Request>, response: Option<ResponseHandle>) -> Binding {
        let previous = self.replace(Arc::new(BoundContext::new(request, response)));
        Binding {
            store: *self,
            previous,
        }
    }

    /// Run blocking work with a context captured on another task.
    ///
    /// Used to carry the binding into `spawn_blocking` closures or worker
    /// threads, where the originating task scope is not visible.
    pub fn run_blocking<R>(&self, context: Arc<BoundContext>, f: impl FnOnce() -> R) -> R {
        let previous = self.replace(context);
        let _binding = Binding {
            store: *self,
            previous,
        };
        f()
    }

    /// Run `fut` as its own logical task. See [`task_scope`].
    #[inline]
    pub fn scope<F: Future>(&self, fut: F) -> impl Future<Output = F::Output> {
        task_scope(fut)
    }

    fn replace(&self, ctx: Arc<BoundContext>) -> Option<Arc<BoundContext>> {
        tracing::trace!(
            store = self.id,
            path = ctx.request().path(),
            "request context bound"
        );
        with_slots(|slots| slots.insert(self.id, ctx)).flatten()
    }
}

impl Default for ScopedContextStore {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII binding created by [`ScopedContextStore::enter`].
///
/// Must be dropped on the task (or thread) that created it.
#[must_use = "the request context is unbound as soon as the binding is dropped"]
pub struct Binding {
    store: ScopedContextStore,
    previous: Option<Arc<BoundContext>>,
}

impl Binding {
    pub fn store(&self) -> ScopedContextStore {
        self.store
    }
}

impl Drop for Binding {
    fn drop(&mut self) {
        match self.previous.take() {
            Some(previous) => {
                with_slots(|slots| slots.insert(self.store.id, previous));
            }
            None => self.store.unbind(),
        }
    }
}
