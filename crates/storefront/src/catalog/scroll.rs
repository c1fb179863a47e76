//! Incremental reveal of a filtered product list ("infinite scroll").

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

/// Items revealed per page.
pub const PAGE_SIZE: usize = 20;

/// Artificial delay before a page advance lands.
pub const LOAD_DELAY: Duration = Duration::from_secs(1);

/// Visible-count cursor with a single in-flight advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    page_size: usize,
    visible: usize,
    loading: bool,
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(PAGE_SIZE)
    }
}

impl Paginator {
    /// Cursor starting at one page.
    #[must_use]
    pub const fn new(page_size: usize) -> Self {
        Self {
            page_size,
            visible: page_size,
            loading: false,
        }
    }

    /// Number of items revealed. May exceed the list length.
    #[must_use]
    pub const fn visible(&self) -> usize {
        self.visible
    }

    #[must_use]
    pub const fn page_size(&self) -> usize {
        self.page_size
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub const fn has_more(&self, total: usize) -> bool {
        self.visible < total
    }

    /// Whether the loading sentinel belongs under the list.
    #[must_use]
    pub const fn show_sentinel(&self, total: usize) -> bool {
        self.loading || self.has_more(total)
    }

    /// Start an advance if none is pending and items remain.
    pub const fn begin_advance(&mut self, total: usize) -> bool {
        if self.loading || !self.has_more(total) {
            return false;
        }
        self.loading = true;
        true
    }

    /// Land the pending advance: one more page, clamped to `total`.
    pub fn finish_advance(&mut self, total: usize) {
        self.visible = (self.visible + self.page_size).min(total);
        self.loading = false;
    }

    /// Abandon the pending advance without moving the cursor.
    pub const fn cancel_advance(&mut self) {
        self.loading = false;
    }

    /// The revealed prefix of `items`.
    #[must_use]
    pub fn visible_slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        items.get(..self.visible).unwrap_or(items)
    }
}

/// [`Paginator`] driven by sentinel visibility, with the delayed advance run
/// as a tokio task.
///
/// At most one advance is pending. Dropping the scroll or calling
/// [`reset`](Self::reset) aborts it.
#[derive(Debug)]
pub struct InfiniteScroll {
    state: Arc<watch::Sender<Paginator>>,
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Default for InfiniteScroll {
    fn default() -> Self {
        Self::new(PAGE_SIZE, LOAD_DELAY)
    }
}

impl InfiniteScroll {
    #[must_use]
    pub fn new(page_size: usize, delay: Duration) -> Self {
        Self {
            state: Arc::new(watch::Sender::new(Paginator::new(page_size))),
            delay,
            pending: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn paginator(&self) -> Paginator {
        *self.state.borrow()
    }

    #[must_use]
    pub fn visible(&self) -> usize {
        self.state.borrow().visible()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Paginator> {
        self.state.subscribe()
    }

    /// The sentinel under a list of `total` items became visible.
    ///
    /// Schedules an advance after the load delay and returns `true`, unless
    /// one is already pending or nothing remains to reveal. Must be called
    /// within a tokio runtime.
    pub fn sentinel_visible(&self, total: usize) -> bool {
        if !self.state.send_if_modified(|p| p.begin_advance(total)) {
            return false;
        }

        let state = Arc::clone(&self.state);
        let delay = self.delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            state.send_modify(|p| p.finish_advance(total));
            debug!(visible = state.borrow().visible(), total, "Revealed next page");
        });

        *self.pending.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
        true
    }

    /// Back to the first page, aborting any pending advance.
    pub fn reset(&self) {
        self.abort_pending();
        let page_size = self.state.borrow().page_size();
        self.state.send_replace(Paginator::new(page_size));
    }

    fn abort_pending(&self) {
        if let Some(handle) = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            handle.abort();
        }
    }
}

impl Drop for InfiniteScroll {
    fn drop(&mut self) {
        self.abort_pending();
    }
}
