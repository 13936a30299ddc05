//! Request-lifecycle busy indicator.
//!
//! A [`BusyGuard`] is held for the whole logical request, retries
//! included, and releases its slot on drop.

use std::fmt;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

type TransitionHook = Arc<dyn Fn(bool) + Send + Sync>;

/// Counts in-flight logical requests.
///
/// Clones share the same counter. The optional hook runs with `true` when
/// the first request starts and with `false` when the last one completes.
#[derive(Clone, Default)]
pub struct BusyIndicator {
    in_flight: Arc<AtomicUsize>,
    on_transition: Option<TransitionHook>,
}

impl fmt::Debug for BusyIndicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BusyIndicator")
            .field("in_flight", &self.in_flight())
            .field("hook", &self.on_transition.is_some())
            .finish()
    }
}

impl BusyIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indicator that calls `hook(true)` on idle→busy and `hook(false)` on
    /// busy→idle.
    pub fn with_hook(hook: impl Fn(bool) + Send + Sync + 'static) -> Self {
        Self {
            in_flight: Arc::new(AtomicUsize::new(0)),
            on_transition: Some(Arc::new(hook)),
        }
    }

    /// Indicator that shows the browser wait cursor on `document.body`
    /// while any request is in flight.
    #[cfg(target_arch = "wasm32")]
    pub fn wait_cursor() -> Self {
        Self::with_hook(|busy| {
            let body = web_sys::window()
                .and_then(|window| window.document())
                .and_then(|document| document.body());
            if let Some(body) = body {
                let cursor = if busy { "wait" } else { "default" };
                let _ = body.style().set_property("cursor", cursor);
            }
        })
    }

    pub fn acquire(&self) -> BusyGuard {
        if self.in_flight.fetch_add(1, Ordering::SeqCst) == 0 {
            self.notify(true);
        }
        BusyGuard {
            indicator: self.clone(),
        }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight() > 0
    }

    fn release(&self) {
        if self.in_flight.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.notify(false);
        }
    }

    fn notify(&self, busy: bool) {
        if let Some(hook) = &self.on_transition {
            hook(busy);
        }
    }
}

/// Marks one logical request as in flight until dropped.
#[must_use = "the request is only marked busy while the guard is alive"]
#[derive(Debug)]
pub struct BusyGuard {
    indicator: BusyIndicator,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.indicator.release();
    }
}
