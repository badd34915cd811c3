// ── Hook routing ──────────────────────────────────────────────────────────────
//
// The OS calls the hook procedure with nothing but `(hwnd, msg, wparam,
// lparam)`.  This module maps that call back to the live interceptor state
// through a thread-local slot: the hooked window belongs to this thread, so
// the hook only ever runs here.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::Rc;

use tracing::{debug, error};

use crate::config::EmptyDrops;
use crate::drop::{self, DroppedFiles, PathCap};
use crate::platform::{HandlerRef, Message, WindowHandle, WindowSystem};

/// A drop callback, invoked synchronously on the UI thread.
pub type DropCallback = Box<dyn FnMut(&DroppedFiles)>;

// ── Callbacks ─────────────────────────────────────────────────────────────────

/// Registered callbacks, shared between the interceptor and its route.
///
/// A callback may pump messages (a modal dialog, say) and so let another
/// drop reach the hook while it is still running.  Such drops are queued and
/// delivered in arrival order once the running pass finishes, so every
/// callback still sees every drop exactly once and is never re-entered.
#[derive(Default)]
pub(crate) struct Callbacks {
    list: RefCell<Vec<DropCallback>>,
    pending: RefCell<VecDeque<DroppedFiles>>,
    delivering: Cell<bool>,
}

impl Callbacks {
    pub(crate) fn push(&self, callback: DropCallback) {
        self.list.borrow_mut().push(callback);
    }

    pub(crate) fn len(&self) -> usize {
        self.list.borrow().len()
    }

    /// Deliver `files` to every callback, in registration order.
    pub(crate) fn invoke(&self, files: DroppedFiles) {
        self.pending.borrow_mut().push_back(files);
        if self.delivering.replace(true) {
            debug!("drop arrived while callbacks were running; queued");
            return;
        }
        loop {
            let next = self.pending.borrow_mut().pop_front();
            let Some(files) = next else { break };
            self.run_all(&files);
        }
        self.delivering.set(false);
    }

    /// One pass over the list.  The list is taken out while running so
    /// callbacks may register more callbacks; those join the end of the list
    /// and fire from the next drop.
    fn run_all(&self, files: &DroppedFiles) {
        let mut running = std::mem::take(&mut *self.list.borrow_mut());
        for callback in running.iter_mut() {
            if catch_unwind(AssertUnwindSafe(|| callback(files))).is_err() {
                error!("drop callback panicked; message forwarding continues");
            }
        }
        let mut list = self.list.borrow_mut();
        running.append(&mut list);
        *list = running;
    }
}

// ── Route ─────────────────────────────────────────────────────────────────────

/// Everything the hook needs to handle one message for the hooked window.
pub(crate) struct Route {
    pub(crate) window: WindowHandle,
    pub(crate) previous: HandlerRef,
    pub(crate) system: Rc<dyn WindowSystem>,
    callbacks: Rc<Callbacks>,
    empty_drops: EmptyDrops,
    path_cap: PathCap,
    live: Cell<bool>,
}

impl Route {
    pub(crate) fn new(
        window: WindowHandle,
        previous: HandlerRef,
        system: Rc<dyn WindowSystem>,
        callbacks: Rc<Callbacks>,
        empty_drops: EmptyDrops,
        path_cap: PathCap,
    ) -> Self {
        Self {
            window,
            previous,
            system,
            callbacks,
            empty_drops,
            path_cap,
            live: Cell::new(true),
        }
    }

    /// Stop handling drops.  Messages still in flight keep being forwarded.
    pub(crate) fn retire(&self) {
        self.live.set(false);
    }

    /// Handle a drop if `message` is one, then forward it to the previous
    /// procedure and return that procedure's result.
    fn handle(&self, message: Message) -> isize {
        if message.is_drop() && self.live.get() {
            let files = drop::decode(self.system.open_payload(message.wparam), self.path_cap);
            self.deliver(files);
        }
        self.system.call_handler(self.previous, self.window, message)
    }

    fn deliver(&self, files: DroppedFiles) {
        if files.is_empty() && self.empty_drops == EmptyDrops::Suppress {
            debug!("empty drop suppressed");
            return;
        }
        debug!(count = files.len(), "delivering dropped files");
        self.callbacks.invoke(files);
    }
}

// ── Slot ──────────────────────────────────────────────────────────────────────

thread_local! {
    static ROUTE: RefCell<Option<Rc<Route>>> = const { RefCell::new(None) };

    /// Procedure each hooked window had before the hook, kept after the route
    /// is removed so a stale copy of the hook can still chain to the host.
    static CHAINS: RefCell<HashMap<WindowHandle, HandlerRef>> = RefCell::new(HashMap::new());
}

pub(crate) fn install(route: Rc<Route>) {
    CHAINS.with(|chains| {
        chains.borrow_mut().insert(route.window, route.previous);
    });
    ROUTE.with(|slot| *slot.borrow_mut() = Some(route));
}

/// Clear the slot if it still routes `window`.
pub(crate) fn remove(window: WindowHandle) {
    ROUTE.with(|slot| {
        let mut slot = slot.borrow_mut();
        if slot.as_ref().is_some_and(|r| r.window == window) {
            *slot = None;
        }
    });
}

/// Entry point for the hook procedure.
///
/// Returns `None` when no live route exists for `window`; the caller must
/// then fall back to `dispatch_stale`.
pub(crate) fn dispatch(window: WindowHandle, message: Message) -> Option<isize> {
    // Clone out of the slot first: both the callbacks and the previous
    // procedure may re-enter the hook or tear the route down.
    let route = ROUTE.with(|slot| slot.borrow().clone())?;
    if route.window != window {
        return None;
    }
    Some(route.handle(message))
}

/// Handle a message that reached the hook after its route was removed.
///
/// A drop payload is released unread and no callback fires.  The message is
/// then passed to the procedure the window had before it was hooked.
/// Returns `None` when that procedure is unknown, leaving default processing
/// to the caller.
pub(crate) fn dispatch_stale(
    system: &dyn WindowSystem,
    window: WindowHandle,
    message: Message,
) -> Option<isize> {
    release_orphaned(system, message);
    let previous = CHAINS.with(|chains| chains.borrow().get(&window).copied())?;
    if previous == system.hook_handler() {
        return None;
    }
    Some(system.call_handler(previous, window, message))
}

fn release_orphaned(system: &dyn WindowSystem, message: Message) {
    if message.is_drop() {
        debug!("drop arrived after deactivation; releasing payload unread");
        system.open_payload(message.wparam).finish();
    }
}
