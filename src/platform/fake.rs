// ── Scripted window system for tests ──────────────────────────────────────────
//
// Stands in for user32/shell32: windows, class names and drop payloads are
// scripted up front, and every forwarded message and payload release is
// recorded so tests can assert on them.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use super::{HandlerRef, Message, WindowHandle, WindowSystem};
use crate::drop::DropPayload;
use crate::error::{DropError, Result};
use crate::interceptor::route;

/// The procedure every scripted window starts with.
pub(crate) const ORIGINAL: HandlerRef = HandlerRef(0x1000);

/// What the fake reports as the interceptor's hook procedure.
pub(crate) const HOOK: HandlerRef = HandlerRef(0xD00D);

/// `ERROR_INVALID_WINDOW_HANDLE`.
const INVALID_WINDOW: u32 = 1400;

#[derive(Default)]
pub(crate) struct FakeWindows {
    windows: RefCell<Vec<(WindowHandle, String)>>,
    destroyed: RefCell<Vec<WindowHandle>>,
    active: Cell<Option<WindowHandle>>,
    handlers: RefCell<HashMap<WindowHandle, HandlerRef>>,
    accepting: RefCell<HashMap<WindowHandle, bool>>,
    payloads: RefCell<HashMap<usize, Vec<String>>>,
    next_payload: Cell<usize>,
    finished: RefCell<Vec<usize>>,
    forwarded: RefCell<Vec<(HandlerRef, WindowHandle, Message)>>,
    refuse_install: Cell<bool>,
}

impl FakeWindows {
    pub(crate) fn new() -> Self {
        Self {
            next_payload: Cell::new(0x5000),
            ..Self::default()
        }
    }

    pub(crate) fn add_window(&self, window: WindowHandle, class: &str) {
        self.windows.borrow_mut().push((window, class.to_owned()));
        self.handlers.borrow_mut().insert(window, ORIGINAL);
    }

    pub(crate) fn set_active(&self, window: Option<WindowHandle>) {
        if let Some(w) = window {
            self.handlers.borrow_mut().entry(w).or_insert(ORIGINAL);
        }
        self.active.set(window);
    }

    pub(crate) fn destroy(&self, window: WindowHandle) {
        self.destroyed.borrow_mut().push(window);
    }

    /// Make the next `replace_handler` calls fail like `SetWindowLongPtrW` on
    /// a window owned by another process.
    pub(crate) fn refuse_install(&self, refuse: bool) {
        self.refuse_install.set(refuse);
    }

    /// Overwrite the window procedure directly, as another subclasser would.
    pub(crate) fn force_handler(&self, window: WindowHandle, handler: HandlerRef) {
        self.handlers.borrow_mut().insert(window, handler);
    }

    pub(crate) fn handler(&self, window: WindowHandle) -> HandlerRef {
        self.current_handler(window)
    }

    /// Messages that reached a non-hook procedure, in order.
    pub(crate) fn forwarded(&self) -> Vec<(HandlerRef, WindowHandle, Message)> {
        self.forwarded.borrow().clone()
    }

    /// Payload handles released so far, in order.
    pub(crate) fn finished(&self) -> Vec<usize> {
        self.finished.borrow().clone()
    }

    /// Script a drop payload and return its raw handle.
    pub(crate) fn new_payload(&self, paths: &[&str]) -> usize {
        let raw = self.next_payload.get();
        self.next_payload.set(raw + 1);
        self.payloads
            .borrow_mut()
            .insert(raw, paths.iter().map(|p| (*p).to_owned()).collect());
        raw
    }

    /// Deliver `message` the way `DispatchMessageW` would: through whatever
    /// procedure is currently installed on `window`.
    pub(crate) fn send(&self, window: WindowHandle, message: Message) -> isize {
        let handler = self.current_handler(window);
        self.call_handler(handler, window, message)
    }

    /// Script a payload for `paths` and send `WM_DROPFILES` carrying it.
    pub(crate) fn drop_files(&self, window: WindowHandle, paths: &[&str]) -> isize {
        let raw = self.new_payload(paths);
        self.send(window, Message::new(super::WM_DROPFILES, raw, 0))
    }

    /// The value every non-hook procedure returns for `message`.
    pub(crate) fn expected_result(handler: HandlerRef, message: Message) -> isize {
        (handler.0 as isize) ^ (message.id as isize) ^ message.lparam
    }
}

impl WindowSystem for FakeWindows {
    fn thread_windows(&self) -> Vec<WindowHandle> {
        self.windows
            .borrow()
            .iter()
            .map(|(w, _)| *w)
            .filter(|w| self.is_window(*w))
            .collect()
    }

    fn class_name(&self, window: WindowHandle) -> Option<String> {
        if !self.is_window(window) {
            return None;
        }
        self.windows
            .borrow()
            .iter()
            .find(|(w, _)| *w == window)
            .map(|(_, class)| class.clone())
    }

    fn active_window(&self) -> Option<WindowHandle> {
        self.active.get()
    }

    fn is_window(&self, window: WindowHandle) -> bool {
        !self.destroyed.borrow().contains(&window)
    }

    fn hook_handler(&self) -> HandlerRef {
        HOOK
    }

    fn current_handler(&self, window: WindowHandle) -> HandlerRef {
        self.handlers
            .borrow()
            .get(&window)
            .copied()
            .unwrap_or(HandlerRef(0))
    }

    fn replace_handler(&self, window: WindowHandle, handler: HandlerRef) -> Result<HandlerRef> {
        if self.refuse_install.get() || !self.is_window(window) {
            return Err(DropError::Win32 {
                function: "SetWindowLongPtrW",
                code: INVALID_WINDOW,
            });
        }
        let previous = self
            .handlers
            .borrow_mut()
            .insert(window, handler)
            .unwrap_or(HandlerRef(0));
        Ok(previous)
    }

    fn call_handler(&self, handler: HandlerRef, window: WindowHandle, message: Message) -> isize {
        if handler == HOOK {
            // Same fallback as the native hook; default processing here is
            // simply "nobody saw it".
            return route::dispatch(window, message)
                .or_else(|| route::dispatch_stale(self, window, message))
                .unwrap_or(0);
        }
        self.forwarded.borrow_mut().push((handler, window, message));
        Self::expected_result(handler, message)
    }

    fn accepts_files(&self, window: WindowHandle) -> bool {
        self.accepting.borrow().get(&window).copied().unwrap_or(false)
    }

    fn accept_files(&self, window: WindowHandle, accept: bool) {
        self.accepting.borrow_mut().insert(window, accept);
    }

    fn open_payload(&self, raw: usize) -> Box<dyn DropPayload + '_> {
        let paths = self.payloads.borrow_mut().remove(&raw).unwrap_or_default();
        Box::new(FakePayload {
            raw,
            paths: paths.iter().map(|p| p.encode_utf16().collect()).collect(),
            finished: &self.finished,
        })
    }
}

struct FakePayload<'a> {
    raw: usize,
    paths: Vec<Vec<u16>>,
    finished: &'a RefCell<Vec<usize>>,
}

impl DropPayload for FakePayload<'_> {
    fn file_count(&self) -> u32 {
        self.paths.len() as u32
    }

    fn path_len(&self, index: u32) -> u32 {
        self.paths
            .get(index as usize)
            .map_or(0, |p| p.len() as u32)
    }

    fn read_path(&self, index: u32, buf: &mut [u16]) -> u32 {
        let Some(src) = self.paths.get(index as usize) else {
            return 0;
        };
        let n = src.len().min(buf.len().saturating_sub(1));
        buf[..n].copy_from_slice(&src[..n]);
        if let Some(t) = buf.get_mut(n) {
            *t = 0;
        }
        n as u32
    }

    fn finish(&mut self) {
        self.finished.borrow_mut().push(self.raw);
    }
}
