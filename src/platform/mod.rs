// ── Platform abstraction layer ────────────────────────────────────────────────
//
// The interceptor talks to the OS exclusively through `WindowSystem`.  No
// `unsafe` lives here; all Win32 FFI is confined to the `win32` sub-module
// and never leaks outward.  Handles cross this boundary as plain integers.

#[cfg(windows)]
pub mod win32;

#[cfg(test)]
pub(crate) mod fake;

use crate::drop::DropPayload;
use crate::error::Result;

// ── Message identity ──────────────────────────────────────────────────────────

/// `WM_DROPFILES`: sent when the user drops files on a window registered with
/// `DragAcceptFiles`.  `wparam` carries the `HDROP`; `lparam` is unused.
pub const WM_DROPFILES: u32 = 0x0233;

// ── Opaque handles ────────────────────────────────────────────────────────────

/// Non-owning reference to a native top-level window (`HWND`).
///
/// The OS owns the window; holding a `WindowHandle` keeps nothing alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowHandle(pub usize);

/// Address of a window procedure, as stored in the `GWLP_WNDPROC` slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerRef(pub usize);

/// One window message, exactly as the OS delivered it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Message {
    pub id: u32,
    pub wparam: usize,
    pub lparam: isize,
}

impl Message {
    pub fn new(id: u32, wparam: usize, lparam: isize) -> Self {
        Self { id, wparam, lparam }
    }

    pub fn is_drop(&self) -> bool {
        self.id == WM_DROPFILES
    }
}

// ── OS seam ───────────────────────────────────────────────────────────────────

/// The window-manager operations the interceptor needs.
///
/// All methods are called on the thread that owns the target window.
pub trait WindowSystem {
    /// Every top-level window owned by the calling thread, in enumeration order.
    fn thread_windows(&self) -> Vec<WindowHandle>;

    /// The registered class name of `window`, or `None` if it cannot be read.
    fn class_name(&self, window: WindowHandle) -> Option<String>;

    /// The active window attached to the calling thread's message queue.
    fn active_window(&self) -> Option<WindowHandle>;

    /// `false` once `window` has been destroyed.
    fn is_window(&self, window: WindowHandle) -> bool;

    /// The procedure the OS should call once the hook is installed.
    fn hook_handler(&self) -> HandlerRef;

    /// The procedure currently installed on `window`.
    fn current_handler(&self, window: WindowHandle) -> HandlerRef;

    /// Store `handler` as the window procedure of `window`, returning the one
    /// it replaced.
    fn replace_handler(&self, window: WindowHandle, handler: HandlerRef) -> Result<HandlerRef>;

    /// Run `message` through `handler` and return its result.
    fn call_handler(&self, handler: HandlerRef, window: WindowHandle, message: Message) -> isize;

    /// Whether `window` currently accepts shell file drops.
    fn accepts_files(&self, window: WindowHandle) -> bool;

    /// Toggle whether `window` accepts shell file drops.
    fn accept_files(&self, window: WindowHandle, accept: bool);

    /// Wrap the drop handle carried in a `WM_DROPFILES` `wparam`.
    fn open_payload(&self, raw: usize) -> Box<dyn DropPayload + '_>;
}

/// Return the first window on the calling thread whose class name is exactly
/// `class_name`.
pub fn find_window_by_class(system: &dyn WindowSystem, class_name: &str) -> Option<WindowHandle> {
    system
        .thread_windows()
        .into_iter()
        .find(|&window| system.class_name(window).as_deref() == Some(class_name))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
