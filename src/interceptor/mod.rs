// ── Drop interceptor ──────────────────────────────────────────────────────────
//
// Subclasses a host window it did not create: swaps in the hook procedure,
// remembers the one it replaced, and puts it back on deactivation.  Owned by
// the host's composition root; there is no global accessor, only a
// process-wide flag that keeps two interceptors from hooking at once.

pub(crate) mod route;

use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, error, info, warn};

use crate::config::InterceptorConfig;
use crate::drop::DroppedFiles;
use crate::platform::{self, WindowHandle, WindowSystem};

pub use route::DropCallback;
use route::{Callbacks, Route};

// ── Singleton claim ───────────────────────────────────────────────────────────

static ACTIVE: AtomicBool = AtomicBool::new(false);

/// Proof that this process has exactly one active interceptor.
struct Claim;

impl Claim {
    fn acquire() -> Option<Self> {
        ACTIVE
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Claim)
    }
}

impl Drop for Claim {
    fn drop(&mut self) {
        ACTIVE.store(false, Ordering::Release);
    }
}

// ── Installed state ───────────────────────────────────────────────────────────

/// The hook while it sits on the window.  Dropping it restores the previous
/// procedure and drop-target state, then releases the singleton claim.
struct Installation {
    route: Rc<Route>,
    was_accepting: bool,
    _claim: Claim,
}

impl Drop for Installation {
    fn drop(&mut self) {
        let route = &*self.route;
        let window = route.window;

        route::remove(window);
        route.retire();

        if !route.system.is_window(window) {
            debug!(?window, "host window already destroyed; nothing to restore");
            return;
        }
        if route.system.current_handler(window) != route.system.hook_handler() {
            warn!(
                ?window,
                "window procedure was replaced after the drop hook was installed; restoring the original anyway"
            );
        }
        match route.system.replace_handler(window, route.previous) {
            Ok(_) => debug!(?window, "original window procedure restored"),
            Err(e) => error!(?window, error = %e, "failed to restore window procedure"),
        }
        if !self.was_accepting {
            route.system.accept_files(window, false);
        }
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Outcome of [`DropInterceptor::activate`].
///
/// Activation never fails loudly: every non-`Installed` outcome has already
/// been logged and leaves the interceptor inert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// The hook is on `WindowHandle` and drops will be delivered.
    Installed(WindowHandle),
    /// An interceptor (this one or another) is already active.
    AlreadyActive,
    /// No window matched the configured class and no fallback was found.
    NoWindow,
    /// The OS refused to replace the window procedure.
    Failed,
}

/// Receives shell file drops on the host's top-level window.
///
/// Register callbacks with [`on_drop`](Self::on_drop), then call
/// [`activate`](Self::activate) once the host window exists.  Dropping the
/// interceptor deactivates it.
pub struct DropInterceptor {
    system: Rc<dyn WindowSystem>,
    config: InterceptorConfig,
    callbacks: Rc<Callbacks>,
    installed: Option<Installation>,
}

impl DropInterceptor {
    pub fn new(system: Rc<dyn WindowSystem>, config: InterceptorConfig) -> Self {
        Self {
            system,
            config,
            callbacks: Rc::default(),
            installed: None,
        }
    }

    /// An interceptor backed by the native Win32 window manager.
    #[cfg(windows)]
    pub fn win32(config: InterceptorConfig) -> Self {
        Self::new(Rc::new(platform::win32::Win32), config)
    }

    /// Register `callback` to run once per drop, after earlier callbacks.
    pub fn on_drop(&self, callback: impl FnMut(&DroppedFiles) + 'static) {
        self.callbacks.push(Box::new(callback));
    }

    pub fn callback_count(&self) -> usize {
        self.callbacks.len()
    }

    pub fn config(&self) -> &InterceptorConfig {
        &self.config
    }

    pub fn is_active(&self) -> bool {
        self.installed.is_some()
    }

    /// The hooked window while active.
    pub fn window(&self) -> Option<WindowHandle> {
        self.installed.as_ref().map(|i| i.route.window)
    }

    /// Find the host window and install the drop hook on it.
    pub fn activate(&mut self) -> Activation {
        if self.installed.is_some() {
            warn!("drop interceptor is already active");
            return Activation::AlreadyActive;
        }
        let Some(claim) = Claim::acquire() else {
            warn!("only one drop interceptor can be active at a time; keeping the existing one");
            return Activation::AlreadyActive;
        };

        let Some(window) = self.resolve_window() else {
            error!(
                class = %self.config.window_class,
                "could not find the host window; file drops are disabled"
            );
            return Activation::NoWindow;
        };

        let previous = match self
            .system
            .replace_handler(window, self.system.hook_handler())
        {
            Ok(previous) => previous,
            Err(e) => {
                error!(?window, error = %e, "could not install the drop hook");
                return Activation::Failed;
            }
        };

        let route = Rc::new(Route::new(
            window,
            previous,
            Rc::clone(&self.system),
            Rc::clone(&self.callbacks),
            self.config.empty_drops,
            self.config.path_cap(),
        ));
        route::install(Rc::clone(&route));
        let was_accepting = self.system.accepts_files(window);
        self.system.accept_files(window, true);

        self.installed = Some(Installation {
            route,
            was_accepting,
            _claim: claim,
        });
        info!(?window, "drop hook installed");
        Activation::Installed(window)
    }

    /// Restore the original window procedure.  No-op when not active.
    pub fn deactivate(&mut self) {
        if self.installed.take().is_some() {
            info!("drop hook removed");
        }
    }

    fn resolve_window(&self) -> Option<WindowHandle> {
        let class = self.config.window_class.as_str();
        if let Some(window) = platform::find_window_by_class(&*self.system, class) {
            return Some(window);
        }
        if !self.config.fall_back_to_active_window {
            return None;
        }
        warn!(class, "host window class not found, trying the active window");
        self.system.active_window()
    }
}

impl Drop for DropInterceptor {
    fn drop(&mut self) {
        self.deactivate();
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
