// ── Window lookup and subclassing ─────────────────────────────────────────────
//
// Responsibilities in this file (unsafe confined here):
//   • Enumerate the calling thread's top-level windows.
//   • Read class names and the active window.
//   • Swap the GWLP_WNDPROC slot and call through to a saved procedure.
//   • Provide the hook procedure the OS calls while the interceptor is active.

use windows::Win32::{
    Foundation::{
        GetLastError, SetLastError, BOOL, HWND, LPARAM, LRESULT, TRUE, WIN32_ERROR, WPARAM,
    },
    System::Threading::GetCurrentThreadId,
    UI::{
        Shell::DragAcceptFiles,
        WindowsAndMessaging::{
            CallWindowProcW, DefWindowProcW, EnumThreadWindows, GetActiveWindow, GetClassNameW,
            GetWindowLongW, IsWindow, GWLP_WNDPROC, GWL_EXSTYLE, WNDPROC, WS_EX_ACCEPTFILES,
        },
    },
};

use super::payload::Win32Payload;
use crate::drop::DropPayload;
use crate::error::{DropError, Result};
use crate::interceptor::route;
use crate::platform::{HandlerRef, Message, WindowHandle, WindowSystem};

/// Longest window class name Win32 will register, plus the terminator.
const CLASS_NAME_CAPACITY: usize = 257;

type WndProcFn = unsafe extern "system" fn(HWND, u32, WPARAM, LPARAM) -> LRESULT;

// ── Handle conversions ────────────────────────────────────────────────────────

fn hwnd(window: WindowHandle) -> HWND {
    HWND(window.0 as *mut std::ffi::c_void)
}

fn window_handle(hwnd: HWND) -> Option<WindowHandle> {
    if hwnd.0.is_null() {
        None
    } else {
        Some(WindowHandle(hwnd.0 as usize))
    }
}

// ── GWLP_WNDPROC access ───────────────────────────────────────────────────────
//
// `*WindowLongPtrW` only exists on 64-bit targets; 32-bit user32 exports the
// plain `*WindowLongW` pair, which is pointer-sized there.

#[cfg(target_pointer_width = "64")]
unsafe fn get_window_proc(hwnd: HWND) -> usize {
    use windows::Win32::UI::WindowsAndMessaging::GetWindowLongPtrW;
    GetWindowLongPtrW(hwnd, GWLP_WNDPROC) as usize
}

#[cfg(target_pointer_width = "64")]
unsafe fn set_window_proc(hwnd: HWND, proc: usize) -> usize {
    use windows::Win32::UI::WindowsAndMessaging::SetWindowLongPtrW;
    SetWindowLongPtrW(hwnd, GWLP_WNDPROC, proc as isize) as usize
}

#[cfg(target_pointer_width = "32")]
unsafe fn get_window_proc(hwnd: HWND) -> usize {
    GetWindowLongW(hwnd, GWLP_WNDPROC) as u32 as usize
}

#[cfg(target_pointer_width = "32")]
unsafe fn set_window_proc(hwnd: HWND, proc: usize) -> usize {
    use windows::Win32::UI::WindowsAndMessaging::SetWindowLongW;
    SetWindowLongW(hwnd, GWLP_WNDPROC, proc as i32) as u32 as usize
}

// ── Native window system ──────────────────────────────────────────────────────

/// The real user32/shell32 window manager.
#[derive(Debug, Default, Clone, Copy)]
pub struct Win32;

impl WindowSystem for Win32 {
    fn thread_windows(&self) -> Vec<WindowHandle> {
        let mut found: Vec<WindowHandle> = Vec::new();
        // SAFETY: collect_window only runs during this call, while `found` is
        // alive and exclusively borrowed through the LPARAM.  The return value
        // is FALSE when the thread has no windows, which is not an error here.
        unsafe {
            let _ = EnumThreadWindows(
                GetCurrentThreadId(),
                Some(collect_window),
                LPARAM(&mut found as *mut Vec<WindowHandle> as isize),
            );
        }
        found
    }

    fn class_name(&self, window: WindowHandle) -> Option<String> {
        let mut buf = [0u16; CLASS_NAME_CAPACITY];
        // SAFETY: buf is a live local buffer; GetClassNameW writes at most
        // buf.len() units and returns the count written (0 on failure).
        let len = unsafe { GetClassNameW(hwnd(window), &mut buf) };
        if len <= 0 {
            return None;
        }
        Some(String::from_utf16_lossy(&buf[..len as usize]))
    }

    fn active_window(&self) -> Option<WindowHandle> {
        // SAFETY: GetActiveWindow takes no arguments and returns null when the
        // calling thread has no active window.
        window_handle(unsafe { GetActiveWindow() })
    }

    fn is_window(&self, window: WindowHandle) -> bool {
        // SAFETY: IsWindow accepts any value, including stale handles.
        unsafe { IsWindow(hwnd(window)) }.as_bool()
    }

    fn hook_handler(&self) -> HandlerRef {
        let proc: WndProcFn = drop_hook;
        HandlerRef(proc as usize)
    }

    fn current_handler(&self, window: WindowHandle) -> HandlerRef {
        // SAFETY: reading GWLP_WNDPROC has no side effects; an invalid handle
        // yields 0.
        HandlerRef(unsafe { get_window_proc(hwnd(window)) })
    }

    fn replace_handler(&self, window: WindowHandle, handler: HandlerRef) -> Result<HandlerRef> {
        // SAFETY: `handler` is either drop_hook (a 'static function, so it
        // stays valid for as long as it is installed) or the value this slot
        // held before we replaced it.  The window belongs to this thread.
        // SetWindowLongPtrW returns 0 both on failure and when the previous
        // value was 0, so the last-error code is cleared first to tell them apart.
        unsafe {
            SetLastError(WIN32_ERROR(0));
            let previous = set_window_proc(hwnd(window), handler.0);
            if previous == 0 {
                let code = GetLastError();
                if code.0 != 0 {
                    return Err(DropError::Win32 {
                        function: "SetWindowLongPtrW",
                        code: code.0,
                    });
                }
            }
            Ok(HandlerRef(previous))
        }
    }

    fn call_handler(&self, handler: HandlerRef, window: WindowHandle, message: Message) -> isize {
        // SAFETY: `handler` was read from the GWLP_WNDPROC slot, so it is a
        // window procedure (or a user32 thunk handle that CallWindowProcW
        // resolves).  WNDPROC is an Option of a function pointer, the same
        // size as usize, with 0 mapping to None.
        unsafe {
            let proc = std::mem::transmute::<usize, WNDPROC>(handler.0);
            CallWindowProcW(
                proc,
                hwnd(window),
                message.id,
                WPARAM(message.wparam),
                LPARAM(message.lparam),
            )
            .0
        }
    }

    fn accepts_files(&self, window: WindowHandle) -> bool {
        // SAFETY: reading the extended style has no side effects; an invalid
        // handle yields 0.
        let style = unsafe { GetWindowLongW(hwnd(window), GWL_EXSTYLE) } as u32;
        style & WS_EX_ACCEPTFILES.0 != 0
    }

    fn accept_files(&self, window: WindowHandle, accept: bool) {
        // SAFETY: the window is live and owned by this thread.
        unsafe { DragAcceptFiles(hwnd(window), BOOL::from(accept)) };
    }

    fn open_payload(&self, raw: usize) -> Box<dyn DropPayload + '_> {
        Box::new(Win32Payload::from_wparam(raw))
    }
}

// ── Callbacks handed to the OS ────────────────────────────────────────────────

// SAFETY: called by EnumThreadWindows with the LPARAM built in
// `Win32::thread_windows`, which points at a live Vec<WindowHandle>.
unsafe extern "system" fn collect_window(hwnd: HWND, lparam: LPARAM) -> BOOL {
    let found = &mut *(lparam.0 as *mut Vec<WindowHandle>);
    if let Some(window) = window_handle(hwnd) {
        found.push(window);
    }
    TRUE
}

// SAFETY: installed into GWLP_WNDPROC by `Win32::replace_handler`.  Windows
// guarantees that hwnd, msg, wparam and lparam are valid for this call.
unsafe extern "system" fn drop_hook(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    let message = Message::new(msg, wparam.0, lparam.0);
    let Some(window) = window_handle(hwnd) else {
        return DefWindowProcW(hwnd, msg, wparam, lparam);
    };
    // After deactivation a stale copy of our pointer may still be called;
    // chain to the window's own procedure from before the hook.
    let routed = route::dispatch(window, message)
        .or_else(|| route::dispatch_stale(&Win32, window, message));
    match routed {
        Some(result) => LRESULT(result),
        None => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}
