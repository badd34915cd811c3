// ── Demo host window ──────────────────────────────────────────────────────────
//
// Responsibilities in this file (unsafe confined here):
//   • Register and create a plain top-level window.
//   • Hook it with a `DropInterceptor` and paint the last dropped paths.
//   • Run the Win32 message loop.
//   • Tear down in order: leave the loop, remove the hook, destroy the window.

#![allow(unsafe_code)]

use std::cell::RefCell;

use dropgate::{config, Activation, DropError, DropInterceptor, Result};
use tracing::{info, warn};
use windows::{
    core::{w, PCWSTR},
    Win32::{
        Foundation::{GetLastError, BOOL, HINSTANCE, HWND, LPARAM, LRESULT, RECT, WPARAM},
        Graphics::Gdi::{
            BeginPaint, DrawTextW, EndPaint, GetStockObject, InvalidateRect, DT_LEFT,
            DT_NOPREFIX, DT_TOP, DT_WORDBREAK, HBRUSH, PAINTSTRUCT, WHITE_BRUSH,
        },
        System::LibraryLoader::GetModuleHandleW,
        UI::WindowsAndMessaging::{
            CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW, GetClientRect,
            GetMessageW, LoadCursorW, MessageBoxW, PostQuitMessage, RegisterClassExW, ShowWindow,
            TranslateMessage, UpdateWindow, CS_HREDRAW, CS_VREDRAW, CW_USEDEFAULT, HMENU,
            IDC_ARROW, MB_ICONERROR, MB_OK, MSG, SW_SHOW,
            WINDOW_EX_STYLE, WM_CLOSE, WM_PAINT, WNDCLASSEXW, WS_OVERLAPPEDWINDOW,
        },
    },
};

// ── Window identity ───────────────────────────────────────────────────────────

/// Class name the interceptor is pointed at.
const CLASS_NAME: &str = "DropgateDemoWindow";

const APP_TITLE: PCWSTR = w!("Dropgate demo");

const DEFAULT_WIDTH: i32 = 720;
const DEFAULT_HEIGHT: i32 = 480;

const PLACEHOLDER: &str = "Drop files onto this window.";

thread_local! {
    /// Text painted in the client area, as UTF-16 without a terminator.
    static SHOWN: RefCell<Vec<u16>> = RefCell::new(PLACEHOLDER.encode_utf16().collect());
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Create the demo window, hook it, and drive the message loop until the
/// user closes it.
pub(crate) fn run() -> Result<()> {
    // SAFETY: the module handle of our own executable.
    let hmodule = unsafe { GetModuleHandleW(None) }?;
    let hinstance = HINSTANCE(hmodule.0);

    let class_name = wide(CLASS_NAME);
    register_class(hinstance, &class_name)?;
    let hwnd = create_window(hinstance, &class_name)?;

    // SAFETY: hwnd was just created on this thread.
    unsafe {
        let _ = ShowWindow(hwnd, SW_SHOW);
        let _ = UpdateWindow(hwnd);
    }

    let mut settings = config::load();
    settings.window_class = CLASS_NAME.to_owned();
    let mut dnd = DropInterceptor::win32(settings);
    dnd.on_drop(move |files| {
        for path in files {
            info!(%path, "dropped");
        }
        let text = if files.is_empty() {
            "(nothing was dropped)".to_owned()
        } else {
            files.paths().join("\r\n")
        };
        SHOWN.with(|shown| *shown.borrow_mut() = text.encode_utf16().collect());
        // SAFETY: hwnd stays valid until after the interceptor is
        // deactivated below, and callbacks only run while it is active.
        unsafe {
            let _ = InvalidateRect(hwnd, None, BOOL::from(true));
        }
    });

    match dnd.activate() {
        Activation::Installed(window) => info!(?window, "ready for drops"),
        other => warn!(?other, "drag and drop unavailable"),
    }

    let result = message_loop();

    dnd.deactivate();
    // SAFETY: hwnd is still valid; WM_CLOSE only posted WM_QUIT.
    unsafe { DestroyWindow(hwnd) }?;

    result
}

/// Report a startup failure when there is no console to log to.
pub(crate) fn show_error_dialog(message: &str) {
    let text = wide(message);
    // SAFETY: `text` is terminated and outlives the call.
    let _ = unsafe {
        MessageBoxW(
            HWND::default(),
            PCWSTR(text.as_ptr()),
            w!("Dropgate demo"),
            MB_OK | MB_ICONERROR,
        )
    };
}

// ── Window class ──────────────────────────────────────────────────────────────

fn register_class(hinstance: HINSTANCE, class_name: &[u16]) -> Result<()> {
    // SAFETY: system resources and stock objects; nothing here is freed.
    let (cursor, background) = unsafe {
        (
            LoadCursorW(None, IDC_ARROW)?,
            HBRUSH(GetStockObject(WHITE_BRUSH).0),
        )
    };
    let class = WNDCLASSEXW {
        cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
        style: CS_HREDRAW | CS_VREDRAW,
        lpfnWndProc: Some(wnd_proc),
        hInstance: hinstance,
        hCursor: cursor,
        hbrBackground: background,
        lpszClassName: PCWSTR(class_name.as_ptr()),
        ..Default::default()
    };
    // SAFETY: the OS copies the class name during registration.
    match unsafe { RegisterClassExW(&class) } {
        0 => Err(os_failure("RegisterClassExW")),
        _ => Ok(()),
    }
}

// ── Window creation ───────────────────────────────────────────────────────────

fn create_window(hinstance: HINSTANCE, class_name: &[u16]) -> Result<HWND> {
    // SAFETY: the class is registered and `class_name` outlives the call.
    let hwnd = unsafe {
        CreateWindowExW(
            WINDOW_EX_STYLE(0),
            PCWSTR(class_name.as_ptr()),
            APP_TITLE,
            WS_OVERLAPPEDWINDOW,
            CW_USEDEFAULT,
            CW_USEDEFAULT,
            DEFAULT_WIDTH,
            DEFAULT_HEIGHT,
            HWND::default(),
            HMENU::default(),
            hinstance,
            None,
        )
    }?;
    Ok(hwnd)
}

// ── Message loop ──────────────────────────────────────────────────────────────

/// Pump this thread's queue until `WM_QUIT`.
fn message_loop() -> Result<()> {
    let mut msg = MSG::default();
    // SAFETY: `msg` is a live local for every call in the loop.
    unsafe {
        loop {
            match GetMessageW(&mut msg, HWND::default(), 0, 0).0 {
                0 => return Ok(()),
                -1 => return Err(os_failure("GetMessageW")),
                _ => {
                    let _ = TranslateMessage(&msg);
                    DispatchMessageW(&msg);
                }
            }
        }
    }
}

// ── Window procedure ──────────────────────────────────────────────────────────

// SAFETY: registered as lpfnWndProc; once hooked, the interceptor reaches it
// through CallWindowProcW with the arguments Windows supplied.
unsafe extern "system" fn wnd_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    match msg {
        WM_PAINT => {
            paint(hwnd);
            LRESULT(0)
        }

        // Leave the loop instead of destroying: `run` removes the hook first.
        WM_CLOSE => {
            PostQuitMessage(0);
            LRESULT(0)
        }

        _ => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}

fn paint(hwnd: HWND) {
    let mut ps = PAINTSTRUCT::default();
    let mut rect = RECT::default();

    // SAFETY: called from WM_PAINT for this window; BeginPaint/EndPaint are
    // paired and the text buffer lives for the DrawTextW call.
    unsafe {
        let hdc = BeginPaint(hwnd, &mut ps);
        if GetClientRect(hwnd, &mut rect).is_ok() {
            rect.left += 12;
            rect.top += 12;
            SHOWN.with(|shown| {
                let mut text = shown.borrow().clone();
                DrawTextW(
                    hdc,
                    &mut text,
                    &mut rect,
                    DT_LEFT | DT_TOP | DT_WORDBREAK | DT_NOPREFIX,
                );
            });
        }
        let _ = EndPaint(hwnd, &ps);
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Null-terminated UTF-16 copy of `s`.
fn wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

fn os_failure(function: &'static str) -> DropError {
    // SAFETY: reads this thread's last-error value.
    let code = unsafe { GetLastError() }.0;
    DropError::Win32 { function, code }
}
