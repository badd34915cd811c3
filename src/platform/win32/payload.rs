// ── HDROP access ──────────────────────────────────────────────────────────────

use std::ffi::c_void;

use windows::Win32::UI::Shell::{DragFinish, DragQueryFileW, HDROP};

use crate::drop::{DropPayload, FILE_COUNT_QUERY};

/// The shell drop handle carried by one `WM_DROPFILES`.
pub(super) struct Win32Payload(HDROP);

impl Win32Payload {
    /// Wrap the raw `wparam` of a `WM_DROPFILES` message.
    pub(super) fn from_wparam(raw: usize) -> Self {
        Self(HDROP(raw as *mut c_void))
    }
}

impl DropPayload for Win32Payload {
    fn file_count(&self) -> u32 {
        // SAFETY: self.0 came from WM_DROPFILES and has not been finished;
        // `finish` is only ever called last (see drop::decode).
        unsafe { DragQueryFileW(self.0, FILE_COUNT_QUERY, None) }
    }

    fn path_len(&self, index: u32) -> u32 {
        // SAFETY: as above.  A `None` buffer makes DragQueryFileW return the
        // length without the terminator.
        unsafe { DragQueryFileW(self.0, index, None) }
    }

    fn read_path(&self, index: u32, buf: &mut [u16]) -> u32 {
        if buf.is_empty() {
            return 0;
        }
        // SAFETY: buf is a live, writable slice; DragQueryFileW writes at most
        // buf.len() units including the terminator.
        unsafe { DragQueryFileW(self.0, index, Some(buf)) }
    }

    fn finish(&mut self) {
        // SAFETY: called exactly once per handle by the decode guard or by
        // route::dispatch_stale; the handle is not used afterwards.
        unsafe { DragFinish(self.0) };
    }
}
