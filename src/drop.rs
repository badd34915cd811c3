// ── Drop payload decoding ─────────────────────────────────────────────────────
//
// Turns one `WM_DROPFILES` payload into an ordered list of path strings.
// Pure safe Rust: the native `HDROP` calls sit behind `DropPayload`.

/// Index passed to `DragQueryFileW` to ask for the file count.
pub const FILE_COUNT_QUERY: u32 = 0xFFFF_FFFF;

/// Legacy `MAX_PATH` ceiling, in UTF-16 units including the terminator.
pub const MAX_PATH: usize = 260;

// ── Payload access ────────────────────────────────────────────────────────────

/// The queries available on a shell drop handle.
///
/// Mirrors `DragQueryFileW` / `DragFinish`: lengths and counts are UTF-16
/// units, never counting the terminator.
pub trait DropPayload {
    /// Number of files in the drop.
    fn file_count(&self) -> u32;

    /// Length of the path at `index`.
    fn path_len(&self, index: u32) -> u32;

    /// Copy the path at `index` into `buf`, NUL-terminated and truncated to
    /// fit.  Returns the number of units copied, excluding the terminator.
    fn read_path(&self, index: u32, buf: &mut [u16]) -> u32;

    /// Release the OS memory behind the handle.  Called exactly once.
    fn finish(&mut self);
}

/// Calls `finish` when dropped, on every exit path.
struct Finish<'a>(Box<dyn DropPayload + 'a>);

impl Drop for Finish<'_> {
    fn drop(&mut self) {
        self.0.finish();
    }
}

// ── Decoded result ────────────────────────────────────────────────────────────

/// Absolute paths from one drop, in the order the shell enumerated them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DroppedFiles(Vec<String>);

impl DroppedFiles {
    pub fn new(paths: Vec<String>) -> Self {
        Self(paths)
    }

    pub fn paths(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl<'a> IntoIterator for &'a DroppedFiles {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// ── Decoding ──────────────────────────────────────────────────────────────────

/// How large each path buffer may be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathCap {
    /// Size every buffer to the length the payload reports.
    Exact,
    /// Never hand the OS more than `MAX_PATH` units; longer paths truncate.
    Legacy,
}

impl PathCap {
    fn limit(self, wanted: usize) -> usize {
        match self {
            Self::Exact => wanted,
            Self::Legacy => wanted.min(MAX_PATH),
        }
    }
}

/// Read every path out of `payload`, then release it.
///
/// The payload is released exactly once even if a query panics.
pub fn decode(payload: Box<dyn DropPayload + '_>, cap: PathCap) -> DroppedFiles {
    let guard = Finish(payload);
    let payload = &*guard.0;

    let count = payload.file_count();
    let mut paths = Vec::with_capacity(count as usize);

    for index in 0..count {
        let len = payload.path_len(index) as usize;
        // +1 for the terminator DragQueryFileW always writes.
        let mut buf = vec![0u16; len + 1];
        let limit = cap.limit(buf.len());
        let copied = payload.read_path(index, &mut buf[..limit]) as usize;
        paths.push(String::from_utf16_lossy(&buf[..copied.min(len)]));
    }

    DroppedFiles(paths)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    /// In-memory payload that counts how often it is released.
    struct Scripted<'a> {
        paths: Vec<Vec<u16>>,
        finished: &'a Cell<u32>,
        panic_on: Option<u32>,
    }

    impl<'a> Scripted<'a> {
        fn new(paths: &[&str], finished: &'a Cell<u32>) -> Self {
            Self {
                paths: paths.iter().map(|p| p.encode_utf16().collect()).collect(),
                finished,
                panic_on: None,
            }
        }
    }

    impl DropPayload for Scripted<'_> {
        fn file_count(&self) -> u32 {
            self.paths.len() as u32
        }

        fn path_len(&self, index: u32) -> u32 {
            if self.panic_on == Some(index) {
                panic!("query failed");
            }
            self.paths[index as usize].len() as u32
        }

        fn read_path(&self, index: u32, buf: &mut [u16]) -> u32 {
            let src = &self.paths[index as usize];
            let n = src.len().min(buf.len().saturating_sub(1));
            buf[..n].copy_from_slice(&src[..n]);
            if let Some(t) = buf.get_mut(n) {
                *t = 0;
            }
            n as u32
        }

        fn finish(&mut self) {
            self.finished.set(self.finished.get() + 1);
        }
    }

    #[test]
    fn single_path() {
        let finished = Cell::new(0);
        let files = decode(
            Box::new(Scripted::new(&[r"C:\a.txt"], &finished)),
            PathCap::Exact,
        );
        assert_eq!(files.paths(), [r"C:\a.txt"]);
        assert_eq!(finished.get(), 1);
    }

    #[test]
    fn keeps_enumeration_order_and_duplicates() {
        let finished = Cell::new(0);
        let files = decode(
            Box::new(Scripted::new(
                &[r"C:\b.png", r"C:\a.txt", r"C:\b.png"],
                &finished,
            )),
            PathCap::Exact,
        );
        assert_eq!(files.paths(), [r"C:\b.png", r"C:\a.txt", r"C:\b.png"]);
    }

    #[test]
    fn zero_files_is_empty_and_still_released() {
        let finished = Cell::new(0);
        let files = decode(Box::new(Scripted::new(&[], &finished)), PathCap::Exact);
        assert!(files.is_empty());
        assert_eq!(finished.get(), 1);
    }

    #[test]
    fn non_ascii_paths_survive() {
        let finished = Cell::new(0);
        let files = decode(
            Box::new(Scripted::new(&[r"D:\données\été.wav"], &finished)),
            PathCap::Exact,
        );
        assert_eq!(files.paths(), [r"D:\données\été.wav"]);
    }

    #[test]
    fn exact_cap_keeps_long_paths_whole() {
        let long = format!(r"C:\{}", "x".repeat(400));
        let finished = Cell::new(0);
        let files = decode(
            Box::new(Scripted::new(&[long.as_str()], &finished)),
            PathCap::Exact,
        );
        assert_eq!(files.paths()[0], long);
    }

    #[test]
    fn legacy_cap_truncates_at_max_path() {
        let long = format!(r"C:\{}", "x".repeat(400));
        let finished = Cell::new(0);
        let files = decode(
            Box::new(Scripted::new(&[long.as_str(), r"C:\short"], &finished)),
            PathCap::Legacy,
        );
        assert_eq!(files.paths()[0].len(), MAX_PATH - 1);
        assert!(long.starts_with(&files.paths()[0]));
        assert_eq!(files.paths()[1], r"C:\short");
    }

    #[test]
    fn released_once_when_a_query_panics() {
        let finished = Cell::new(0);
        let mut payload = Scripted::new(&[r"C:\a.txt", r"C:\b.txt"], &finished);
        payload.panic_on = Some(1);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            decode(Box::new(payload), PathCap::Exact)
        }));
        assert!(result.is_err());
        assert_eq!(finished.get(), 1);
    }

    #[test]
    fn dropped_files_accessors() {
        let files = DroppedFiles::new(vec!["a".into(), "b".into()]);
        assert_eq!(files.len(), 2);
        assert_eq!((&files).into_iter().count(), 2);
        assert_eq!(files.into_vec(), vec!["a".to_owned(), "b".to_owned()]);
    }
}
