// ── Safety policy ────────────────────────────────────────────────────────────
// Unsafe code is forbidden everywhere except `platform::win32` (Win32 FFI).
// Each unsafe block in that module MUST carry a `// SAFETY:` comment.
#![deny(unsafe_code)]

//! Receive shell file drops on a Windows window you did not create.
//!
//! A [`DropInterceptor`] finds the host's top-level window by class name,
//! subclasses it, and hands the paths from every `WM_DROPFILES` to the
//! registered callbacks before passing the message on unchanged.
//!
//! ```no_run
//! # #[cfg(windows)]
//! # fn main() {
//! use dropgate::{config, DropInterceptor};
//!
//! let mut dnd = DropInterceptor::win32(config::load());
//! dnd.on_drop(|files| {
//!     for path in files {
//!         println!("{path}");
//!     }
//! });
//! dnd.activate();
//! // ... run the host's message loop; dropping `dnd` restores the window.
//! # }
//! # #[cfg(not(windows))]
//! # fn main() {}
//! ```

pub mod config;
pub mod drop;
pub mod error;
pub mod interceptor;
pub mod platform;

pub use config::{EmptyDrops, HostBuild, InterceptorConfig};
pub use drop::DroppedFiles;
pub use error::{DropError, Result};
pub use interceptor::{Activation, DropCallback, DropInterceptor};
pub use platform::{WindowHandle, WindowSystem};
