// ── Win32 platform implementation ─────────────────────────────────────────────
//
// The only module in the library where `unsafe` code is permitted.  Every
// `unsafe` block MUST carry a `// SAFETY:` comment that states:
//   • which invariant makes the operation sound, and
//   • what the caller is responsible for maintaining.
//
// Nothing in this module is `pub` beyond what callers genuinely need; keep the
// unsafe surface as small as possible.

#![allow(unsafe_code)]

// ── Sub-modules ───────────────────────────────────────────────────────────────

mod payload; // HDROP queries
mod window; // enumeration, subclassing, hook procedure

pub use window::Win32;
