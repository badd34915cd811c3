// ── Safety policy ────────────────────────────────────────────────────────────
// Unsafe code is forbidden everywhere except `window` (Win32 host window).
// Each unsafe block there MUST carry a `// SAFETY:` comment.
#![deny(unsafe_code)]

// Release builds run as a GUI application (no console window).
// Debug builds keep the console so that log output is visible.
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

#[cfg(windows)]
mod window;

use tracing_subscriber::EnvFilter;

fn init_tracing() {
    // RUST_LOG=dropgate=debug
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}

#[cfg(windows)]
fn main() {
    init_tracing();

    if let Err(e) = window::run() {
        tracing::error!(error = %e, "demo failed");
        // Show a modal error dialog — the only visible output path in a
        // release (GUI subsystem) build.
        window::show_error_dialog(&e.to_string());
        std::process::exit(1);
    }
}

#[cfg(not(windows))]
fn main() {
    init_tracing();
    tracing::error!("dropgate-demo hooks a Win32 window and only runs on Windows");
    std::process::exit(1);
}
