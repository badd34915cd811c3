/// Dropgate build script.
///
/// The library compiles everywhere so the interception logic can be unit
/// tested off Windows; only the native backend and the demo window need the
/// Win32 API. Flag non-Windows builds so nobody mistakes the result for a
/// working shim.
fn main() {
    let target_os = std::env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
    if target_os != "windows" {
        println!(
            "cargo:warning=dropgate: building for {target_os:?}; \
             the Win32 backend is compiled out and only the portable core is available"
        );
    }

    // Only re-run the build script when it changes.
    println!("cargo:rerun-if-changed=build.rs");
}
