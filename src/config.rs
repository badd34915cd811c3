// ── Interceptor configuration ─────────────────────────────────────────────────
//
// Optional JSON file at `%APPDATA%\Dropgate\config.json`.
// No `unsafe` — pure safe Rust + serde_json.

use std::{fs, path::Path, path::PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::drop::PathCap;
use crate::error::{DropError, Result};

// ── Format version ────────────────────────────────────────────────────────────

const CONFIG_VERSION: u32 = 1;

// ── Host window classes ───────────────────────────────────────────────────────

/// Which build of the host engine owns the window.
///
/// The engine registers a different top-level class when running inside its
/// editor than in a standalone player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostBuild {
    /// Play mode inside the editor.
    Editor,
    /// Windowed or fullscreen standalone player.
    Standalone,
}

impl HostBuild {
    pub fn window_class(self) -> &'static str {
        match self {
            Self::Editor => "UnityContainerWndClass",
            Self::Standalone => "UnityWndClass",
        }
    }
}

// ── Empty drops ───────────────────────────────────────────────────────────────

/// What to do with a drop that carries no files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptyDrops {
    /// Invoke the callbacks with an empty list.
    #[default]
    Deliver,
    /// Skip the callbacks entirely.
    Suppress,
}

// ── On-disk type ──────────────────────────────────────────────────────────────

/// Settings for a `DropInterceptor`.  Every field has a default, so a partial
/// (or empty) JSON object is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterceptorConfig {
    pub version: u32,
    /// Exact class name of the window to hook.
    pub window_class: String,
    /// Hook the thread's active window when no window has `window_class`.
    pub fall_back_to_active_window: bool,
    pub empty_drops: EmptyDrops,
    /// Cap each path at `MAX_PATH` (260) UTF-16 units.
    pub legacy_path_cap: bool,
}

impl Default for InterceptorConfig {
    fn default() -> Self {
        Self::for_host(HostBuild::Standalone)
    }
}

impl InterceptorConfig {
    /// Defaults targeting the given host build's window class.
    pub fn for_host(build: HostBuild) -> Self {
        Self {
            version: CONFIG_VERSION,
            window_class: build.window_class().to_owned(),
            fall_back_to_active_window: true,
            empty_drops: EmptyDrops::Deliver,
            legacy_path_cap: false,
        }
    }

    /// Parse a configuration document, rejecting unknown format versions.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        if config.version != CONFIG_VERSION {
            return Err(DropError::ConfigVersion {
                found: config.version,
                expected: CONFIG_VERSION,
            });
        }
        Ok(config)
    }

    pub fn path_cap(&self) -> PathCap {
        if self.legacy_path_cap {
            PathCap::Legacy
        } else {
            PathCap::Exact
        }
    }

    /// Read and validate the file at `path`.
    pub fn load_from(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)?;
        Self::from_json(&data)
    }

    /// Write the configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let file = fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }
}

// ── Path ──────────────────────────────────────────────────────────────────────

/// Return the path to the config file: `%APPDATA%\Dropgate\config.json`.
///
/// Returns `None` if the `APPDATA` environment variable is not set.
pub fn config_path() -> Option<PathBuf> {
    let appdata = std::env::var_os("APPDATA")?;
    let mut p = PathBuf::from(appdata);
    p.push("Dropgate");
    p.push("config.json");
    Some(p)
}

// ── Load ──────────────────────────────────────────────────────────────────────

/// Load the user's configuration, falling back to defaults.
///
/// A missing file is normal and silent; an unreadable or invalid one is
/// logged and ignored.
pub fn load() -> InterceptorConfig {
    let Some(path) = config_path() else {
        return InterceptorConfig::default();
    };
    if !path.exists() {
        return InterceptorConfig::default();
    }
    match InterceptorConfig::load_from(&path) {
        Ok(config) => config,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ignoring configuration file");
            InterceptorConfig::default()
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
