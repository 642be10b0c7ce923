//! Configuration: paths, `settings.conf` parsing, key bindings, and the color palette.

use std::sync::OnceLock;

/// Configuration parsing utilities.
mod parsing;
/// Path resolution for config, log, and cache directories.
mod paths;
/// Settings file loading.
mod settings;
/// Theme and settings type definitions.
mod types;

pub use paths::{cache_dir, config_dir, logs_dir, settings_path};
pub use settings::{load_settings, parse_settings};
pub use types::{KeyChord, KeyMap, Settings, Theme, matches_any};

/// Active palette, installed once at startup.
static THEME_STORE: OnceLock<Theme> = OnceLock::new();

/// What: Install the palette used by [`theme`].
///
/// Details:
/// - Only the first call has an effect.
pub fn init_theme(theme: Theme) {
    if THEME_STORE.set(theme).is_err() {
        tracing::debug!("theme already initialized");
    }
}

/// Return the application's theme palette (defaults until [`init_theme`] runs).
#[must_use]
pub fn theme() -> Theme {
    THEME_STORE.get().copied().unwrap_or_default()
}

#[cfg(test)]
static TEST_MUTEX: OnceLock<std::sync::Mutex<()>> = OnceLock::new();

#[cfg(test)]
/// What: Provide a process-wide mutex to serialize environment-mutating tests in this module.
pub(crate) fn test_mutex() -> &'static std::sync::Mutex<()> {
    TEST_MUTEX.get_or_init(|| std::sync::Mutex::new(()))
}
