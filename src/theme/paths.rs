use std::env;
use std::path::{Path, PathBuf};

/// Application directory name under the config and cache bases.
const APP_DIR: &str = "obsiver";

/// Resolve an XDG base directory from environment or default to `$HOME` + segments.
///
/// Inputs:
/// - `var`: Environment variable to check (e.g., `XDG_CACHE_HOME`).
/// - `home_default`: Fallback path segments relative to `$HOME` if `var` is unset/empty.
///
/// Output: Resolved base directory path.
fn xdg_base_dir(var: &str, home_default: &[&str]) -> PathBuf {
    if let Ok(p) = env::var(var)
        && !p.trim().is_empty()
    {
        return PathBuf::from(p);
    }
    let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
    let mut base = PathBuf::from(home);
    for seg in home_default {
        base = base.join(seg);
    }
    base
}

/// Return `$HOME/.config/obsiver`, ensuring it exists.
///
/// Output: `Some(PathBuf)` when HOME is set and directory can be created; `None` otherwise.
fn home_config_dir() -> Option<PathBuf> {
    if let Ok(home) = env::var("HOME") {
        let dir = Path::new(&home).join(".config").join(APP_DIR);
        if std::fs::create_dir_all(&dir).is_ok() {
            return Some(dir);
        }
    }
    None
}

/// Config directory (ensured to exist): `$HOME/.config/obsiver`, else `$XDG_CONFIG_HOME/obsiver`.
#[must_use]
pub fn config_dir() -> PathBuf {
    if let Some(dir) = home_config_dir() {
        return dir;
    }
    let dir = xdg_base_dir("XDG_CONFIG_HOME", &[".config"]).join(APP_DIR);
    let _ = std::fs::create_dir_all(&dir);
    dir
}

/// Logs directory under config: `$HOME/.config/obsiver/logs` (ensured to exist)
#[must_use]
pub fn logs_dir() -> PathBuf {
    let dir = config_dir().join("logs");
    let _ = std::fs::create_dir_all(&dir);
    dir
}

/// Snapshot directory: `$XDG_CACHE_HOME/obsiver` or `$HOME/.cache/obsiver`.
///
/// Not created here; snapshot writes create it on demand.
#[must_use]
pub fn cache_dir() -> PathBuf {
    xdg_base_dir("XDG_CACHE_HOME", &[".cache"]).join(APP_DIR)
}

/// Default `settings.conf` location.
#[must_use]
pub fn settings_path() -> PathBuf {
    config_dir().join("settings.conf")
}
