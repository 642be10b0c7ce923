use std::fs;
use std::path::Path;

use ratatui::style::Color;
use tracing::{debug, warn};

use super::parsing::{parse_bool, parse_color_value, parse_key_chords, strip_inline_comment};
use super::types::{KeyChord, KeyMap, Settings, Theme};
use crate::state::SortMode;

/// What: Load settings from a `settings.conf` file.
///
/// Inputs:
/// - `path`: Settings file; a missing or unreadable file yields defaults.
///
/// Output:
/// - Parsed `Settings`, with defaults for anything absent or invalid.
#[must_use]
pub fn load_settings(path: &Path) -> Settings {
    let mut out = Settings::default();
    match fs::read_to_string(path) {
        Ok(content) => {
            debug!(path = %path.display(), bytes = content.len(), "[Config] Loaded settings.conf");
            parse_settings(&content, &mut out);
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "[Config] settings.conf not found, using defaults");
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "[Config] settings.conf unreadable, using defaults");
        }
    }
    out
}

/// What: Parse settings.conf content into `settings`.
///
/// Inputs:
/// - `content`: File content.
/// - `settings`: Settings to update in place.
///
/// Details:
/// - `key = value` lines; `#`, `//`, and `;` start comment lines; inline comments are stripped.
/// - Keys are normalized to lowercase with `.`, `-` and spaces mapped to `_`.
/// - Unknown keys are ignored; invalid values keep the previous value.
pub fn parse_settings(content: &str, settings: &mut Settings) {
    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty()
            || trimmed.starts_with('#')
            || trimmed.starts_with("//")
            || trimmed.starts_with(';')
        {
            continue;
        }
        let Some((raw_key, raw_val)) = trimmed.split_once('=') else {
            continue;
        };
        let key = raw_key.trim().to_lowercase().replace(['.', '-', ' '], "_");
        let val = strip_inline_comment(raw_val.trim());
        if let Some(action) = key.strip_prefix("keybind_") {
            apply_keybind(action, val, &mut settings.keymap);
            continue;
        }
        if let Some(name) = key.strip_prefix("color_") {
            apply_color(name, val, &mut settings.theme);
            continue;
        }
        match key.as_str() {
            "changelog_url" | "feed_url" => set_nonempty(&mut settings.changelog_url, val),
            "registry_url" | "tags_url" => set_nonempty(&mut settings.registry_url, val),
            "engine_map_url" | "electron_map_url" => {
                set_nonempty(&mut settings.engine_map_url, val);
            }
            "request_timeout_secs" | "timeout_secs" => {
                if let Ok(v) = val.parse::<u64>()
                    && v > 0
                {
                    settings.request_timeout_secs = v;
                }
            }
            "fallback_engine_version" | "fallback_electron_version" => {
                set_nonempty(&mut settings.fallback_engine_version, val);
            }
            "show_mobile" => set_bool(&mut settings.filters.show_mobile, val),
            "show_early_access" => set_bool(&mut settings.filters.show_early_access, val),
            "found_only" | "image_only" => set_bool(&mut settings.filters.found_only, val),
            "show_keybinds_footer" => set_bool(&mut settings.show_keybinds_footer, val),
            "sort_mode" => {
                if let Some(sm) = SortMode::from_config_key(val) {
                    settings.sort_mode = sm;
                } else {
                    warn!(value = val, "[Config] unknown sort_mode");
                }
            }
            _ => debug!(key = %key, "[Config] ignoring unknown setting"),
        }
    }
}

fn set_nonempty(target: &mut String, val: &str) {
    if !val.is_empty() {
        *target = val.to_string();
    }
}

fn set_bool(target: &mut bool, val: &str) {
    if let Some(b) = parse_bool(val) {
        *target = b;
    }
}

/// What: Replace the bindings of one action with the chords listed in `val`.
///
/// Details:
/// - An empty or fully invalid list keeps the defaults.
fn apply_keybind(action: &str, val: &str, keymap: &mut KeyMap) {
    let chords = parse_key_chords(val);
    if chords.is_empty() {
        return;
    }
    let target: &mut Vec<KeyChord> = match action {
        "up" | "move_up" => &mut keymap.up,
        "down" | "move_down" => &mut keymap.down,
        "page_up" => &mut keymap.page_up,
        "page_down" => &mut keymap.page_down,
        "top" | "first" => &mut keymap.top,
        "bottom" | "last" => &mut keymap.bottom,
        "search" => &mut keymap.search,
        "exit_search" => &mut keymap.exit_search,
        "next_match" => &mut keymap.next_match,
        "prev_match" | "previous_match" => &mut keymap.prev_match,
        "toggle_mobile" => &mut keymap.toggle_mobile,
        "toggle_early_access" | "toggle_early" => &mut keymap.toggle_early_access,
        "toggle_found_only" | "toggle_found" => &mut keymap.toggle_found_only,
        "toggle_sort" => &mut keymap.toggle_sort,
        "submit" | "select" => &mut keymap.submit,
        "confirm_yes" => &mut keymap.confirm_yes,
        "confirm_no" => &mut keymap.confirm_no,
        "quit" | "exit" => &mut keymap.quit,
        other => {
            debug!(action = other, "[Config] ignoring unknown keybind");
            return;
        }
    };
    *target = Vec::with_capacity(chords.len());
    for ch in chords {
        if !target.contains(&ch) {
            target.push(ch);
        }
    }
}

fn apply_color(name: &str, val: &str, theme: &mut Theme) {
    let Some(color) = parse_color_value(val) else {
        warn!(color = name, value = val, "[Config] invalid color value");
        return;
    };
    let slot: &mut Color = match name {
        "base" | "background" => &mut theme.base,
        "mantle" => &mut theme.mantle,
        "surface1" | "selection" => &mut theme.surface1,
        "overlay1" | "border" => &mut theme.overlay1,
        "text" => &mut theme.text,
        "subtext0" => &mut theme.subtext0,
        "subtext1" => &mut theme.subtext1,
        "sapphire" | "accent" => &mut theme.sapphire,
        "mauve" | "heading" => &mut theme.mauve,
        "green" | "success" => &mut theme.green,
        "yellow" | "highlight" => &mut theme.yellow,
        "red" | "error" => &mut theme.red,
        _ => return,
    };
    *slot = color;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};

    #[test]
    /// What: Recognised keys override defaults and junk is ignored.
    ///
    /// Inputs:
    /// - settings.conf text with URLs, numbers, booleans, sort mode, colors, comments, bad values.
    ///
    /// Output:
    /// - Matching fields updated; invalid ones left at defaults.
    fn parse_settings_values() {
        let mut s = Settings::default();
        parse_settings(
            "# comment\n\
             changelog_url = http://localhost:8080/feed.xml # local\n\
             registry_url = http://localhost:8080/tags#mirror\n\
             Request-Timeout-Secs = 3\n\
             fallback_engine_version = 12.0.0\n\
             show_mobile = no\n\
             found_only = yes\n\
             show_early_access = sometimes\n\
             sort_mode = version\n\
             color_green = #00ff00\n\
             color_red = nope\n\
             ; another comment\n\
             not a setting\n",
            &mut s,
        );
        assert_eq!(s.changelog_url, "http://localhost:8080/feed.xml");
        assert_eq!(s.registry_url, "http://localhost:8080/tags#mirror");
        assert_eq!(s.request_timeout_secs, 3);
        assert_eq!(s.fallback_engine_version, "12.0.0");
        assert!(!s.filters.show_mobile);
        assert!(s.filters.found_only);
        assert!(s.filters.show_early_access);
        assert_eq!(s.sort_mode, SortMode::PureVersionDesc);
        assert_eq!(s.theme.green, Color::Rgb(0, 255, 0));
        assert_eq!(s.theme.red, Theme::default().red);
    }

    #[test]
    /// What: Keybind lines replace an action's chords
    fn parse_keybind_overrides() {
        let mut s = Settings::default();
        parse_settings(
            "keybind_quit = Ctrl+Q, x\nkeybind_next_match = F4\nkeybind_bogus = z\nkeybind_up = ???\n",
            &mut s,
        );
        assert_eq!(s.keymap.quit.len(), 2);
        assert_eq!(s.keymap.quit[0].code, KeyCode::Char('q'));
        assert_eq!(s.keymap.quit[0].mods, KeyModifiers::CONTROL);
        assert_eq!(s.keymap.next_match[0].code, KeyCode::F(4));
        assert_eq!(s.keymap.up, KeyMap::default().up);
    }

    #[test]
    /// What: A missing file yields defaults
    fn load_missing_file_is_default() {
        let dir = tempfile::tempdir().expect("tempdir");
        let s = load_settings(&dir.path().join("settings.conf"));
        assert_eq!(s.request_timeout_secs, 10);
        assert_eq!(s.fallback_engine_version, "13.0.0");
    }
}
