use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::style::Color;

use crate::sources::changelog::DEFAULT_CHANGELOG_URL;
use crate::sources::engines::DEFAULT_ENGINE_MAP_URL;
use crate::sources::registry::DEFAULT_REGISTRY_URL;
use crate::state::{Filters, SortMode};

/// Application theme palette used by rendering code.
///
/// All colors are provided as [`ratatui::style::Color`] and are suitable for
/// direct use with widgets and styles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Theme {
    /// Primary background color for the canvas.
    pub base: Color,
    /// Slightly lighter background layer used behind panels.
    pub mantle: Color,
    /// Subtle surface color for the selected row.
    pub surface1: Color,
    /// Muted border color.
    pub overlay1: Color,
    /// Primary foreground text color.
    pub text: Color,
    /// Secondary text for hints and dimmed cells.
    pub subtext0: Color,
    /// Tertiary text for captions.
    pub subtext1: Color,
    /// Accent for interactive highlights.
    pub sapphire: Color,
    /// Accent for headings and modal borders.
    pub mauve: Color,
    /// Success / image found.
    pub green: Color,
    /// Search highlight and search-mode bar.
    pub yellow: Color,
    /// Error / image missing.
    pub red: Color,
}

impl Default for Theme {
    /// Catppuccin Mocha.
    fn default() -> Self {
        Self {
            base: Color::Rgb(30, 30, 46),        // #1e1e2e
            mantle: Color::Rgb(24, 24, 37),      // #181825
            surface1: Color::Rgb(69, 71, 90),    // #45475a
            overlay1: Color::Rgb(127, 132, 156), // #7f849c
            text: Color::Rgb(205, 214, 244),     // #cdd6f4
            subtext0: Color::Rgb(166, 173, 200), // #a6adc8
            subtext1: Color::Rgb(186, 194, 222), // #bac2de
            sapphire: Color::Rgb(116, 199, 236), // #74c7ec
            mauve: Color::Rgb(203, 166, 247),    // #cba6f7
            green: Color::Rgb(166, 227, 161),    // #a6e3a1
            yellow: Color::Rgb(249, 226, 175),   // #f9e2af
            red: Color::Rgb(243, 139, 168),      // #f38ba8
        }
    }
}

/// User-configurable application settings parsed from `settings.conf`.
#[derive(Clone, Debug)]
pub struct Settings {
    /// Changelog feed URL.
    pub changelog_url: String,
    /// Registry tag-listing URL.
    pub registry_url: String,
    /// Electron to Chromium table URL.
    pub engine_map_url: String,
    /// Per-request network timeout in seconds.
    pub request_timeout_secs: u64,
    /// Engine version assumed for releases older than the first one naming it.
    pub fallback_engine_version: String,
    /// Initial filter flags.
    pub filters: Filters,
    /// Initial sort mode.
    pub sort_mode: SortMode,
    /// Show the key hint footer.
    pub show_keybinds_footer: bool,
    /// Configurable key bindings.
    pub keymap: KeyMap,
    /// Color palette (overridable per color).
    pub theme: Theme,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            changelog_url: DEFAULT_CHANGELOG_URL.to_string(),
            registry_url: DEFAULT_REGISTRY_URL.to_string(),
            engine_map_url: DEFAULT_ENGINE_MAP_URL.to_string(),
            request_timeout_secs: 10,
            fallback_engine_version: crate::logic::DEFAULT_FALLBACK_ENGINE.to_string(),
            filters: Filters::default(),
            sort_mode: SortMode::default(),
            show_keybinds_footer: true,
            keymap: KeyMap::default(),
            theme: Theme::default(),
        }
    }
}

/// A single keyboard chord (modifiers + key).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct KeyChord {
    /// Key code; character keys keep their case.
    pub code: KeyCode,
    /// Required modifiers (Shift is implied by an uppercase character).
    pub mods: KeyModifiers,
}

impl KeyChord {
    /// Chord with no modifiers.
    #[must_use]
    pub const fn plain(code: KeyCode) -> Self {
        Self {
            code,
            mods: KeyModifiers::NONE,
        }
    }

    /// Chord with modifiers.
    #[must_use]
    pub const fn with(code: KeyCode, mods: KeyModifiers) -> Self {
        Self { code, mods }
    }

    /// What: Check whether a key event triggers this chord.
    ///
    /// Details:
    /// - For character keys Shift is ignored, since it is already reflected in the character's case.
    #[must_use]
    pub fn matches(&self, ev: &KeyEvent) -> bool {
        if self.code != ev.code {
            return false;
        }
        let relevant = KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SUPER;
        match self.code {
            KeyCode::Char(_) => (ev.modifiers & relevant) == (self.mods & relevant),
            _ => (ev.modifiers & (relevant | KeyModifiers::SHIFT)) == self.mods,
        }
    }

    /// Return a short display label such as "Ctrl+N", "F3", "Shift+F3", "G".
    #[must_use]
    pub fn label(&self) -> String {
        let mut parts: Vec<&'static str> = Vec::new();
        if self.mods.contains(KeyModifiers::CONTROL) {
            parts.push("Ctrl");
        }
        if self.mods.contains(KeyModifiers::ALT) {
            parts.push("Alt");
        }
        if self.mods.contains(KeyModifiers::SHIFT) {
            parts.push("Shift");
        }
        if self.mods.contains(KeyModifiers::SUPER) {
            parts.push("Super");
        }
        let key = match self.code {
            KeyCode::Char(' ') => "Space".to_string(),
            KeyCode::Char(ch) if self.mods.contains(KeyModifiers::CONTROL) => {
                ch.to_ascii_uppercase().to_string()
            }
            KeyCode::Char(ch) => ch.to_string(),
            KeyCode::Enter => "Enter".to_string(),
            KeyCode::Esc => "Esc".to_string(),
            KeyCode::Backspace => "Backspace".to_string(),
            KeyCode::Tab => "Tab".to_string(),
            KeyCode::Home => "Home".to_string(),
            KeyCode::End => "End".to_string(),
            KeyCode::PageUp => "PgUp".to_string(),
            KeyCode::PageDown => "PgDn".to_string(),
            KeyCode::Up => "↑".to_string(),
            KeyCode::Down => "↓".to_string(),
            KeyCode::Left => "←".to_string(),
            KeyCode::Right => "→".to_string(),
            KeyCode::F(n) => format!("F{n}"),
            _ => "?".to_string(),
        };
        if parts.is_empty() {
            key
        } else {
            format!("{}+{}", parts.join("+"), key)
        }
    }
}

/// Application key bindings.
/// Each action can have multiple chords.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyMap {
    /// Cursor up.
    pub up: Vec<KeyChord>,
    /// Cursor down.
    pub down: Vec<KeyChord>,
    /// Page up.
    pub page_up: Vec<KeyChord>,
    /// Page down.
    pub page_down: Vec<KeyChord>,
    /// First row.
    pub top: Vec<KeyChord>,
    /// Last row.
    pub bottom: Vec<KeyChord>,
    /// Enter search mode.
    pub search: Vec<KeyChord>,
    /// Leave search mode.
    pub exit_search: Vec<KeyChord>,
    /// Next query match.
    pub next_match: Vec<KeyChord>,
    /// Previous query match.
    pub prev_match: Vec<KeyChord>,
    /// Toggle mobile rows.
    pub toggle_mobile: Vec<KeyChord>,
    /// Toggle early-access rows.
    pub toggle_early_access: Vec<KeyChord>,
    /// Toggle image-only view.
    pub toggle_found_only: Vec<KeyChord>,
    /// Toggle sort mode.
    pub toggle_sort: Vec<KeyChord>,
    /// Select the row under the cursor.
    pub submit: Vec<KeyChord>,
    /// Accept the confirmation modal.
    pub confirm_yes: Vec<KeyChord>,
    /// Decline the confirmation modal.
    pub confirm_no: Vec<KeyChord>,
    /// Quit (outside search mode).
    pub quit: Vec<KeyChord>,
}

impl Default for KeyMap {
    fn default() -> Self {
        use KeyCode::{Char, Down, End, Enter, Esc, F, Home, PageDown, PageUp, Up};
        let p = KeyChord::plain;
        let ctrl = |c| KeyChord::with(Char(c), KeyModifiers::CONTROL);
        Self {
            up: vec![p(Char('k')), p(Up)],
            down: vec![p(Char('j')), p(Down)],
            page_up: vec![p(PageUp)],
            page_down: vec![p(PageDown)],
            top: vec![p(Home), p(Char('g'))],
            bottom: vec![p(End), p(Char('G'))],
            search: vec![p(Char('/'))],
            exit_search: vec![p(Esc)],
            next_match: vec![ctrl('n'), p(F(3))],
            prev_match: vec![ctrl('p'), KeyChord::with(F(3), KeyModifiers::SHIFT)],
            toggle_mobile: vec![p(Char('m'))],
            toggle_early_access: vec![p(Char('e'))],
            toggle_found_only: vec![p(Char('f'))],
            toggle_sort: vec![p(Char('s'))],
            submit: vec![p(Enter)],
            confirm_yes: vec![p(Enter), p(Char('y'))],
            confirm_no: vec![p(Esc), p(Char('n'))],
            quit: vec![p(Char('q'))],
        }
    }
}

/// Whether any chord in `chords` matches `ev`.
#[must_use]
pub fn matches_any(ev: &KeyEvent, chords: &[KeyChord]) -> bool {
    chords.iter().any(|c| c.matches(ev))
}
