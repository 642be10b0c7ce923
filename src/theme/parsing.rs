use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::style::Color;

use super::types::KeyChord;

/// What: Parse a single key identifier (e.g., "F3", "Esc", "/", "G") into a [`KeyCode`].
///
/// Inputs:
/// - `s`: Raw key token from a configuration string.
///
/// Output:
/// - `Some(KeyCode)` on success; `None` when the input token is unsupported.
///
/// Details:
/// - Supports function keys, navigation keys, and single printable characters.
/// - Single characters keep their case so `g` and `G` can be bound separately.
pub(crate) fn parse_key_identifier(s: &str) -> Option<KeyCode> {
    let t = s.trim();
    if t.len() > 1
        && let Some(num) = t
            .strip_prefix(['F', 'f'])
            .and_then(|x| x.parse::<u8>().ok())
    {
        return Some(KeyCode::F(num));
    }
    match t.to_ascii_uppercase().as_str() {
        "ESC" | "ESCAPE" => Some(KeyCode::Esc),
        "ENTER" | "RETURN" => Some(KeyCode::Enter),
        "TAB" => Some(KeyCode::Tab),
        "BACKSPACE" => Some(KeyCode::Backspace),
        "HOME" => Some(KeyCode::Home),
        "END" => Some(KeyCode::End),
        "PAGEUP" | "PGUP" => Some(KeyCode::PageUp),
        "PAGEDOWN" | "PGDN" => Some(KeyCode::PageDown),
        "UP" | "ARROWUP" => Some(KeyCode::Up),
        "DOWN" | "ARROWDOWN" => Some(KeyCode::Down),
        "LEFT" | "ARROWLEFT" => Some(KeyCode::Left),
        "RIGHT" | "ARROWRIGHT" => Some(KeyCode::Right),
        "SPACE" => Some(KeyCode::Char(' ')),
        _ => {
            let mut chars = t.chars();
            if let (Some(ch), None) = (chars.next(), chars.next()) {
                Some(KeyCode::Char(ch))
            } else {
                None
            }
        }
    }
}

/// What: Parse a full key chord such as "Ctrl+N" or "Shift+F3" into a [`KeyChord`].
///
/// Inputs:
/// - `text`: String combining optional modifiers with a key token.
///
/// Output:
/// - `Some(KeyChord)` when parsing succeeds; `None` on an unknown key token.
///
/// Details:
/// - Recognizes Ctrl/Alt/Shift/Super modifiers in any case.
/// - `Shift+<char>` becomes the uppercase character without a Shift modifier.
/// - Ctrl/Alt character chords are normalized to lowercase, matching what terminals report.
pub(crate) fn parse_key_chord(text: &str) -> Option<KeyChord> {
    let mut mods = KeyModifiers::empty();
    let mut key_part: Option<&str> = None;
    for part in text.split('+') {
        let p = part.trim();
        if p.is_empty() {
            continue;
        }
        match p.to_ascii_uppercase().as_str() {
            "CTRL" | "CONTROL" => mods |= KeyModifiers::CONTROL,
            "ALT" => mods |= KeyModifiers::ALT,
            "SHIFT" => mods |= KeyModifiers::SHIFT,
            "SUPER" | "META" | "WIN" => mods |= KeyModifiers::SUPER,
            _ => key_part = Some(p),
        }
    }
    // A lone "+" names the plus key itself.
    let token = key_part.unwrap_or(if text.trim() == "+" { "+" } else { "" });
    let mut code = parse_key_identifier(token)?;
    if let KeyCode::Char(ch) = code {
        if mods.contains(KeyModifiers::SHIFT) {
            mods.remove(KeyModifiers::SHIFT);
            code = KeyCode::Char(ch.to_ascii_uppercase());
        } else if mods.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) {
            code = KeyCode::Char(ch.to_ascii_lowercase());
        }
    }
    Some(KeyChord { code, mods })
}

/// What: Parse a comma-separated list of chords, skipping invalid entries.
pub(crate) fn parse_key_chords(list: &str) -> Vec<KeyChord> {
    list.split(',')
        .filter_map(|s| {
            let chord = parse_key_chord(s);
            if chord.is_none() {
                tracing::warn!(chord = s.trim(), "[Config] unrecognized key chord");
            }
            chord
        })
        .collect()
}

/// What: Parse a color literal from configuration text into a [`Color`].
///
/// Inputs:
/// - `s`: Color literal (inline comments already stripped).
///
/// Output:
/// - `Some(Color)` for `#RRGGBB` hex or `R,G,B` decimal triplets; `None` otherwise.
pub(crate) fn parse_color_value(s: &str) -> Option<Color> {
    let t = s.trim();
    if t.is_empty() {
        return None;
    }
    let h = t.strip_prefix('#').unwrap_or(t);
    if h.len() == 6 && h.chars().all(|c| c.is_ascii_hexdigit()) {
        let r = u8::from_str_radix(&h[0..2], 16).ok()?;
        let g = u8::from_str_radix(&h[2..4], 16).ok()?;
        let b = u8::from_str_radix(&h[4..6], 16).ok()?;
        return Some(Color::Rgb(r, g, b));
    }
    let parts: Vec<&str> = t.split(',').collect();
    if let [r, g, b] = parts.as_slice() {
        let r = r.trim().parse::<u8>().ok()?;
        let g = g.trim().parse::<u8>().ok()?;
        let b = b.trim().parse::<u8>().ok()?;
        return Some(Color::Rgb(r, g, b));
    }
    None
}

/// What: Interpret a config value as a boolean.
///
/// Output:
/// - `Some(true)` for `true/1/yes/on`, `Some(false)` for `false/0/no/off`, `None` otherwise.
pub(crate) fn parse_bool(val: &str) -> Option<bool> {
    match val.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// What: Strip an inline comment from a config value.
///
/// Details:
/// - A comment starts at `#` or `//` preceded by whitespace.
/// - URLs keep their `//` and `#fragment`, and hex colors keep their leading `#`.
pub(crate) fn strip_inline_comment(s: &str) -> &str {
    let cut = s
        .char_indices()
        .find(|&(i, c)| {
            let rest = &s[i + c.len_utf8()..];
            c.is_whitespace() && (rest.starts_with('#') || rest.starts_with("//"))
        })
        .map_or(s.len(), |(i, _)| i);
    s[..cut].trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    /// What: Ensure key identifier and chord parsing maps strings onto `KeyCode`/modifier combinations.
    ///
    /// Inputs:
    /// - Identifiers such as `F3`, `/`, `G`, `f`, plus chord strings `Ctrl+N`, `Shift+F3`, `Shift+g`.
    ///
    /// Output:
    /// - Returns matching `KeyCode` values with expected modifier flags.
    fn parsing_key_identifier_and_chord() {
        assert_eq!(parse_key_identifier("F3"), Some(KeyCode::F(3)));
        assert_eq!(parse_key_identifier("f"), Some(KeyCode::Char('f')));
        assert_eq!(parse_key_identifier("G"), Some(KeyCode::Char('G')));
        assert_eq!(parse_key_identifier("PgDn"), Some(KeyCode::PageDown));
        assert_eq!(parse_key_identifier("nope"), None);

        let c = parse_key_chord("Ctrl+N").expect("chord");
        assert_eq!(c.code, KeyCode::Char('n'));
        assert_eq!(c.mods, KeyModifiers::CONTROL);

        let sf = parse_key_chord("shift+F3").expect("chord");
        assert_eq!(sf.code, KeyCode::F(3));
        assert_eq!(sf.mods, KeyModifiers::SHIFT);

        let sg = parse_key_chord("Shift+g").expect("chord");
        assert_eq!(sg.code, KeyCode::Char('G'));
        assert!(sg.mods.is_empty());
    }

    #[test]
    /// What: Comma lists keep valid chords and drop invalid ones
    fn parse_chord_list() {
        let v = parse_key_chords("j, Down, bogus");
        assert_eq!(v.len(), 2);
        assert_eq!(v[1].code, KeyCode::Down);
    }

    #[test]
    /// What: Colors parse from hex and decimal triplets
    fn parse_colors() {
        assert_eq!(parse_color_value("#1e1e2e"), Some(Color::Rgb(30, 30, 46)));
        assert_eq!(parse_color_value("10, 20, 30"), Some(Color::Rgb(10, 20, 30)));
        assert_eq!(parse_color_value("300,0,0"), None);
        assert_eq!(parse_color_value("blue"), None);
    }

    #[test]
    /// What: Inline comments are stripped without breaking URLs or hex colors
    fn strips_inline_comments() {
        assert_eq!(
            strip_inline_comment("https://obsidian.md/changelog.xml # feed"),
            "https://obsidian.md/changelog.xml"
        );
        assert_eq!(strip_inline_comment("#a6e3a1 # green"), "#a6e3a1");
        assert_eq!(strip_inline_comment("true // on"), "true");
        assert_eq!(
            strip_inline_comment("https://host/tags#frag"),
            "https://host/tags#frag"
        );
        assert_eq!(
            strip_inline_comment("https://host/tags#frag\t# mirror"),
            "https://host/tags#frag"
        );
        assert_eq!(strip_inline_comment("#a6e3a1"), "#a6e3a1");
        assert_eq!(parse_bool("Yes"), Some(true));
        assert_eq!(parse_bool("off"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }
}
