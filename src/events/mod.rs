//! Key handling: decode terminal key events into session [`Action`]s.
//!
//! Decoding depends on the session mode: in search mode plain characters edit
//! the query, so only non-character chords (arrows, Enter, Esc, Ctrl combos)
//! reach the navigation and toggle bindings.

use crossterm::event::{Event as CEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::state::{Action, Mode, Session};
use crate::theme::{KeyChord, KeyMap, matches_any};

/// Whether a chord would type text in the search field.
fn is_text_chord(c: &KeyChord) -> bool {
    matches!(c.code, KeyCode::Char(_))
        && !c.mods.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
}

/// Match only against chords that cannot collide with query typing.
fn matches_non_text(ev: &KeyEvent, chords: &[KeyChord]) -> bool {
    chords.iter().any(|c| !is_text_chord(c) && c.matches(ev))
}

/// Ctrl+C quits from every state.
fn is_interrupt(ev: &KeyEvent) -> bool {
    ev.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(ev.code, KeyCode::Char('c' | 'C'))
}

/// What: Decode one key press for the given mode.
///
/// Inputs:
/// - `mode`: Current session mode.
/// - `ev`: Key event.
/// - `km`: Active key bindings.
///
/// Output:
/// - `Some(Action)` when the key is bound in this mode; `None` otherwise.
#[must_use]
pub fn map_key(mode: &Mode, ev: &KeyEvent, km: &KeyMap) -> Option<Action> {
    if is_interrupt(ev) {
        return Some(Action::Quit);
    }
    match mode {
        Mode::Done(_) => None,
        Mode::Loading => matches_any(ev, &km.quit).then_some(Action::Quit),
        Mode::Confirming { .. } => {
            if matches_any(ev, &km.confirm_yes) {
                Some(Action::ConfirmYes)
            } else if matches_any(ev, &km.confirm_no) {
                Some(Action::ConfirmNo)
            } else {
                None
            }
        }
        Mode::Browsing => map_browsing(ev, km),
        Mode::Searching => map_searching(ev, km),
    }
}

fn map_browsing(ev: &KeyEvent, km: &KeyMap) -> Option<Action> {
    let table: [(&[KeyChord], Action); 16] = [
        (km.quit.as_slice(), Action::Quit),
        (km.up.as_slice(), Action::MoveUp),
        (km.down.as_slice(), Action::MoveDown),
        (km.page_up.as_slice(), Action::PageUp),
        (km.page_down.as_slice(), Action::PageDown),
        (km.top.as_slice(), Action::Top),
        (km.bottom.as_slice(), Action::Bottom),
        (km.search.as_slice(), Action::EnterSearch),
        (km.next_match.as_slice(), Action::NextMatch),
        (km.prev_match.as_slice(), Action::PrevMatch),
        (km.toggle_mobile.as_slice(), Action::ToggleMobile),
        (km.toggle_early_access.as_slice(), Action::ToggleEarlyAccess),
        (km.toggle_found_only.as_slice(), Action::ToggleFoundOnly),
        (km.toggle_sort.as_slice(), Action::ToggleSort),
        (km.submit.as_slice(), Action::Submit),
        (km.exit_search.as_slice(), Action::ExitSearch),
    ];
    table
        .iter()
        .find(|(chords, _)| matches_any(ev, chords))
        .map(|(_, action)| *action)
}

fn map_searching(ev: &KeyEvent, km: &KeyMap) -> Option<Action> {
    let table: [(&[KeyChord], Action); 14] = [
        (km.exit_search.as_slice(), Action::ExitSearch),
        (km.submit.as_slice(), Action::Submit),
        (km.next_match.as_slice(), Action::NextMatch),
        (km.prev_match.as_slice(), Action::PrevMatch),
        (km.up.as_slice(), Action::MoveUp),
        (km.down.as_slice(), Action::MoveDown),
        (km.page_up.as_slice(), Action::PageUp),
        (km.page_down.as_slice(), Action::PageDown),
        (km.top.as_slice(), Action::Top),
        (km.bottom.as_slice(), Action::Bottom),
        (km.toggle_mobile.as_slice(), Action::ToggleMobile),
        (km.toggle_early_access.as_slice(), Action::ToggleEarlyAccess),
        (km.toggle_found_only.as_slice(), Action::ToggleFoundOnly),
        (km.toggle_sort.as_slice(), Action::ToggleSort),
    ];
    if let Some((_, action)) = table
        .iter()
        .find(|(chords, _)| matches_non_text(ev, chords))
    {
        return Some(*action);
    }
    match ev.code {
        KeyCode::Backspace => Some(Action::QueryBackspace),
        KeyCode::Char(ch)
            if !ev
                .modifiers
                .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            Some(Action::QueryChar(ch))
        }
        _ => None,
    }
}

/// What: Dispatch a terminal event to the session.
///
/// Inputs:
/// - `ev`: Terminal event.
/// - `session`: Session to update.
/// - `km`: Active key bindings.
///
/// Output:
/// - `true` when the session has reached `Done`.
///
/// Details:
/// - Any key press dismisses the current notice before the key is applied.
/// - Key release/repeat events and non-key events are ignored.
pub fn handle_event(ev: &CEvent, session: &mut Session, km: &KeyMap) -> bool {
    if let CEvent::Key(ke) = ev
        && ke.kind == KeyEventKind::Press
    {
        session.dismiss_notice();
        if let Some(action) = map_key(session.mode(), ke, km) {
            tracing::trace!(?action, "key action");
            session.apply(action);
        }
    }
    session.is_done()
}
