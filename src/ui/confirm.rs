use ratatui::{
    Frame,
    prelude::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
};

use crate::state::Selection;
use crate::theme::{KeyChord, KeyMap, theme};

/// Button caption with the bound keys, e.g. ` Yes (Enter/y) `; bare caption when unbound.
fn button_label(caption: &str, chords: &[KeyChord]) -> String {
    if chords.is_empty() {
        return format!(" {caption} ");
    }
    let keys: Vec<String> = chords.iter().map(KeyChord::label).collect();
    format!(" {caption} ({}) ", keys.join("/"))
}

/// What: Render the confirmation modal for a pending selection.
///
/// Inputs:
/// - `f`: Frame to render into
/// - `area`: Full screen area used to center the modal
/// - `selection`: Release and tag awaiting confirmation
/// - `km`: Key bindings shown on the buttons
///
/// Output:
/// - Draws a centered double-bordered box asking to proceed with the release.
pub fn render_confirm(f: &mut Frame, area: Rect, selection: &Selection, km: &KeyMap) {
    let th = theme();
    let w = area.width.saturating_sub(6).min(56);
    let h = area.height.saturating_sub(4).min(8);
    let x = area.x + (area.width.saturating_sub(w)) / 2;
    let y = area.y + (area.height.saturating_sub(h)) / 2;
    let rect = Rect {
        x,
        y,
        width: w,
        height: h,
    };
    f.render_widget(Clear, rect);
    let lines = vec![
        Line::from(Span::styled(
            format!("Proceed with Obsidian v{}?", selection.version),
            Style::default().fg(th.mauve).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!("Image tag: {}", selection.tag),
            Style::default().fg(th.subtext1),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled(
                button_label("Yes", &km.confirm_yes),
                Style::default()
                    .fg(th.base)
                    .bg(th.green)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("   "),
            Span::styled(
                button_label("No", &km.confirm_no),
                Style::default().fg(th.base).bg(th.red),
            ),
        ]),
    ];
    let boxw = Paragraph::new(lines)
        .style(Style::default().fg(th.text).bg(th.mantle))
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .title(Span::styled(
                    " Confirm Release ",
                    Style::default().fg(th.mauve).add_modifier(Modifier::BOLD),
                ))
                .borders(Borders::ALL)
                .border_type(BorderType::Double)
                .border_style(Style::default().fg(th.mauve))
                .style(Style::default().bg(th.mantle)),
        );
    f.render_widget(boxw, rect);
}
