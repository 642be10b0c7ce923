use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::state::{Filters, Mode, Notice, NoticeLevel, Session};
use crate::theme::{KeyChord, KeyMap, theme};

/// Bordered query input shown while searching.
pub fn render_search_bar(f: &mut Frame, area: Rect, query: &str) {
    let th = theme();
    let line = Line::from(vec![
        Span::styled("> ", Style::default().fg(th.sapphire)),
        Span::styled(query.to_string(), Style::default().fg(th.text)),
        Span::styled("█", Style::default().fg(th.overlay1)),
    ]);
    let input = Paragraph::new(line).block(
        Block::default()
            .title(Span::styled(" Search ", Style::default().fg(th.sapphire)))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(th.sapphire))
            .style(Style::default().bg(th.base)),
    );
    f.render_widget(input, area);
}

fn flag(label: &str, on: bool) -> String {
    format!("{label}:{}", if on { "on" } else { "off" })
}

/// Filter flags as shown in the mode bar.
fn filter_summary(filters: &Filters) -> String {
    [
        flag("mobile", filters.show_mobile),
        flag("early", filters.show_early_access),
        flag("found-only", filters.found_only),
    ]
    .join(" ")
}

/// What: Render the one-line mode bar.
///
/// Output:
/// - `[NORMAL]`/`[SEARCH]` tag, filter flags, sort mode, query, and `visible/total`.
pub fn render_mode_bar(f: &mut Frame, area: Rect, session: &Session) {
    let th = theme();
    let state = session.state();
    let (tag, tag_color) = match session.mode() {
        Mode::Searching => ("[SEARCH]", th.yellow),
        Mode::Confirming { .. } => ("[CONFIRM]", th.mauve),
        _ => ("[NORMAL]", th.green),
    };
    let dim = Style::default().fg(th.subtext0);
    let mut spans = vec![
        Span::styled(
            tag,
            Style::default().fg(tag_color).add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("  {}", filter_summary(&state.filters)), dim),
        Span::styled(format!("  sort:{}", state.sort.label()), dim),
    ];
    if !state.query.is_empty() {
        spans.push(Span::styled(
            format!("  query:\"{}\"", state.query),
            Style::default().fg(th.yellow),
        ));
    }
    spans.push(Span::styled(
        format!("  {}/{}", session.visible_len(), session.rows().len()),
        Style::default().fg(th.text),
    ));
    f.render_widget(
        Paragraph::new(Line::from(spans)).style(Style::default().bg(th.mantle)),
        area,
    );
}

/// What: Cut `text` to at most `max` display columns, marking the cut with `…`.
///
/// Details:
/// - Widths are measured in terminal columns, so wide characters count double.
fn truncate_to_width(text: &str, max: usize) -> String {
    if text.width() <= max {
        return text.to_string();
    }
    let budget = max.saturating_sub(1);
    let mut used = 0;
    let mut out = String::new();
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(ch);
    }
    if max > 0 {
        out.push('…');
    }
    out
}

/// Single-line toast for the active notice.
pub fn render_notice(f: &mut Frame, area: Rect, notice: &Notice) {
    let th = theme();
    let color = match notice.level {
        NoticeLevel::Info => th.sapphire,
        NoticeLevel::Error => th.red,
    };
    let message = truncate_to_width(&notice.message, usize::from(area.width.saturating_sub(2)));
    let line = Line::from(Span::styled(
        format!(" {message} "),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    ));
    f.render_widget(
        Paragraph::new(line).style(Style::default().bg(th.base)),
        area,
    );
}

/// First chord of a binding, or an empty string when the action is unbound.
fn first_label(chords: &[KeyChord]) -> String {
    chords.first().map(KeyChord::label).unwrap_or_default()
}

/// What: Build the key hints for the current mode.
///
/// Output:
/// - `(key label, description)` pairs; unbound actions are skipped.
fn hints(mode: &Mode, km: &KeyMap) -> Vec<(String, &'static str)> {
    let pairs: Vec<(&[KeyChord], &'static str)> = match mode {
        Mode::Searching => vec![
            (km.exit_search.as_slice(), "exit search"),
            (km.next_match.as_slice(), "next"),
            (km.prev_match.as_slice(), "prev"),
            (km.submit.as_slice(), "select"),
        ],
        Mode::Confirming { .. } => vec![
            (km.confirm_yes.as_slice(), "yes"),
            (km.confirm_no.as_slice(), "no"),
        ],
        _ => vec![
            (km.down.as_slice(), "down"),
            (km.up.as_slice(), "up"),
            (km.search.as_slice(), "search"),
            (km.toggle_mobile.as_slice(), "mobile"),
            (km.toggle_early_access.as_slice(), "early"),
            (km.toggle_found_only.as_slice(), "found-only"),
            (km.toggle_sort.as_slice(), "sort"),
            (km.submit.as_slice(), "select"),
            (km.quit.as_slice(), "quit"),
        ],
    };
    pairs
        .into_iter()
        .filter(|(chords, _)| !chords.is_empty())
        .map(|(chords, desc)| (first_label(chords), desc))
        .collect()
}

/// Key hint footer for the current mode.
pub fn render_footer(f: &mut Frame, area: Rect, mode: &Mode, km: &KeyMap) {
    let th = theme();
    let mut spans = Vec::new();
    for (key, desc) in hints(mode, km) {
        spans.push(Span::styled(
            format!(" {key} "),
            Style::default().fg(th.base).bg(th.overlay1),
        ));
        spans.push(Span::styled(
            format!(" {desc}  "),
            Style::default().fg(th.subtext1),
        ));
    }
    f.render_widget(
        Paragraph::new(Line::from(spans)).style(Style::default().bg(th.base)),
        area,
    );
}
