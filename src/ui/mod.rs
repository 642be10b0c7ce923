//! Frame rendering. Everything here reads the [`Session`]; the only write is the
//! page size reported back from the table viewport.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};

use crate::state::{InputMode, Mode, Session};
use crate::theme::{KeyMap, theme};

/// Confirmation modal.
mod confirm;
/// Mode bar, search bar, notice toast, and key hint footer.
mod status;
/// Release table.
mod table;

pub use table::highlight_line;

/// Spinner frames for the loading panel.
const SPINNER: [&str; 8] = ["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"];

/// Per-frame inputs that do not live in the session.
pub struct ViewContext<'a> {
    /// Tick counter driving the loading spinner.
    pub spinner: usize,
    /// Active key bindings, for the footer hints.
    pub keymap: &'a KeyMap,
    /// Whether the key hint footer is drawn.
    pub show_footer: bool,
}

/// What: Render one full frame.
///
/// Inputs:
/// - `f`: Frame to render into
/// - `session`: Session to display; its page size is updated from the table height
/// - `ctx`: Spinner position and footer preferences
///
/// Output:
/// - Draws the loading panel, or the title bar, table, optional search bar, mode bar,
///   notice toast, footer, and the confirmation modal when one is open.
pub fn ui(f: &mut Frame, session: &mut Session, ctx: &ViewContext<'_>) {
    let th = theme();
    let area = f.area();
    f.render_widget(Block::default().style(Style::default().bg(th.base)), area);

    if matches!(session.mode(), Mode::Loading) {
        render_loading(f, area, ctx.spinner);
        return;
    }

    let searching = matches!(
        session.mode(),
        Mode::Searching
            | Mode::Confirming {
                previous: InputMode::Searching,
                ..
            }
    );
    let mut constraints = vec![Constraint::Length(1), Constraint::Min(4)];
    if searching {
        constraints.push(Constraint::Length(3));
    }
    constraints.push(Constraint::Length(1));
    if session.notice().is_some() {
        constraints.push(Constraint::Length(1));
    }
    if ctx.show_footer {
        constraints.push(Constraint::Length(1));
    }
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    let mut slot = chunks.iter().copied();
    let (Some(title_area), Some(table_area)) = (slot.next(), slot.next()) else {
        return;
    };
    render_title(f, title_area);

    // Borders and header row take three lines.
    session.set_page_size(usize::from(table_area.height.saturating_sub(3)));
    table::render_table(f, table_area, session);

    if searching && let Some(search_area) = slot.next() {
        status::render_search_bar(f, search_area, &session.state().query);
    }
    if let Some(mode_area) = slot.next() {
        status::render_mode_bar(f, mode_area, session);
    }
    if let Some(notice) = session.notice()
        && let Some(toast_area) = slot.next()
    {
        status::render_notice(f, toast_area, notice);
    }
    if ctx.show_footer
        && let Some(footer_area) = slot.next()
    {
        status::render_footer(f, footer_area, session.mode(), ctx.keymap);
    }

    if let Mode::Confirming { selection, .. } = session.mode() {
        confirm::render_confirm(f, area, selection, ctx.keymap);
    }
}

fn render_title(f: &mut Frame, area: Rect) {
    let th = theme();
    let line = Line::from(vec![
        Span::styled(
            " obsiver ",
            Style::default()
                .fg(th.base)
                .bg(th.mauve)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            "  Obsidian releases and container images",
            Style::default().fg(th.subtext1),
        ),
    ]);
    f.render_widget(
        Paragraph::new(line).style(Style::default().bg(th.base)),
        area,
    );
}

/// What: Draw the centered "Syncing release data…" panel.
///
/// Details:
/// - The spinner frame is picked from `tick` modulo the frame count.
fn render_loading(f: &mut Frame, area: Rect, tick: usize) {
    let th = theme();
    let w = area.width.saturating_sub(4).min(44);
    let h = area.height.min(5);
    let rect = Rect {
        x: area.x + (area.width.saturating_sub(w)) / 2,
        y: area.y + (area.height.saturating_sub(h)) / 2,
        width: w,
        height: h,
    };
    let frame = SPINNER[tick % SPINNER.len()];
    let lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled(format!("{frame} "), Style::default().fg(th.sapphire)),
            Span::styled("Syncing release data…", Style::default().fg(th.text)),
        ]),
    ];
    let panel = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(th.overlay1))
            .style(Style::default().bg(th.mantle)),
    );
    f.render_widget(panel, rect);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{
        Action, Availability, LoadedData, Platform, ReconciledRow, SessionState,
    };
    use ratatui::{Terminal, backend::TestBackend};

    fn screen_text(term: &Terminal<TestBackend>) -> String {
        term.backend()
            .buffer()
            .content()
            .iter()
            .map(ratatui::buffer::Cell::symbol)
            .collect()
    }

    fn loaded_session() -> Session {
        let mut s = Session::new(SessionState::default());
        s.on_loaded(LoadedData {
            rows: vec![
                ReconciledRow::new(
                    "1.5.3".into(),
                    Platform::Desktop,
                    "2024-01-10T12:00:00Z".into(),
                    Availability::Found,
                    "28.1.0".into(),
                    "120.0.6099.56".into(),
                    false,
                    Some("1.5.3".into()),
                ),
                ReconciledRow::new(
                    "1.5.2".into(),
                    Platform::Desktop,
                    "2024-01-02T12:00:00Z".into(),
                    Availability::Missing,
                    "28.1.0".into(),
                    "120.0.6099.56".into(),
                    false,
                    None,
                ),
            ],
            source_errors: Vec::new(),
            cached_sources: Vec::new(),
        });
        s
    }

    /// What: Loading state draws only the sync panel.
    ///
    /// Inputs:
    /// - Fresh session in `Loading`
    ///
    /// Output:
    /// - Screen contains the sync message and no table header.
    #[test]
    fn loading_renders_sync_panel() {
        let mut term = Terminal::new(TestBackend::new(80, 20)).expect("terminal");
        let mut session = Session::new(SessionState::default());
        let km = KeyMap::default();
        term.draw(|f| {
            ui(
                f,
                &mut session,
                &ViewContext {
                    spinner: 3,
                    keymap: &km,
                    show_footer: true,
                },
            );
        })
        .expect("draw");
        let text = screen_text(&term);
        assert!(text.contains("Syncing release data"));
        assert!(!text.contains("Chromium"));
    }

    /// What: Browsing draws the table, mode bar, and page size follows the viewport.
    ///
    /// Inputs:
    /// - Loaded session with two rows on a 100x24 terminal
    ///
    /// Output:
    /// - Column titles, both versions, and the `[NORMAL]` tag appear; page down lands on the last row.
    #[test]
    fn browsing_renders_table_and_mode_bar() {
        let mut term = Terminal::new(TestBackend::new(100, 24)).expect("terminal");
        let mut session = loaded_session();
        let km = KeyMap::default();
        term.draw(|f| {
            ui(
                f,
                &mut session,
                &ViewContext {
                    spinner: 0,
                    keymap: &km,
                    show_footer: true,
                },
            );
        })
        .expect("draw");
        let text = screen_text(&term);
        assert!(text.contains("Chromium"));
        assert!(text.contains("1.5.3"));
        assert!(text.contains("1.5.2"));
        assert!(text.contains("[NORMAL]"));
        assert!(text.contains("2/2"));
        session.apply(Action::PageDown);
        assert_eq!(session.state().cursor, 1);
    }

    /// What: Submitting a Found row opens the confirmation modal on screen.
    #[test]
    fn confirming_renders_modal() {
        let mut term = Terminal::new(TestBackend::new(100, 24)).expect("terminal");
        let mut session = loaded_session();
        session.apply(Action::Submit);
        let km = KeyMap::default();
        term.draw(|f| {
            ui(
                f,
                &mut session,
                &ViewContext {
                    spinner: 0,
                    keymap: &km,
                    show_footer: false,
                },
            );
        })
        .expect("draw");
        let text = screen_text(&term);
        assert!(text.contains("Proceed with Obsidian v1.5.3?"));
    }
}
