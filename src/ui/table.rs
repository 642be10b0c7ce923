use ratatui::{
    Frame,
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Cell, Row, Table, TableState},
};

use crate::logic::view::{COLUMN_TITLES, display_cells};
use crate::state::{Availability, ReconciledRow, Session};
use crate::theme::theme;

/// Index of the `Image` column in [`COLUMN_TITLES`].
const IMAGE_COLUMN: usize = 4;

/// What: Render the release table with the cursor row highlighted.
///
/// Inputs:
/// - `f`: Frame to render into
/// - `area`: Target rectangle for the bordered table
/// - `session`: Source of visible rows, cursor, and query
///
/// Details:
/// - The `Image` cell is colored by availability; early-access rows are dimmed.
/// - Query matches are highlighted case-insensitively inside every cell.
pub fn render_table(f: &mut Frame, area: Rect, session: &Session) {
    let th = theme();
    let query = session.state().query.to_lowercase();
    let highlight = Style::default()
        .fg(th.base)
        .bg(th.yellow)
        .add_modifier(Modifier::BOLD);

    let visible = session.visible_rows();
    let rows: Vec<Row> = visible
        .iter()
        .enumerate()
        .map(|(pos, row)| {
            let base = row_style(row);
            let cells = display_cells(pos, row)
                .into_iter()
                .enumerate()
                .map(|(col, text)| {
                    let style = if col == IMAGE_COLUMN {
                        availability_style(row.availability())
                    } else {
                        base
                    };
                    Cell::from(highlight_line(&text, &query, style, highlight))
                });
            Row::new(cells)
        })
        .collect();

    let header = Row::new(COLUMN_TITLES.iter().map(|t| {
        Cell::from(Span::styled(
            *t,
            Style::default().fg(th.mauve).add_modifier(Modifier::BOLD),
        ))
    }));
    let widths = [
        Constraint::Length(5),
        Constraint::Length(10),
        Constraint::Length(8),
        Constraint::Length(11),
        Constraint::Length(8),
        Constraint::Length(10),
        Constraint::Min(16),
    ];
    let title = format!(
        " Releases ({} of {}) ",
        session.visible_len(),
        session.rows().len()
    );
    let table = Table::new(rows, widths)
        .header(header)
        .style(Style::default().fg(th.text).bg(th.base))
        .block(
            Block::default()
                .title(Span::styled(title, Style::default().fg(th.overlay1)))
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(th.overlay1)),
        )
        .row_highlight_style(Style::default().bg(th.surface1))
        .highlight_symbol("> ");

    let mut state = TableState::default();
    if session.visible_len() > 0 {
        state.select(Some(session.state().cursor));
    }
    f.render_stateful_widget(table, area, &mut state);
}

fn row_style(row: &ReconciledRow) -> Style {
    let th = theme();
    if row.early_access() {
        Style::default().fg(th.subtext0)
    } else {
        Style::default().fg(th.text)
    }
}

fn availability_style(a: Availability) -> Style {
    let th = theme();
    match a {
        Availability::Found => Style::default().fg(th.green).add_modifier(Modifier::BOLD),
        Availability::Missing => Style::default().fg(th.red),
        Availability::NotApplicable => Style::default().fg(th.overlay1),
    }
}

/// What: Split `text` into spans with every occurrence of `query_lower` highlighted.
///
/// Inputs:
/// - `text`: Cell text
/// - `query_lower`: Lowercased query; empty disables highlighting
/// - `base`: Style for unmatched text
/// - `hit`: Style for matched text
///
/// Output:
/// - A single `Line`.
///
/// Details:
/// - Matching runs on the lowercased text; when lowercasing changes byte lengths the
///   cell is returned unhighlighted rather than slicing at the wrong offsets.
#[must_use]
pub fn highlight_line(text: &str, query_lower: &str, base: Style, hit: Style) -> Line<'static> {
    let lower = text.to_lowercase();
    if query_lower.is_empty() || lower.len() != text.len() {
        return Line::from(Span::styled(text.to_string(), base));
    }
    let mut spans = Vec::new();
    let mut at = 0;
    while let Some(rel) = lower[at..].find(query_lower) {
        let start = at + rel;
        let end = start + query_lower.len();
        if !text.is_char_boundary(start) || !text.is_char_boundary(end) {
            break;
        }
        if start > at {
            spans.push(Span::styled(text[at..start].to_string(), base));
        }
        spans.push(Span::styled(text[start..end].to_string(), hit));
        at = end;
    }
    if at < text.len() {
        spans.push(Span::styled(text[at..].to_string(), base));
    }
    Line::from(spans)
}
