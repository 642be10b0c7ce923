//! Interactive session state machine.
//!
//! [`Session`] owns the reconciled rows and the mutable [`SessionState`]. Every
//! user input arrives as an [`Action`] and is applied by [`Session::apply`],
//! which performs no I/O; the derived visible-row list is recomputed after each
//! change so the renderer only ever reads.

use std::time::{Duration, Instant};

use crate::logic::view::{find_match, visible_indices};
use crate::state::types::{
    Availability, Filters, ReconciledRow, Selection, SessionOutcome, SortMode,
};

/// Rows moved by page up/down before the renderer reports the real viewport height.
const DEFAULT_PAGE_SIZE: usize = 10;

/// Input mode to return to after the confirmation modal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputMode {
    /// Table navigation.
    Browsing,
    /// Live query editing.
    Searching,
}

/// Session lifecycle state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Waiting for the background loader; only quitting is possible.
    Loading,
    /// Table navigation.
    Browsing,
    /// Live query editing.
    Searching,
    /// Confirmation modal for a row that has an image tag.
    Confirming {
        /// Pending selection.
        selection: Selection,
        /// Mode restored when the modal is declined.
        previous: InputMode,
    },
    /// Terminal state.
    Done(SessionOutcome),
}

/// User intent decoded from a key press.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// Cursor up one row.
    MoveUp,
    /// Cursor down one row.
    MoveDown,
    /// Cursor up one page.
    PageUp,
    /// Cursor down one page.
    PageDown,
    /// Cursor to first row.
    Top,
    /// Cursor to last row.
    Bottom,
    /// Enter search mode.
    EnterSearch,
    /// Leave search mode and clear the query.
    ExitSearch,
    /// Append a character to the query.
    QueryChar(char),
    /// Remove the last query character.
    QueryBackspace,
    /// Jump to the next row whose rendered text contains the query.
    NextMatch,
    /// Jump to the previous row whose rendered text contains the query.
    PrevMatch,
    /// Show or hide mobile releases.
    ToggleMobile,
    /// Show or hide early-access releases.
    ToggleEarlyAccess,
    /// Show only releases with an image.
    ToggleFoundOnly,
    /// Switch between priority and pure version sort.
    ToggleSort,
    /// Select the row under the cursor.
    Submit,
    /// Accept the confirmation modal.
    ConfirmYes,
    /// Decline the confirmation modal.
    ConfirmNo,
    /// End the session without a selection.
    Quit,
}

/// Mutable session state; everything else in [`Session`] is derived or read-only.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionState {
    /// Lifecycle state.
    pub mode: Mode,
    /// Filter flags.
    pub filters: Filters,
    /// Sort mode.
    pub sort: SortMode,
    /// Free-text query.
    pub query: String,
    /// Index into the visible row list.
    pub cursor: usize,
}

impl SessionState {
    /// Initial state: loading, with the given filter and sort defaults and an empty query.
    #[must_use]
    pub const fn new(filters: Filters, sort: SortMode) -> Self {
        Self {
            mode: Mode::Loading,
            filters,
            sort,
            query: String::new(),
            cursor: 0,
        }
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(Filters::default(), SortMode::default())
    }
}

/// Severity of a transient notice.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeLevel {
    /// Informational.
    Info,
    /// Something the user asked for could not be done.
    Error,
}

/// Transient toast message; never part of [`SessionState`].
#[derive(Clone, Debug)]
pub struct Notice {
    /// Text shown in the toast line.
    pub message: String,
    /// Severity, used for colouring.
    pub level: NoticeLevel,
    /// When the notice was raised.
    pub raised_at: Instant,
}

/// Data delivered by the background loader.
#[derive(Clone, Debug, Default)]
pub struct LoadedData {
    /// Reconciled rows, newest first.
    pub rows: Vec<ReconciledRow>,
    /// Per-source failures, already formatted for display.
    pub source_errors: Vec<String>,
    /// Sources served from their local snapshot instead of the network.
    pub cached_sources: Vec<&'static str>,
}

/// Interactive session: state plus the data it operates on.
#[derive(Debug)]
pub struct Session {
    state: SessionState,
    rows: Vec<ReconciledRow>,
    visible: Vec<usize>,
    notice: Option<Notice>,
    source_errors: Vec<String>,
    page_size: usize,
}

impl Session {
    /// What: Start a session in `Loading` with the given initial state.
    ///
    /// Inputs:
    /// - `state`: Initial state; its mode is forced to `Loading`.
    #[must_use]
    pub fn new(mut state: SessionState) -> Self {
        state.mode = Mode::Loading;
        state.cursor = 0;
        Self {
            state,
            rows: Vec::new(),
            visible: Vec::new(),
            notice: None,
            source_errors: Vec::new(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &SessionState {
        &self.state
    }

    /// Current mode.
    #[must_use]
    pub const fn mode(&self) -> &Mode {
        &self.state.mode
    }

    /// All reconciled rows.
    #[must_use]
    pub fn rows(&self) -> &[ReconciledRow] {
        &self.rows
    }

    /// Visible rows in display order.
    #[must_use]
    pub fn visible_rows(&self) -> Vec<&ReconciledRow> {
        self.visible.iter().map(|&i| &self.rows[i]).collect()
    }

    /// Number of visible rows.
    #[must_use]
    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    /// Row under the cursor, if any.
    #[must_use]
    pub fn selected_row(&self) -> Option<&ReconciledRow> {
        self.visible
            .get(self.state.cursor)
            .map(|&i| &self.rows[i])
    }

    /// Active notice, if any.
    #[must_use]
    pub const fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Per-source failures reported by the loader.
    #[must_use]
    pub fn source_errors(&self) -> &[String] {
        &self.source_errors
    }

    /// Terminal outcome once the session is done.
    #[must_use]
    pub const fn outcome(&self) -> Option<&SessionOutcome> {
        match &self.state.mode {
            Mode::Done(outcome) => Some(outcome),
            _ => None,
        }
    }

    /// Whether the session reached `Done`.
    #[must_use]
    pub const fn is_done(&self) -> bool {
        matches!(self.state.mode, Mode::Done(_))
    }

    /// Rows moved by page up/down; set from the rendered viewport height.
    pub fn set_page_size(&mut self, rows: usize) {
        self.page_size = rows.max(1);
    }

    /// Drop the current notice.
    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// Drop the notice once it is older than `ttl`.
    pub fn expire_notice(&mut self, now: Instant, ttl: Duration) {
        if let Some(n) = &self.notice
            && now.saturating_duration_since(n.raised_at) >= ttl
        {
            self.notice = None;
        }
    }

    /// What: Accept the loader's result and start browsing.
    ///
    /// Inputs:
    /// - `data`: Reconciled rows and per-source errors.
    ///
    /// Details:
    /// - Ignored unless the session is still `Loading` (a cancelled session discards late results).
    /// - Source errors are surfaced once as an error notice; otherwise snapshot use is noted.
    pub fn on_loaded(&mut self, data: LoadedData) {
        if self.state.mode != Mode::Loading {
            tracing::debug!("discarding loader result, session no longer loading");
            return;
        }
        self.rows = data.rows;
        self.source_errors = data.source_errors;
        self.state.mode = Mode::Browsing;
        self.state.cursor = 0;
        self.refresh_view(None);
        if !self.source_errors.is_empty() {
            let msg = format!("Some sources failed: {}", self.source_errors.join("; "));
            self.raise(msg, NoticeLevel::Error);
        } else if !data.cached_sources.is_empty() {
            let msg = format!(
                "Cached data for {} (run with --refresh to update)",
                data.cached_sources.join(", ")
            );
            self.raise(msg, NoticeLevel::Info);
        }
        tracing::info!(
            rows = self.rows.len(),
            visible = self.visible.len(),
            source_errors = self.source_errors.len(),
            "session browsing"
        );
    }

    /// What: Terminate the session with a loader failure.
    ///
    /// Details:
    /// - Ignored once the session is done.
    pub fn on_load_failed(&mut self, message: String) {
        if self.is_done() {
            return;
        }
        tracing::error!(error = %message, "session failed");
        self.state.mode = Mode::Done(SessionOutcome::Failed(message));
    }

    /// What: Apply one user action.
    ///
    /// Inputs:
    /// - `action`: Decoded user intent.
    ///
    /// Details:
    /// - Actions that do not apply to the current mode are ignored.
    /// - Quit ends the session from every non-terminal mode.
    pub fn apply(&mut self, action: Action) {
        if action == Action::Quit {
            if !self.is_done() {
                self.state.mode = Mode::Done(SessionOutcome::Cancelled);
            }
            return;
        }
        match self.state.mode.clone() {
            Mode::Loading | Mode::Done(_) => {}
            Mode::Confirming {
                selection,
                previous,
            } => match action {
                Action::ConfirmYes | Action::Submit => {
                    tracing::info!(version = %selection.version, tag = %selection.tag, "selection confirmed");
                    self.state.mode = Mode::Done(SessionOutcome::Selected(selection));
                }
                Action::ConfirmNo | Action::ExitSearch => {
                    self.state.mode = match previous {
                        InputMode::Browsing => Mode::Browsing,
                        InputMode::Searching => Mode::Searching,
                    };
                }
                _ => {}
            },
            Mode::Browsing => self.apply_input(action, InputMode::Browsing),
            Mode::Searching => self.apply_input(action, InputMode::Searching),
        }
    }

    /// Handle an action in `Browsing` or `Searching`.
    fn apply_input(&mut self, action: Action, current: InputMode) {
        match action {
            Action::MoveUp => self.move_cursor(-1),
            Action::MoveDown => self.move_cursor(1),
            Action::PageUp => self.move_cursor(-self.page_step()),
            Action::PageDown => self.move_cursor(self.page_step()),
            Action::Top => self.state.cursor = 0,
            Action::Bottom => self.state.cursor = self.visible.len().saturating_sub(1),
            Action::EnterSearch => self.state.mode = Mode::Searching,
            Action::ExitSearch => {
                if current == InputMode::Searching {
                    self.state.mode = Mode::Browsing;
                    if !self.state.query.is_empty() {
                        self.state.query.clear();
                        self.refresh_view(self.selected_key());
                    }
                }
            }
            Action::QueryChar(ch) => {
                if current == InputMode::Searching {
                    self.state.query.push(ch);
                    self.refresh_view(self.selected_key());
                }
            }
            Action::QueryBackspace => {
                if current == InputMode::Searching && self.state.query.pop().is_some() {
                    self.refresh_view(self.selected_key());
                }
            }
            Action::NextMatch => self.jump_to_match(true),
            Action::PrevMatch => self.jump_to_match(false),
            Action::ToggleMobile => {
                self.state.filters.show_mobile = !self.state.filters.show_mobile;
                self.refresh_view(self.selected_key());
            }
            Action::ToggleEarlyAccess => {
                self.state.filters.show_early_access = !self.state.filters.show_early_access;
                self.refresh_view(self.selected_key());
            }
            Action::ToggleFoundOnly => {
                self.state.filters.found_only = !self.state.filters.found_only;
                self.refresh_view(self.selected_key());
            }
            Action::ToggleSort => {
                self.state.sort = self.state.sort.toggled();
                self.refresh_view(self.selected_key());
            }
            Action::Submit => self.submit(current),
            Action::ConfirmYes | Action::ConfirmNo | Action::Quit => {}
        }
    }

    /// Open the confirmation modal, or reject rows without an image.
    fn submit(&mut self, current: InputMode) {
        let Some(row) = self.selected_row() else {
            return;
        };
        match (row.availability(), row.tag()) {
            (Availability::Found, Some(tag)) => {
                let selection = Selection {
                    version: row.version().to_string(),
                    tag: tag.to_string(),
                };
                self.state.mode = Mode::Confirming {
                    selection,
                    previous: current,
                };
            }
            _ => {
                let msg = format!("No image tag for v{}", row.version());
                tracing::debug!(version = %row.version(), "rejected selection without image");
                self.raise(msg, NoticeLevel::Error);
            }
        }
    }

    fn raise(&mut self, message: String, level: NoticeLevel) {
        self.notice = Some(Notice {
            message,
            level,
            raised_at: Instant::now(),
        });
    }

    fn page_step(&self) -> isize {
        isize::try_from(self.page_size).unwrap_or(isize::MAX)
    }

    fn move_cursor(&mut self, delta: isize) {
        let len = self.visible.len();
        if len == 0 {
            self.state.cursor = 0;
            return;
        }
        let max = len - 1;
        self.state.cursor = if delta < 0 {
            self.state.cursor.saturating_sub(delta.unsigned_abs())
        } else {
            self.state.cursor.saturating_add(delta.unsigned_abs()).min(max)
        };
    }

    fn jump_to_match(&mut self, forward: bool) {
        let rows = self.visible_rows();
        if let Some(idx) = find_match(&rows, &self.state.query, self.state.cursor, forward) {
            self.state.cursor = idx;
        }
    }

    /// Index into `rows` of the row under the cursor.
    fn selected_key(&self) -> Option<usize> {
        self.visible.get(self.state.cursor).copied()
    }

    /// What: Recompute the visible list and keep the cursor on a valid row.
    ///
    /// Inputs:
    /// - `keep`: Row (index into `rows`) to keep under the cursor if it is still visible.
    ///
    /// Details:
    /// - Falls back to clamping the previous cursor into range; 0 when nothing is visible.
    fn refresh_view(&mut self, keep: Option<usize>) {
        self.visible = visible_indices(
            &self.rows,
            &self.state.filters,
            self.state.sort,
            &self.state.query,
        );
        let kept = keep.and_then(|k| self.visible.iter().position(|&i| i == k));
        self.state.cursor = kept.unwrap_or_else(|| {
            self.state
                .cursor
                .min(self.visible.len().saturating_sub(1))
        });
    }
}
