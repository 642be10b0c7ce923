//! Session state and the value types it operates on.
//!
//! `types` holds the immutable row model and outcome types; `session` holds the
//! state machine that mutates [`SessionState`] in response to [`Action`]s.

pub mod session;
pub mod types;

pub use session::{
    Action, InputMode, LoadedData, Mode, Notice, NoticeLevel, Session, SessionState,
};
pub use types::{
    Availability, Filters, Platform, ReconciledRow, Selection, SessionOutcome, SortMode,
    UNKNOWN_BROWSER_VERSION,
};
