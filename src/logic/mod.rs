//! Core non-UI logic: version ordering, reconciliation and the view engine.

pub mod reconcile;
pub mod version;
pub mod view;

pub use reconcile::{DEFAULT_FALLBACK_ENGINE, reconcile};
pub use version::{compare_versions, numeric_runs};
pub use view::{find_match, rendered_text, visible_indices, visible_rows};
