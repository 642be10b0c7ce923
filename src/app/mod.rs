//! Application runtime: terminal lifecycle, the UI event loop, and the background loader.

mod runtime;
mod terminal;

pub use runtime::loader::{LoaderConfig, LoaderMessage, load_all, spawn_loader, spawn_worker};
pub use runtime::{RunOptions, run};
