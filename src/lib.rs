//! Library entry for obsiver exposing the core logic for the binary and integration tests.

pub mod app;
pub mod events;
pub mod logic;
pub mod sources;
pub mod state;
pub mod theme;
pub mod ui;
