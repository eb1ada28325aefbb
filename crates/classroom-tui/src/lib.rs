// Library root: re-exports all modules so integration tests can reach the
// app orchestrator, config, and TUI state.

pub mod app;
pub mod config;
pub mod protocol;
pub mod tui;
