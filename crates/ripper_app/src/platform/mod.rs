//! Terminal front-end: wires the core state machine to the engine and stdout.
mod app;
mod config;
mod effects;
mod logging;
mod ui;

pub use app::run_app;
