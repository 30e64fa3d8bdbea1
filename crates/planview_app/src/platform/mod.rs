mod app;
mod clipboard;
pub mod config;
mod effects;
mod input;
pub mod logging;
mod snapshot;
mod ui;

pub use app::run_app;
