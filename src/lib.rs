#![allow(clippy::uninlined_format_args)]

pub mod app;
pub mod config;
pub mod data;
pub mod dispatcher;
pub mod grid;
pub mod layout;
pub mod loader;
pub mod logging;
pub mod overlay;
pub mod state;
pub mod ui;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use app::run;
