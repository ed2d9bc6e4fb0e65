//! Token Dashboard TUI
//!
//! Terminal UI showing the three live token columns and a detail pane with
//! the observed token's price chart.

pub mod app;
pub mod ui;

pub use app::App;
