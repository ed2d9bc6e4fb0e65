//! Token Dashboard - Main Library
//!
//! Live token state for the mock trading dashboard.
//!
//! ## Architecture
//!
//! - **bin_common**: Common utilities for binary executables (CLI, runners)
//! - **tokenfeed**: Token store, feed client and dashboard core (re-exported from workspace)
//!
//! ## Usage in Binaries
//!
//! ```rust
//! use token_dashboard::bin_common::resolve_config_path;
//! use token_dashboard::tokenfeed::LiveTokenDashboard;
//! ```

// Re-export workspace libraries for convenience
pub use tokenfeed;

// Binary common utilities
pub mod bin_common {
    //! Common utilities for binary executables

    pub mod cli;
    pub mod runner;

    pub use cli::{config_path_from, resolve_config_path, CONFIG_PATH_VAR};
    pub use runner::{BinaryRunner, RunConfig};
}
