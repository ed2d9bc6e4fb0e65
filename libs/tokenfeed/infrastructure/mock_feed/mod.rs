//! Mock price feed
//!
//! The development WebSocket server the dashboard connects to.

pub mod server;
pub mod simulator;

pub use server::MockFeedServer;
pub use simulator::{apply_delta, PriceSimulator, SimulatedUpdate};
