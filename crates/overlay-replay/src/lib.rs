//! Offline replay of recorded detection sessions through the overlay mapper.

pub mod config;
pub mod error;
pub mod logging;
pub mod script;

pub use config::ReplayConfig;
pub use error::{ReplayError, ReplayResult};
pub use script::{ReplayEvent, ReplayOutput, ReplayScript, Replayer};
