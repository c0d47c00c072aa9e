//! API request handlers

mod accounts;
mod health;
mod run_config;
mod runs;
mod statistics;
mod tasks;

pub use accounts::*;
pub use health::*;
pub use run_config::*;
pub use runs::*;
pub use statistics::*;
pub use tasks::*;
