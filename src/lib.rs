pub mod api;
pub mod config;
pub mod identity;
pub mod load;
pub mod state;
pub mod telemetry;
