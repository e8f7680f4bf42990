pub mod client;
pub mod config;
pub mod errors;
pub mod scenario;
pub mod transcript;
pub mod ui;
pub mod workflow;
