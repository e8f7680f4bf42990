//! The phase chain: sequential execution with context accumulation.

pub mod context;
pub mod runner;

pub use context::RunContext;
pub use runner::{ChainRunner, build_user_message};
