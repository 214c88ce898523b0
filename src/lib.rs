pub mod agent;
pub mod config;
pub mod error;
pub mod executor;
pub mod listener;
pub mod protocol;
pub mod session;
pub mod shutdown;
