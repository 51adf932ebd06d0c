//! Server infrastructure: config, logging, state, bootstrap

pub mod config;
pub mod logger;
pub mod server;
pub mod state;
