//! Utility modules: logging and host configuration

pub mod config;
pub mod logger;
