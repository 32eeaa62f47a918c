#![deny(unsafe_code)]

pub mod agent;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod logging;
pub mod utils;
pub mod version;
