pub mod commands;
pub mod config;
pub mod error;
pub mod git;
pub mod reconcile;
pub mod utils;
