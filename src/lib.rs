// Core modules
pub mod ai;
pub mod args;
pub mod config;
pub mod error;
pub mod review;
pub mod server;
