//! Command handlers

pub mod billing;
pub mod config;
pub mod device;
pub mod generate;
pub mod resume;
