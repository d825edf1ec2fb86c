pub mod config;
pub mod engine;

#[cfg(feature = "gui")]
pub mod ui;
