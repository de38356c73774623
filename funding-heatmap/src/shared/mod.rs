/// Shared modules for the funding heatmap
pub mod browser;
pub mod catalog;
pub mod classify;
pub mod client;
pub mod config;
pub mod error;
pub mod format;
pub mod scheduler;
pub mod selection;
pub mod state;
pub mod threshold;
pub mod types;
pub mod widget;
