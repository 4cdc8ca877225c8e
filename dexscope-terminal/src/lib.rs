pub mod app;
pub mod config;
pub mod event;
pub mod filter;
pub mod input;
pub mod tasks;
pub mod ui;
