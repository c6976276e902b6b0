pub mod cli;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod form;
pub mod render;
pub mod storage;
pub mod store;
pub mod task;
pub mod tracker;
pub mod ui;
