//! `taproll-api` — HTTP layer over the attendance recorder and directories.

pub mod app;
pub mod config;
