// ABOUTME: Library root for pocketchat — re-exports all modules for integration testing.
// ABOUTME: The binary entry point is in main.rs, which uses this crate as a library.

pub mod agent;
pub mod app;
pub mod config;
pub mod history;
pub mod logging;
pub mod repl;
pub mod session;
pub mod storage;
pub mod voice;
