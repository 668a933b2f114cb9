//! Confab - a terminal chat client for streaming agent backends.
//!
//! This library exposes modules for use in integration tests.

pub mod app;
pub mod client;
pub mod config;
pub mod sse;
pub mod terminal;
pub mod transcript;
pub mod ui;
