//! Color constants for the UI.
//!
//! Minimal dark palette; the transcript stays close to plain terminal
//! colors so it reads like a conversation, not a dashboard.

use ratatui::style::Color;

/// Border color for the input box.
pub const COLOR_BORDER: Color = Color::DarkGray;

/// Dim text: user echo lines, keybind hints.
pub const COLOR_DIM: Color = Color::DarkGray;

/// Agent response text.
pub const COLOR_AGENT: Color = Color::White;

/// Streaming indicator.
pub const COLOR_ACTIVE: Color = Color::LightGreen;

/// Error text in the status line.
pub const COLOR_ERROR: Color = Color::Red;
