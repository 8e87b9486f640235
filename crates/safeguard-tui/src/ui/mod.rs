//! Terminal UI module using ratatui.
//!
//! This module provides the TUI rendering and input handling:
//!
//! - `render`: Screen selection by route, layout and overlays
//! - `input`: Keyboard event handling
//! - `styles`: Light and dark palettes
//! - `tabs`: Per-screen content rendering (alerts, map, sensors, etc.)

pub mod input;
pub mod render;
pub mod styles;
pub mod tabs;
