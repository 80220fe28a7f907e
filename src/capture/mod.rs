//! Capture module for screen capture functionality
//!
//! This module provides abstractions over the xcap library for capturing
//! the screen in a GTK-friendly way.

pub mod desktop;
pub mod screen;

pub use desktop::DisplayServer;
pub use screen::{capture_primary_monitor, image_to_pixbuf, MonitorInfo, ScreenImage};
