//! Terminal UI module using ratatui.
//!
//! - `render`: screen selection, main layout and overlays
//! - `input`: keyboard event handling
//! - `styles`: color scheme and text styling
//! - `pages`: content for each protected route

pub mod input;
pub mod pages;
pub mod render;
pub mod styles;
