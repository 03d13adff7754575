//! UI module - handles all TUI rendering
//!
//! Structure:
//! - `draw.rs` - Screen layout and widgets
//! - `theme.rs` - Color themes and presets

mod draw;
pub mod theme;

// Re-export main draw function
pub use draw::draw;

pub use theme::Theme;
