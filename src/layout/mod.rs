//! Text layout for the joke canvas.
//!
//! Jokes are wrapped on word boundaries into short lines (see [`wrap`]) which
//! are then stacked down the canvas at a fixed line height (see
//! [`place_lines`]). Wrapping counts characters rather than measuring glyphs:
//! the canvas uses a large, fixed font size, and a character budget keeps the
//! layout identical regardless of which fonts the renderer resolves.
//!
//! # Example
//!
//! ```
//! use jokexp::layout::{place_lines, wrap};
//! use jokexp::Px;
//!
//! let lines = wrap("Un jour, un plongeur est parti en arrière.", 20);
//! let placed = place_lines(lines, Px(120.0), Px(35.0));
//! assert_eq!(placed[0].text, "Un jour, un plongeur");
//! assert_eq!(placed[1].baseline, Px(155.0));
//! ```

mod text;

pub use text::*;
