//! Fetch a joke, lay it out on a retro desktop canvas, and export the canvas as
//! a PNG that can be handed to the platform's share sheet.
//!
//! The moving parts are the [layout] engine that wraps jokes into short lines,
//! the [Canvas] those lines are drawn on, and the [ExportPipeline] which
//! snapshots the canvas through a [RenderSurface], persists and measures it
//! through an [ImageStore], and offers it to a [ShareSheet]. [JokeScreen] ties
//! them together with a [JokeSource].

mod canvas;
pub use canvas::*;

mod colour;
pub use colour::*;

/// Configuration file handling
pub mod config;

mod error;
pub use error::*;

mod font;
pub use font::*;

mod image;
pub use self::image::*;

mod joke;
pub use joke::*;

/// Utility functions to lay out joke text on the canvas
pub mod layout;

mod pipeline;
pub use pipeline::*;

mod screen;
pub use screen::*;

mod share;
pub use share::*;

mod store;
pub use store::*;

mod surface;
pub use surface::*;

mod units;
pub use units::*;
