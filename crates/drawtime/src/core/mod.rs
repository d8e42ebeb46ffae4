//! Core abstractions for diagram processing
//!
//! This module holds what the timing diagram code builds on: the parser and
//! renderer traits, errors, logging, geometry, the painting surface and its
//! backends.

mod canvas;
mod error;
mod fonts;
pub mod logging;
pub mod markup;
mod parser;
mod raster;
mod renderer;
mod surface;
mod svg;
mod types;

pub use canvas::*;
pub use error::*;
pub use fonts::*;
pub use logging::*;
pub use parser::*;
pub use raster::*;
pub use renderer::*;
pub use surface::*;
pub use svg::*;
pub use types::*;
