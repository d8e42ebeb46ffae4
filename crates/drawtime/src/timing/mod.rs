//! Timing diagrams
//!
//! A timing diagram is written in a small block language:
//!
//! ```text
//! time:
//!   start = 0
//!   end = 10
//! line A:
//!   start = 0
//!   2 -> 1
//!   6 -> 0
//! ```
//!
//! [`TimingParser`] turns the text into a [`TimingDiagram`]; the renderers in
//! this module draw it as PNG, SVG or a list of drawing commands.

pub mod layout;
pub mod literal;
mod model;
mod output;
mod parser;
mod renderer;
pub mod waveform;
mod writer;

pub use model::*;
pub use output::{CommandRenderer, RasterRenderer, SvgRenderer};
pub use parser::{parse_description, TimingParser};
pub use renderer::render_onto;
