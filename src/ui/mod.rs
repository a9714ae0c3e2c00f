//! Presentation helpers.
//!
//! - **style**: ANSI palette and prompt markers
//! - **banner**: logo, build info and usage text

pub mod banner;
pub mod style;

pub use style::Palette;
