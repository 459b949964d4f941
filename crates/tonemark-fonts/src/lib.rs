#![forbid(unsafe_code)]

//! Glyph width probing against real font files.
//!
//! A browser answers "how wide is `ǒ` in this font stack?" by laying the text out. Headless, we
//! load the fonts of the stack with `fontdue` and walk the stack per character the way CSS font
//! fallback does: the first listed family that covers a character draws it, and a character no
//! family covers falls back to the `.notdef` box of the first loaded family.

pub mod family;
pub mod probe;

pub use family::{FontSource, normalize_family, parse_font_family_list};
pub use probe::{FontStackProbe, ProbeSettings};

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read font file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid font data for family `{family}`: {message}")]
    InvalidFont { family: String, message: String },
    #[error("invalid font spec `{spec}`: {message}")]
    InvalidFontSpec { spec: String, message: String },
    #[error(transparent)]
    Config(#[from] tonemark_core::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
