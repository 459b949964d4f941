#![forbid(unsafe_code)]

//! Capability-gated tone annotation rewriter (headless).
//!
//! Pronunciation-lookup links often spell tones with numbers: `hao3` for Mandarin, or
//! `sin<sup>1</sup>` for Cantonese. When the font that will display them can render the
//! precomposed forms, this crate rewrites them to `hǎo` and `sin¹`.
//!
//! The pieces are separable:
//! - [`capability`]: probe glyph widths through a [`GlyphWidthProbe`] to decide what is renderable
//! - [`rewrite()`]: a pure pass over a snapshot of links, returning mutations
//! - [`document`]: snapshot and patch `<a>` elements of an HTML string
//! - [`tones`]: the substitution tables and passes on their own

pub mod capability;
pub mod config;
pub mod document;
pub mod error;
pub mod rewrite;
pub mod tones;

pub use capability::{Capabilities, FixedWidthProbe, GlyphWidthProbe, probe_capabilities};
pub use config::{TonemarkConfig, default_site_config};
pub use document::{DocumentRewrite, rewrite_document};
pub use error::{Error, Result};
pub use rewrite::{HrefMarkers, LinkCategory, LinkMutation, LinkSnapshot, RewriteOptions, rewrite};

/// Probes `probe` in the configured font stack, then rewrites `html`.
///
/// This is the whole run-on-load behavior in one call.
pub fn rewrite_document_with_probe(
    html: &str,
    probe: &dyn GlyphWidthProbe,
    config: &TonemarkConfig,
) -> Result<DocumentRewrite> {
    let options = RewriteOptions::from_config(config)?;
    let capabilities = probe_capabilities(probe, &options.font_family);
    Ok(rewrite_document(html, capabilities, &options))
}

#[cfg(test)]
mod tests;
