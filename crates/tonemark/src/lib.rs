#![forbid(unsafe_code)]

//! `tonemark` rewrites numbered tone annotations in pronunciation-lookup links into precomposed
//! Unicode (`hao3` → `hǎo`, `sin<sup>1</sup>` → `sin¹`), gated on what the display font can render.
//!
//! # Features
//!
//! - `fonts`: probe capabilities against real font files (`tonemark::fonts`)

pub use tonemark_core::*;

#[cfg(feature = "fonts")]
pub mod fonts {
    pub use tonemark_fonts::{
        Error as FontError, FontSource, FontStackProbe, ProbeSettings, normalize_family,
        parse_font_family_list,
    };

    use tonemark_core::{DocumentRewrite, TonemarkConfig};

    #[derive(Debug, thiserror::Error)]
    pub enum HeadlessError {
        #[error(transparent)]
        Core(#[from] tonemark_core::Error),
        #[error(transparent)]
        Fonts(#[from] tonemark_fonts::Error),
    }

    pub type Result<T> = std::result::Result<T, HeadlessError>;

    /// Loads `sources` into a probe configured from `config`.
    pub fn load_probe(sources: &[FontSource], config: &TonemarkConfig) -> Result<FontStackProbe> {
        let mut probe = FontStackProbe::new(ProbeSettings::from_config(config)?);
        for source in sources {
            probe.add_source(source)?;
        }
        Ok(probe)
    }

    /// Probes the configured stack against `sources`, then rewrites `html`.
    pub fn rewrite_html_with_fonts(
        html: &str,
        sources: &[FontSource],
        config: &TonemarkConfig,
    ) -> Result<DocumentRewrite> {
        let probe = load_probe(sources, config)?;
        Ok(tonemark_core::rewrite_document_with_probe(
            html, &probe, config,
        )?)
    }
}
