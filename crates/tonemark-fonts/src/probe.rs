use crate::family::{FontSource, normalize_family, parse_font_family_list};
use crate::{Error, Result};
use fontdue::{Font, FontSettings};
use std::path::Path;
use tonemark_core::{GlyphWidthProbe, TonemarkConfig};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeSettings {
    pub font_size_px: f32,
    /// Round widths to whole pixels, as integer layout widths (`offsetWidth`) do.
    pub snap_to_pixels: bool,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            font_size_px: 16.0,
            snap_to_pixels: true,
        }
    }
}

impl ProbeSettings {
    pub fn from_config(config: &TonemarkConfig) -> Result<Self> {
        let font_size_px = config.require_f64("probe.fontSizePx")?;
        if !(font_size_px.is_finite() && font_size_px > 0.0) {
            return Err(tonemark_core::Error::InvalidConfig {
                path: "probe.fontSizePx".to_string(),
                message: format!("must be a positive number, got {font_size_px}"),
            }
            .into());
        }
        Ok(Self {
            font_size_px: font_size_px as f32,
            snap_to_pixels: config.require_bool("probe.snapToPixels")?,
        })
    }
}

struct LoadedFont {
    /// Normalized family name.
    family: String,
    font: Font,
}

impl std::fmt::Debug for LoadedFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedFont")
            .field("family", &self.family)
            .field("glyph_count", &self.font.glyph_count())
            .finish()
    }
}

/// Measures glyphs in a CSS font stack using fonts registered by family name.
#[derive(Debug, Default)]
pub struct FontStackProbe {
    fonts: Vec<LoadedFont>,
    settings: ProbeSettings,
}

impl FontStackProbe {
    pub fn new(settings: ProbeSettings) -> Self {
        Self {
            fonts: Vec::new(),
            settings,
        }
    }

    pub fn settings(&self) -> ProbeSettings {
        self.settings
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }

    pub fn families(&self) -> impl Iterator<Item = &str> {
        self.fonts.iter().map(|f| f.family.as_str())
    }

    /// Registers font data under `family`. A later registration of the same family replaces the
    /// earlier one.
    pub fn add_font_bytes(&mut self, family: &str, bytes: Vec<u8>) -> Result<()> {
        let normalized = normalize_family(family);
        let font = Font::from_bytes(bytes, FontSettings::default()).map_err(|message| {
            Error::InvalidFont {
                family: family.to_string(),
                message: message.to_string(),
            }
        })?;
        tracing::debug!(
            family = %normalized,
            glyphs = font.glyph_count(),
            "registered font"
        );
        self.fonts.retain(|f| f.family != normalized);
        self.fonts.push(LoadedFont {
            family: normalized,
            font,
        });
        Ok(())
    }

    pub fn add_font_file(&mut self, family: &str, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.add_font_bytes(family, bytes)
    }

    pub fn add_source(&mut self, source: &FontSource) -> Result<()> {
        self.add_font_file(&source.family, &source.path)
    }

    fn font(&self, normalized_family: &str) -> Option<&Font> {
        self.fonts
            .iter()
            .find(|f| f.family == normalized_family)
            .map(|f| &f.font)
    }

    /// Width of `text` laid out in the stack, or `None` when no listed family is loaded.
    pub fn measure(&self, text: &str, font_family: &str) -> Option<f32> {
        let stack: Vec<&Font> = parse_font_family_list(font_family)
            .iter()
            .filter_map(|family| self.font(family))
            .collect();
        let first = *stack.first()?;

        let px = self.settings.font_size_px;
        let width: f32 = text
            .chars()
            .map(|ch| {
                let covering = stack.iter().find_map(|font| {
                    let index = font.lookup_glyph_index(ch);
                    (index != 0).then_some((*font, index))
                });
                // Index 0 is `.notdef`, the box drawn for uncovered characters.
                let (font, index) = covering.unwrap_or((first, 0));
                font.metrics_indexed(index, px).advance_width
            })
            .sum();

        Some(if self.settings.snap_to_pixels {
            width.round()
        } else {
            width
        })
    }
}

impl GlyphWidthProbe for FontStackProbe {
    fn glyph_width(&self, glyph: &str, font_family: &str) -> Option<f64> {
        self.measure(glyph, font_family).map(f64::from)
    }
}
