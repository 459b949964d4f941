use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Third-tone `i`; narrow in any proportional font.
pub const PROBE_I3: &str = "\u{01D0}";
/// Third-tone `o`; wider than [`PROBE_I3`] unless both fall back to the same box glyph.
pub const PROBE_O3: &str = "\u{01D2}";
pub const PROBE_SUP6: &str = "\u{2076}";
pub const PROBE_SUP2: &str = "\u{00B2}";
/// Baseline letter that real superscripts must be narrower than.
pub const PROBE_BASELINE: &str = "n";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    pub pinyin_diacritics: bool,
    pub superscript_digits: bool,
}

impl Capabilities {
    /// Nothing renderable; every rewrite is a no-op.
    pub fn none() -> Self {
        Self::default()
    }

    /// Both substitutions enabled.
    pub fn all() -> Self {
        Self {
            pinyin_diacritics: true,
            superscript_digits: true,
        }
    }

    /// Whether at least one substitution is enabled.
    pub fn any(&self) -> bool {
        self.pinyin_diacritics || self.superscript_digits
    }
}

/// Something that can lay out a short string in a font stack and report its width.
///
/// Returning `None` means there is no rendering environment at all; probing then yields
/// [`Capabilities::none`].
pub trait GlyphWidthProbe {
    fn glyph_width(&self, glyph: &str, font_family: &str) -> Option<f64>;
}

impl<P: GlyphWidthProbe + ?Sized> GlyphWidthProbe for &P {
    fn glyph_width(&self, glyph: &str, font_family: &str) -> Option<f64> {
        (**self).glyph_width(glyph, font_family)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ProbeWidths {
    i3: f64,
    o3: f64,
    sup6: f64,
    sup2: f64,
    baseline: f64,
}

impl ProbeWidths {
    fn measure(probe: &dyn GlyphWidthProbe, font_family: &str) -> Option<Self> {
        Some(Self {
            i3: probe.glyph_width(PROBE_I3, font_family)?,
            o3: probe.glyph_width(PROBE_O3, font_family)?,
            sup6: probe.glyph_width(PROBE_SUP6, font_family)?,
            sup2: probe.glyph_width(PROBE_SUP2, font_family)?,
            baseline: probe.glyph_width(PROBE_BASELINE, font_family)?,
        })
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            pinyin_diacritics: self.o3 > self.i3,
            superscript_digits: self.sup6 < self.baseline && self.sup2 == self.sup6,
        }
    }
}

/// Infers both capabilities from the widths of the probe glyphs rendered in `font_family`.
pub fn probe_capabilities(probe: &dyn GlyphWidthProbe, font_family: &str) -> Capabilities {
    let Some(widths) = ProbeWidths::measure(probe, font_family) else {
        tracing::debug!(font_family, "no rendering environment; capabilities disabled");
        return Capabilities::none();
    };
    let caps = widths.capabilities();
    tracing::debug!(
        font_family,
        i3 = widths.i3,
        o3 = widths.o3,
        sup6 = widths.sup6,
        sup2 = widths.sup2,
        baseline = widths.baseline,
        pinyin_diacritics = caps.pinyin_diacritics,
        superscript_digits = caps.superscript_digits,
        "probed glyph widths"
    );
    caps
}

/// A probe answering from a fixed width table, ignoring the font stack.
///
/// Useful for tests and for hosts that already know their glyph metrics.
#[derive(Debug, Clone, Default)]
pub struct FixedWidthProbe {
    widths: FxHashMap<String, f64>,
    pub fallback_width: Option<f64>,
}

impl FixedWidthProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_width(mut self, glyph: impl Into<String>, width: f64) -> Self {
        self.widths.insert(glyph.into(), width);
        self
    }

    pub fn with_fallback_width(mut self, width: f64) -> Self {
        self.fallback_width = Some(width);
        self
    }

    /// Widths of a proportional serif font with real superscript glyphs.
    pub fn capable() -> Self {
        Self::new()
            .with_width(PROBE_I3, 4.0)
            .with_width(PROBE_O3, 8.0)
            .with_width(PROBE_SUP6, 5.0)
            .with_width(PROBE_SUP2, 5.0)
            .with_width(PROBE_BASELINE, 8.0)
    }

    /// Every glyph renders as the same box, as when no font in the stack covers them.
    pub fn tofu(width: f64) -> Self {
        Self::new().with_fallback_width(width)
    }
}

impl GlyphWidthProbe for FixedWidthProbe {
    fn glyph_width(&self, glyph: &str, _font_family: &str) -> Option<f64> {
        self.widths.get(glyph).copied().or(self.fallback_width)
    }
}
