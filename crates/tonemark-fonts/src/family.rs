use crate::{Error, Result};
use std::path::PathBuf;

/// Lowercases and strips quotes so `"Lucida Sans Unicode"` and `lucida sans unicode` compare
/// equal.
pub fn normalize_family(name: &str) -> String {
    let trimmed = name.trim();
    let unquoted = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .or_else(|| trimmed.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')))
        .unwrap_or(trimmed);
    unquoted
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_lowercase()
}

/// Splits a CSS `font-family` value into normalized family names, in order.
pub fn parse_font_family_list(font_family: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut cur = String::new();
    let mut quote: Option<char> = None;
    for ch in font_family.chars() {
        match (quote, ch) {
            (Some(q), c) if c == q => {
                quote = None;
                cur.push(c);
            }
            (None, '"' | '\'') => {
                quote = Some(ch);
                cur.push(ch);
            }
            (None, ',') => {
                let name = normalize_family(&cur);
                if !name.is_empty() {
                    out.push(name);
                }
                cur.clear();
            }
            _ => cur.push(ch),
        }
    }
    let name = normalize_family(&cur);
    if !name.is_empty() {
        out.push(name);
    }
    out
}

/// A font to load: `family=path`, or a bare path whose file stem names the family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontSource {
    pub family: String,
    pub path: PathBuf,
}

impl FontSource {
    pub fn parse(spec: &str) -> Result<Self> {
        let invalid = |message: &str| Error::InvalidFontSpec {
            spec: spec.to_string(),
            message: message.to_string(),
        };

        if let Some((family, path)) = spec.split_once('=') {
            let family = family.trim();
            let path = path.trim();
            if family.is_empty() {
                return Err(invalid("family name is empty"));
            }
            if path.is_empty() {
                return Err(invalid("path is empty"));
            }
            return Ok(Self {
                family: family.to_string(),
                path: PathBuf::from(path),
            });
        }

        let path = PathBuf::from(spec.trim());
        let family = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| invalid("cannot derive a family name from the path"))?;
        Ok(Self { family, path })
    }
}
