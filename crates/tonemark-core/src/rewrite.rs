use crate::capability::Capabilities;
use crate::config::TonemarkConfig;
use crate::tones::{convert_pinyin, convert_superscripts};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// One hyperlink as seen when the snapshot was taken.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkSnapshot {
    pub href: Option<String>,
    /// Inner markup of the link; may contain `<sup>` fragments.
    pub content: String,
    /// Whether the host lets us assign a font family to this link.
    pub styleable: bool,
}

impl LinkSnapshot {
    pub fn new(href: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            href: Some(href.into()),
            content: content.into(),
            styleable: true,
        }
    }

    pub fn without_style(mut self) -> Self {
        self.styleable = false;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LinkCategory {
    /// Mandarin pronunciation lookup; content carries pinyin with tone numbers.
    MandarinLookup,
    /// Cantonese pronunciation lookup; content carries `<sup>N</sup>` tone numbers.
    CantoneseLookup,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HrefMarkers {
    pub mandarin: String,
    pub cantonese: String,
}

impl HrefMarkers {
    /// Picks the substitution for `href` among the enabled ones.
    ///
    /// The Mandarin marker is tried first, but only while pinyin diacritics are enabled; an href
    /// carrying both markers falls through to the Cantonese pass otherwise.
    pub fn classify(&self, href: &str, capabilities: Capabilities) -> Option<LinkCategory> {
        if capabilities.pinyin_diacritics && href.contains(self.mandarin.as_str()) {
            Some(LinkCategory::MandarinLookup)
        } else if capabilities.superscript_digits && href.contains(self.cantonese.as_str()) {
            Some(LinkCategory::CantoneseLookup)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteOptions {
    /// Font stack assigned to rewritten links; the same stack the capabilities were probed in.
    pub font_family: String,
    pub markers: HrefMarkers,
}

impl Default for RewriteOptions {
    fn default() -> Self {
        Self {
            font_family: "FreeSerif, Lucida Sans Unicode, Times New Roman, DejaVu Sans, serif"
                .to_string(),
            markers: HrefMarkers {
                mandarin: "gradint.cgi?jsl=zh&".to_string(),
                cantonese: "gradint.cgi?jsl=zh-yue&".to_string(),
            },
        }
    }
}

impl RewriteOptions {
    pub fn from_config(config: &TonemarkConfig) -> Result<Self> {
        let font_family = config.require_str("fontFamily")?.trim();
        if font_family.is_empty() {
            return Err(Error::InvalidConfig {
                path: "fontFamily".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        let marker = |path: &str| -> Result<String> {
            let value = config.require_str(path)?;
            if value.is_empty() {
                return Err(Error::InvalidConfig {
                    path: path.to_string(),
                    message: "must not be empty".to_string(),
                });
            }
            Ok(value.to_string())
        };
        Ok(Self {
            font_family: font_family.to_string(),
            markers: HrefMarkers {
                mandarin: marker("markers.mandarin")?,
                cantonese: marker("markers.cantonese")?,
            },
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkMutation {
    /// Position of the link in the snapshot.
    pub index: usize,
    pub category: LinkCategory,
    pub content: String,
    /// Present only for styleable links.
    pub font_family: Option<String>,
}

/// Applies the substitution for `category` to `content`, ungated.
pub fn convert_for_category(category: LinkCategory, content: &str) -> Cow<'_, str> {
    match category {
        LinkCategory::MandarinLookup => convert_pinyin(content),
        LinkCategory::CantoneseLookup => convert_superscripts(content),
    }
}

fn rewrite_link(
    index: usize,
    link: &LinkSnapshot,
    capabilities: Capabilities,
    options: &RewriteOptions,
) -> Option<LinkMutation> {
    if link.content.is_empty() {
        return None;
    }
    let Some(href) = link.href.as_deref() else {
        tracing::trace!(index, "link without href skipped");
        return None;
    };
    let Some(category) = options.markers.classify(href, capabilities) else {
        tracing::trace!(index, "no enabled lookup marker; link skipped");
        return None;
    };

    let Cow::Owned(content) = convert_for_category(category, &link.content) else {
        return None;
    };
    // An owned result can still equal the input (e.g. a regex pass that allocated).
    if content == link.content {
        return None;
    }

    Some(LinkMutation {
        index,
        category,
        content,
        font_family: link.styleable.then(|| options.font_family.clone()),
    })
}

/// Rewrites tone annotations in a static snapshot of links.
///
/// Each link is visited once; the result lists only links whose content actually changed.
pub fn rewrite(
    links: &[LinkSnapshot],
    capabilities: Capabilities,
    options: &RewriteOptions,
) -> Vec<LinkMutation> {
    if !capabilities.any() {
        tracing::debug!("no capability present; nothing to rewrite");
        return Vec::new();
    }
    let mutations: Vec<LinkMutation> = links
        .iter()
        .enumerate()
        .filter_map(|(index, link)| rewrite_link(index, link, capabilities, options))
        .collect();
    tracing::debug!(
        links = links.len(),
        rewritten = mutations.len(),
        "rewrote link snapshot"
    );
    mutations
}
