//! HTML host for the rewriter: finds `<a>` elements in a document string, snapshots them, and
//! splices mutations back in.

use crate::capability::Capabilities;
use crate::rewrite::{LinkMutation, LinkSnapshot, RewriteOptions, rewrite};
use lol_html::{RewriteStrSettings, element, rewrite_str};
use regex::Regex;
use serde::Serialize;
use std::ops::Range;
use std::sync::OnceLock;

fn token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(concat!(
            r#"(?is)<!--.*?-->"#,
            // Raw-text elements: their content is never markup.
            r#"|<script\b.*?</script\s*>"#,
            r#"|<style\b.*?</style\s*>"#,
            r#"|<textarea\b.*?</textarea\s*>"#,
            r#"|<title\b.*?</title\s*>"#,
            r#"|<xmp\b.*?</xmp\s*>"#,
            r#"|<iframe\b.*?</iframe\s*>"#,
            r#"|<noembed\b.*?</noembed\s*>"#,
            r#"|<noframes\b.*?</noframes\s*>"#,
            r#"|(?P<close></a\s*>)"#,
            r#"|(?P<open><a(?:\s(?:[^>"']|"[^"]*"|'[^']*')*)?/?>)"#,
            // Any other start tag, so `<a` inside its quoted attribute values stays put.
            r#"|<[a-z][^\s/>]*(?:\s(?:[^>"']|"[^"]*"|'[^']*')*)?/?>"#,
        ))
        .expect("valid regex")
    })
}

/// A located `<a>` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    /// Byte range of the opening tag.
    pub open_tag: Range<usize>,
    /// Byte range of the inner markup.
    pub content: Range<usize>,
    /// Entity-decoded `href`, as a DOM `getAttribute` would return it.
    pub href: Option<String>,
}

impl Anchor {
    pub fn to_snapshot(&self, html: &str) -> LinkSnapshot {
        LinkSnapshot {
            href: self.href.clone(),
            content: html[self.content.clone()].to_string(),
            styleable: true,
        }
    }
}

fn read_href(open_tag: &str) -> Option<String> {
    let mut href: Option<String> = None;
    let res = rewrite_str(
        open_tag,
        RewriteStrSettings {
            element_content_handlers: vec![element!("a", |el| {
                href = el.get_attribute("href");
                Ok(())
            })],
            ..RewriteStrSettings::new()
        },
    );
    if res.is_err() {
        return None;
    }
    // `lol_html` hands out raw attribute text.
    href.map(|raw| htmlize::unescape(raw.as_str()).into_owned())
}

/// Finds every `<a>` element outside comments, raw-text elements and other tags' attribute
/// values, in document order.
///
/// An anchor ends at its `</a>`, or where the next `<a>` opens. Anchors that never end are
/// dropped.
pub fn snapshot_anchors(html: &str) -> Vec<Anchor> {
    let mut anchors = Vec::new();
    let mut pending: Option<(Range<usize>, Option<String>)> = None;

    for caps in token_regex().captures_iter(html) {
        let (tag, opens) = match (caps.name("open"), caps.name("close")) {
            (Some(tag), _) => (tag, true),
            (None, Some(tag)) => (tag, false),
            (None, None) => continue,
        };
        if let Some((open_tag, href)) = pending.take() {
            anchors.push(Anchor {
                content: open_tag.end..tag.start(),
                open_tag,
                href,
            });
        }
        if opens {
            pending = Some((tag.range(), read_href(tag.as_str())));
        }
    }

    if let Some((open_tag, _)) = pending {
        tracing::trace!(at = open_tag.start, "unterminated <a> dropped");
    }
    anchors
}

pub fn snapshot_links(html: &str) -> Vec<LinkSnapshot> {
    snapshot_anchors(html)
        .iter()
        .map(|a| a.to_snapshot(html))
        .collect()
}

/// Replaces any `font-family` declaration in an inline style with `font-family: <stack>`.
pub fn merge_font_family(style: &str, font_family: &str) -> String {
    let mut declarations: Vec<&str> = style
        .split(';')
        .map(str::trim)
        .filter(|decl| !decl.is_empty())
        .filter(|decl| {
            let property = decl.split(':').next().unwrap_or_default();
            !property.trim().eq_ignore_ascii_case("font-family")
        })
        .collect();
    let font_decl = format!("font-family: {font_family}");
    declarations.push(&font_decl);
    declarations.join("; ")
}

fn restyle_open_tag(open_tag: &str, font_family: &str) -> String {
    rewrite_str(
        open_tag,
        RewriteStrSettings {
            element_content_handlers: vec![element!("a", |el| {
                let style = match el.get_attribute("style") {
                    Some(raw) => merge_font_family(&htmlize::unescape(raw.as_str()), font_family),
                    None => merge_font_family("", font_family),
                };
                el.set_attribute("style", &style)?;
                Ok(())
            })],
            ..RewriteStrSettings::new()
        },
    )
    .unwrap_or_else(|_| open_tag.to_string())
}

/// Splices `mutations` into `html`. Mutations pointing at unknown anchors are ignored.
pub fn apply_mutations(html: &str, anchors: &[Anchor], mutations: &[LinkMutation]) -> String {
    let mut ordered: Vec<&LinkMutation> = mutations.iter().collect();
    ordered.sort_by_key(|m| m.index);
    ordered.dedup_by_key(|m| m.index);

    let mut out = String::with_capacity(html.len() + mutations.len() * 32);
    let mut last = 0usize;
    for mutation in ordered {
        let Some(anchor) = anchors.get(mutation.index) else {
            tracing::trace!(index = mutation.index, "mutation for unknown anchor ignored");
            continue;
        };
        out.push_str(&html[last..anchor.open_tag.start]);
        let open_tag = &html[anchor.open_tag.clone()];
        match mutation.font_family.as_deref() {
            Some(font_family) => out.push_str(&restyle_open_tag(open_tag, font_family)),
            None => out.push_str(open_tag),
        }
        out.push_str(&mutation.content);
        last = anchor.content.end;
    }
    out.push_str(&html[last..]);
    out
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRewrite {
    pub html: String,
    /// Number of `<a>` elements seen; zero when no capability was present.
    pub links: usize,
    pub mutations: Vec<LinkMutation>,
}

/// Rewrites tone annotations in every qualifying link of an HTML document.
pub fn rewrite_document(
    html: &str,
    capabilities: Capabilities,
    options: &RewriteOptions,
) -> DocumentRewrite {
    if !capabilities.any() {
        return DocumentRewrite {
            html: html.to_string(),
            links: 0,
            mutations: Vec::new(),
        };
    }

    let anchors = snapshot_anchors(html);
    let links: Vec<LinkSnapshot> = anchors.iter().map(|a| a.to_snapshot(html)).collect();
    let mutations = rewrite(&links, capabilities, options);
    let html = if mutations.is_empty() {
        html.to_string()
    } else {
        apply_mutations(html, &anchors, &mutations)
    };
    DocumentRewrite {
        html,
        links: anchors.len(),
        mutations,
    }
}
