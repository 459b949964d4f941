//! Tone-number substitution tables and the passes that apply them.
//!
//! Pinyin keys are a rime followed by a tone digit (`ang1`), so every key ends in `1..=4` and two
//! keys can only overlap when one is a suffix of the other (`i1` inside `ai1`). The pass scans left
//! to right and replaces the longest key starting at each position, which lets `ai1` win over `i1`
//! and `ang1` over `an1`.

use regex::{Captures, Regex};
use rustc_hash::FxHashMap;
use std::borrow::Cow;
use std::sync::OnceLock;

/// Rime → marked forms for tones 1 through 4.
pub const PINYIN_RIMES: &[(&str, [&str; 4])] = &[
    ("a", ["ā", "á", "ǎ", "à"]),
    ("ai", ["āi", "ái", "ǎi", "ài"]),
    ("ao", ["āo", "áo", "ǎo", "ào"]),
    ("an", ["ān", "án", "ǎn", "àn"]),
    ("ang", ["āng", "áng", "ǎng", "àng"]),
    ("o", ["ō", "ó", "ǒ", "ò"]),
    ("ou", ["ōu", "óu", "ǒu", "òu"]),
    ("e", ["ē", "é", "ě", "è"]),
    ("ei", ["ēi", "éi", "ěi", "èi"]),
    ("en", ["ēn", "én", "ěn", "èn"]),
    ("eng", ["ēng", "éng", "ěng", "èng"]),
    ("er", ["ēr", "ér", "ěr", "èr"]),
    ("i", ["ī", "í", "ǐ", "ì"]),
    ("in", ["īn", "ín", "ǐn", "ìn"]),
    ("ing", ["īng", "íng", "ǐng", "ìng"]),
    ("ong", ["ōng", "óng", "ǒng", "òng"]),
    ("u", ["ū", "ú", "ǔ", "ù"]),
    ("un", ["ūn", "ún", "ǔn", "ùn"]),
    ("v", ["ǖ", "ǘ", "ǚ", "ǜ"]),
    // Capitalized forms only exist for rimes that can start a syllable.
    ("A", ["Ā", "Á", "Ǎ", "À"]),
    ("Ai", ["Āi", "Ái", "Ǎi", "Ài"]),
    ("Ao", ["Āo", "Áo", "Ǎo", "Ào"]),
    ("An", ["Ān", "Án", "Ǎn", "Àn"]),
    ("Ang", ["Āng", "Áng", "Ǎng", "Àng"]),
    ("O", ["Ō", "Ó", "Ǒ", "Ò"]),
    ("Ou", ["Ōu", "Óu", "Ǒu", "Òu"]),
    ("E", ["Ē", "É", "Ě", "È"]),
    ("Ei", ["Ēi", "Éi", "Ěi", "Èi"]),
    ("En", ["Ēn", "Én", "Ěn", "Èn"]),
    ("Eng", ["Ēng", "Éng", "Ěng", "Èng"]),
    ("Er", ["Ēr", "Ér", "Ěr", "Èr"]),
];

/// Cantonese tone number → superscript digit.
pub const SUPERSCRIPT_DIGITS: [(char, char); 6] = [
    ('1', '¹'),
    ('2', '²'),
    ('3', '³'),
    ('4', '⁴'),
    ('5', '⁵'),
    ('6', '⁶'),
];

const MIN_PINYIN_KEY_LEN: usize = 2;
const MAX_PINYIN_KEY_LEN: usize = 4;

/// Every `(tone digraph, marked form)` pair, e.g. `("ang1", "āng")`.
pub fn pinyin_entries() -> impl Iterator<Item = (String, &'static str)> {
    PINYIN_RIMES.iter().flat_map(|(rime, marked)| {
        marked
            .iter()
            .enumerate()
            .map(move |(i, m)| (format!("{rime}{}", i + 1), *m))
    })
}

fn pinyin_table() -> &'static FxHashMap<String, &'static str> {
    static TABLE: OnceLock<FxHashMap<String, &'static str>> = OnceLock::new();
    TABLE.get_or_init(|| pinyin_entries().collect())
}

fn longest_pinyin_key(rest: &str) -> Option<(usize, &'static str)> {
    let table = pinyin_table();
    let max = MAX_PINYIN_KEY_LEN.min(rest.len());
    (MIN_PINYIN_KEY_LEN..=max).rev().find_map(|len| {
        let key = rest.get(..len)?;
        table.get(key).map(|marked| (len, *marked))
    })
}

/// Replaces pinyin tone digraphs (`hao3` → `hǎo`) in a single left-to-right pass.
///
/// Returns the input unchanged (borrowed) when nothing matched.
pub fn convert_pinyin(text: &str) -> Cow<'_, str> {
    let bytes = text.as_bytes();
    if !bytes.iter().any(|b| matches!(b, b'1'..=b'4')) {
        return Cow::Borrowed(text);
    }

    let mut out: Option<String> = None;
    let mut last = 0usize;
    let mut i = 0usize;
    while i < bytes.len() {
        // Keys start with an ASCII letter, which is always a char boundary.
        if bytes[i].is_ascii_alphabetic() {
            if let Some((len, marked)) = longest_pinyin_key(&text[i..]) {
                let buf = out.get_or_insert_with(|| String::with_capacity(text.len()));
                buf.push_str(&text[last..i]);
                buf.push_str(marked);
                i += len;
                last = i;
                continue;
            }
        }
        i += 1;
    }

    match out {
        Some(mut buf) => {
            buf.push_str(&text[last..]);
            Cow::Owned(buf)
        }
        None => Cow::Borrowed(text),
    }
}

fn superscript_markup_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<sup\s*>([1-6])</sup\s*>").expect("valid regex"))
}

/// Superscript form of an ASCII tone digit `1..=6`.
pub fn superscript_digit(digit: char) -> Option<char> {
    SUPERSCRIPT_DIGITS
        .iter()
        .find(|(d, _)| *d == digit)
        .map(|(_, sup)| *sup)
}

/// Replaces `<sup>N</sup>` markup (N = 1..6) with the matching superscript digit.
pub fn convert_superscripts(markup: &str) -> Cow<'_, str> {
    if !markup.contains('<') {
        return Cow::Borrowed(markup);
    }
    superscript_markup_regex().replace_all(markup, |caps: &Captures<'_>| {
        caps[1]
            .chars()
            .next()
            .and_then(superscript_digit)
            .map(String::from)
            .unwrap_or_else(|| caps[0].to_string())
    })
}
