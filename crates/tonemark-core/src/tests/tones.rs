use crate::tones::*;
use std::borrow::Cow;
use std::collections::HashSet;

#[test]
fn every_table_digraph_converts_to_its_marked_form() {
    for (digraph, marked) in pinyin_entries() {
        assert_eq!(convert_pinyin(&digraph), marked, "digraph {digraph}");
    }
}

#[test]
fn table_keys_are_unique_and_cover_four_tones() {
    let keys: HashSet<String> = pinyin_entries().map(|(k, _)| k).collect();
    assert_eq!(keys.len(), PINYIN_RIMES.len() * 4);
    assert!(keys.contains("er4"));
    assert!(keys.contains("Er1"));
    assert!(keys.contains("v3"));
    assert!(!keys.contains("I1"));
    assert!(!keys.contains("a5"));
}

#[test]
fn longer_rimes_win_over_their_prefixes_and_suffixes() {
    assert_eq!(convert_pinyin("ang1"), "āng");
    assert_eq!(convert_pinyin("an1"), "ān");
    assert_eq!(convert_pinyin("ai1"), "āi");
    assert_eq!(convert_pinyin("ei4"), "èi");
    assert_eq!(convert_pinyin("ao3"), "ǎo");
    assert_eq!(convert_pinyin("ou2"), "óu");
}

#[test]
fn capitalized_syllables_keep_the_mark_on_the_capital() {
    assert_eq!(convert_pinyin("Ai1"), "Āi");
    assert_eq!(convert_pinyin("Ao4"), "Ào");
    assert_eq!(convert_pinyin("Ou3"), "Ǒu");
    assert_eq!(convert_pinyin("Er2"), "Ér");
}

#[test]
fn converts_syllables_inside_running_text() {
    assert_eq!(convert_pinyin("ni3 hao3"), "nǐ hǎo");
    assert_eq!(convert_pinyin("zhong1 guo2"), "zhōng guó");
    assert_eq!(convert_pinyin("xiang4"), "xiàng");
    assert_eq!(convert_pinyin("jiong3"), "jiǒng");
    assert_eq!(convert_pinyin("lv4 nv3"), "lǜ nǚ");
    assert_eq!(convert_pinyin("er4 shi2"), "èr shí");
    assert_eq!(convert_pinyin("<b>ma1</b>"), "<b>mā</b>");
}

#[test]
fn text_without_digraphs_is_borrowed() {
    assert!(matches!(convert_pinyin("hello world"), Cow::Borrowed(_)));
    assert!(matches!(convert_pinyin("room 2024"), Cow::Borrowed(_)));
    assert!(matches!(convert_pinyin("ma5 ma0"), Cow::Borrowed(_)));
    assert_eq!(convert_pinyin(""), "");
}

#[test]
fn converted_pinyin_is_stable() {
    for input in ["ni3 hao3", "Ang1", "zhong1 guo2 ren2", "lv4"] {
        let once = convert_pinyin(input).into_owned();
        assert!(matches!(convert_pinyin(&once), Cow::Borrowed(_)), "{input}");
    }
}

#[test]
fn superscript_markup_becomes_superscript_digits() {
    assert_eq!(convert_superscripts("sin<sup>1</sup>"), "sin¹");
    assert_eq!(
        convert_superscripts("jyut<sup>6</sup> ping<sup>3</sup>"),
        "jyut⁶ ping³"
    );
    for (digit, sup) in SUPERSCRIPT_DIGITS {
        assert_eq!(
            convert_superscripts(&format!("<sup>{digit}</sup>")),
            sup.to_string()
        );
    }
}

#[test]
fn superscript_tags_match_like_serialized_markup() {
    assert_eq!(convert_superscripts("gwong<SUP>2</SUP>"), "gwong²");
    assert_eq!(convert_superscripts("dung<sup >1</sup >"), "dung¹");
}

#[test]
fn superscript_pass_ignores_other_numbers() {
    for input in ["<sup>7</sup>", "<sup>0</sup>", "<sup>12</sup>", "<sub>1</sub>", "sin1"] {
        assert!(matches!(convert_superscripts(input), Cow::Borrowed(_)), "{input}");
    }
    assert_eq!(superscript_digit('4'), Some('⁴'));
    assert_eq!(superscript_digit('9'), None);
}
