use super::{escape_reserved, run, to_superscript};
use crate::markup::parse;

fn keep_texts(input: &[u8], rich: bool) -> Vec<String> {
    let mut doc = parse(input);
    run(&mut doc, rich);
    doc.keep_elements()
        .iter()
        .map(|el| el.text().trim().to_string())
        .collect()
}

#[test]
fn superscript_digits() {
    assert_eq!(to_superscript("316"), "\u{00b3}\u{00b9}\u{2076}");
    assert_eq!(
        to_superscript("12-14"),
        "\u{00b9}\u{00b2}\u{207b}\u{00b9}\u{2074}"
    );
}

#[test]
fn superscript_passes_unmapped_characters_through() {
    assert_eq!(to_superscript("16 "), "\u{00b9}\u{2076} ");
    assert_eq!(to_superscript("16a"), "\u{00b9}\u{2076}a");
}

#[test]
fn escapes_all_reserved_characters() {
    assert_eq!(escape_reserved("a*b_c`d[e"), "a\\*b\\_c\\`d\\[e");
    assert_eq!(escape_reserved("plain text"), "plain text");
}

#[test]
fn double_escaping_only_doubles_backslashes() {
    let once = escape_reserved("*_");
    assert_eq!(once, "\\*\\_");
    let twice = escape_reserved(&once);
    assert_eq!(twice, "\\\\*\\\\_");
}

#[test]
fn strips_footnotes_and_crossrefs_before_styling() {
    let texts = keep_texts(
        b"<p><sup class=\"footnote\">[<a href=\"#f\">a</a>]</sup>For God so loved\
          <sup class=\"crossreference\">(A)</sup> the world</p>\
          <div class=\"footnotes\"><h4>Footnotes</h4></div>",
        false,
    );
    assert_eq!(texts, vec!["For God so loved the world"]);
}

#[test]
fn headings_are_emphasized_and_space_protected() {
    let texts = keep_texts(b"<h3>The Good Shepherd</h3>", false);
    assert_eq!(texts, vec!["*The\u{a0}Good\u{a0}Shepherd*"]);
}

#[test]
fn rich_mode_headings_keep_plain_spaces() {
    let texts = keep_texts(b"<h3>The Good Shepherd</h3>", true);
    assert_eq!(texts, vec!["*The Good Shepherd*"]);
}

#[test]
fn heading_text_is_escaped_but_markers_are_not() {
    let texts = keep_texts(b"<h3>Jesus_Speaks</h3>", false);
    assert_eq!(texts, vec!["*Jesus\\_Speaks*"]);
}

#[test]
fn paragraph_text_is_escaped() {
    let texts = keep_texts(b"<p>a *bold* [claim]</p>", false);
    assert_eq!(texts, vec!["a \\*bold\\* \\[claim]"]);
}

#[test]
fn line_breaks_become_newlines() {
    let texts = keep_texts(b"<p>line one<br />line two</p>", false);
    assert_eq!(texts, vec!["line one\nline two"]);
}

#[test]
fn chapter_numbers_are_emphasized_with_trailing_space() {
    let texts = keep_texts(
        b"<p><span class=\"chapternum\">3 </span>In the beginning</p>",
        false,
    );
    assert_eq!(texts, vec!["*3* In the beginning"]);
}

#[test]
fn verse_numbers_are_superscripted() {
    let texts = keep_texts(
        b"<p><sup class=\"versenum\">16 </sup>For God so loved the world</p>",
        false,
    );
    assert_eq!(texts, vec!["\u{00b9}\u{2076} For God so loved the world"]);
}

#[test]
fn text_runs_lose_trailing_whitespace() {
    let texts = keep_texts(
        b"<p><span class=\"text\">one  </span><br />two</p>",
        false,
    );
    assert_eq!(texts, vec!["one\ntwo"]);
}
