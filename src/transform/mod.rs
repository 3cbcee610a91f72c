//! The ordered rewrite passes that turn a parsed passage fragment into
//! chat-safe text. Each pass visits the whole tree before the next one runs;
//! the order is load-bearing (see [`run`]).

use lazy_static::lazy_static;
use regex::Regex;

use crate::markup::{Document, Element, Node};

#[cfg(test)]
mod tests;

// Class names whose subtrees never contribute to the rendered passage:
// alternate translations, footnote markers and definitions, cross-reference
// markers and lists.
const STRIP_CLASSES: &[&str] = &[
    "passage-other-trans",
    "footnote",
    "footnotes",
    "crossreference",
    "crossrefs",
];

const HEADING_TAGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

// Space substitute for heading text, so the words stay joined when whitespace
// runs are later collapsed into single spaces.
const NO_BREAK_SPACE: char = '\u{00a0}';

lazy_static! {
    // Characters with formatting meaning in Telegram Markdown.
    static ref RESERVED: Regex = Regex::new(r"[*_`\[]").unwrap();
}

pub fn is_heading(name: &str) -> bool {
    HEADING_TAGS.contains(&name)
}

// Prefix every reserved character with a backslash. Applied to publisher
// text only, never to markers the pipeline synthesizes itself.
pub fn escape_reserved(text: &str) -> String {
    RESERVED.replace_all(text, "\\$0").to_string()
}

pub fn to_superscript(text: &str) -> String {
    text.chars().map(superscript_char).collect()
}

// Fixed glyph map; anything unmapped passes through unchanged.
fn superscript_char(c: char) -> char {
    match c {
        '0' => '\u{2070}',
        '1' => '\u{00b9}',
        '2' => '\u{00b2}',
        '3' => '\u{00b3}',
        '4' => '\u{2074}',
        '5' => '\u{2075}',
        '6' => '\u{2076}',
        '7' => '\u{2077}',
        '8' => '\u{2078}',
        '9' => '\u{2079}',
        '-' => '\u{207b}',
        _ => c,
    }
}

// Fixed pass order: stripping runs first so later passes never touch
// soon-to-be-discarded subtrees, and escaping runs before any pass that
// synthesizes emphasis markers, so the markers are never themselves escaped.
// Superscripting only rewrites numeral glyphs and goes last.
pub fn run(doc: &mut Document, rich: bool) {
    strip_clutter(doc);
    style_headings(doc, rich);
    escape_paragraphs(doc);
    break_lines(&mut doc.children);
    style_chapter_numbers(doc);
    superscript_verse_numbers(doc);
    trim_text_runs(doc);
}

// First pass, and the only one exposed on its own: any read of publisher
// text (e.g. the rich-mode title heading) must happen on a clutter-free
// tree. Detaching twice is a no-op.
pub fn strip_clutter(doc: &mut Document) {
    doc.detach_matching(&|el| STRIP_CLASSES.iter().any(|class| el.has_class(class)));
}

fn style_headings(doc: &mut Document, rich: bool) {
    doc.visit_elements_mut(&mut |el| {
        if !is_heading(&el.name) {
            return;
        }
        let mut text = el.text().trim().to_string();
        if !rich {
            text = text.replace(' ', &NO_BREAK_SPACE.to_string());
        }
        let text = escape_reserved(&text);
        el.children = vec![Node::Text(format!("*{}*", text))];
        el.keep = true;
    });
}

fn escape_paragraphs(doc: &mut Document) {
    doc.visit_elements_mut(&mut |el| {
        if el.name != "p" {
            return;
        }
        escape_text_nodes(&mut el.children);
        el.keep = true;
    });
}

fn escape_text_nodes(children: &mut Vec<Node>) {
    for node in children {
        match node {
            Node::Text(text) => {
                if RESERVED.is_match(text) {
                    *text = escape_reserved(text);
                }
            }
            Node::Element(el) => escape_text_nodes(&mut el.children),
        }
    }
}

// <br> elements become literal newlines so they survive flattening.
fn break_lines(children: &mut Vec<Node>) {
    for node in children.iter_mut() {
        if matches!(node, Node::Element(el) if el.name == "br") {
            *node = Node::Text("\n".to_string());
        } else if let Node::Element(el) = node {
            break_lines(&mut el.children);
        }
    }
}

fn style_chapter_numbers(doc: &mut Document) {
    doc.visit_elements_mut(&mut |el| {
        if !el.has_class("chapternum") {
            return;
        }
        let text = escape_reserved(el.text().trim());
        el.children = vec![Node::Text(format!("*{}* ", text))];
    });
}

fn superscript_verse_numbers(doc: &mut Document) {
    doc.visit_elements_mut(&mut |el| {
        if !el.has_class("versenum") {
            return;
        }
        let text = to_superscript(&el.text());
        el.children = vec![Node::Text(text)];
    });
}

// The publisher wraps each verse in a class="text" run whose tail whitespace
// would otherwise pile up before paragraph breaks.
fn trim_text_runs(doc: &mut Document) {
    doc.visit_elements_mut(&mut |el: &mut Element| {
        if !el.has_class("text") {
            return;
        }
        if let Some(Node::Text(text)) = el.children.last_mut() {
            let trimmed = text.trim_end().to_string();
            *text = trimmed;
        }
    });
}
