use super::{parse, Element, Node};

fn only_element(children: &[Node]) -> &Element {
    let elements: Vec<_> = children
        .iter()
        .filter_map(|n| match n {
            Node::Element(el) => Some(el),
            Node::Text(_) => None,
        })
        .collect();
    assert_eq!(elements.len(), 1);
    elements[0]
}

#[test]
fn parses_nested_elements_and_text() {
    let doc = parse(b"<div class=\"outer\"><p>hello <b>world</b></p></div>");
    let div = only_element(&doc.children);
    assert_eq!(div.name, "div");
    assert!(div.has_class("outer"));

    let p = only_element(&div.children);
    assert_eq!(p.name, "p");
    assert_eq!(p.text(), "hello world");
}

#[test]
fn decodes_entities_in_text_and_attributes() {
    let doc = parse(b"<p title=\"a &amp; b\">&#8220;quoted&#8221; &amp; more</p>");
    let p = only_element(&doc.children);
    assert_eq!(p.attr("title"), Some("a & b"));
    assert_eq!(p.text(), "\u{201c}quoted\u{201d} & more");
}

#[test]
fn class_matching_is_token_based() {
    let doc = parse(b"<span class=\"text John-3-16\">x</span>");
    let span = only_element(&doc.children);
    assert!(span.has_class("text"));
    assert!(span.has_class("John-3-16"));
    assert!(!span.has_class("Joh"));
}

#[test]
fn void_tags_do_not_swallow_siblings() {
    let doc = parse(b"<p>one<br>two</p>");
    let p = only_element(&doc.children);
    assert_eq!(p.text(), "onetwo");
    assert_eq!(p.children.len(), 3);
    assert!(matches!(&p.children[1], Node::Element(el) if el.name == "br"));
}

#[test]
fn unclosed_tag_folds_into_parent() {
    let doc = parse(b"<p>hello <b>world</p>");
    let p = only_element(&doc.children);
    assert_eq!(p.name, "p");
    assert_eq!(p.text(), "hello world");
}

#[test]
fn stray_end_tag_is_dropped() {
    let doc = parse(b"<p>hello</i> there</p>");
    let p = only_element(&doc.children);
    assert_eq!(p.text(), "hello there");
}

#[test]
fn unclosed_input_keeps_partial_tree() {
    let doc = parse(b"<div><p>almost");
    let div = only_element(&doc.children);
    let p = only_element(&div.children);
    assert_eq!(p.text(), "almost");
}

#[test]
fn detach_removes_whole_subtrees() {
    let mut doc = parse(
        b"<p><sup class=\"footnote\">[<a href=\"#f\">a</a>]</sup>kept</p>",
    );
    doc.detach_matching(&|el| el.has_class("footnote"));
    let p = only_element(&doc.children);
    assert_eq!(p.text(), "kept");
}

#[test]
fn find_first_is_document_order() {
    let doc = parse(b"<div><h3>first</h3></div><h3>second</h3>");
    let heading = doc.find_first(&|el| el.name == "h3").unwrap();
    assert_eq!(heading.text(), "first");
}

#[test]
fn keep_elements_in_document_order() {
    let mut doc = parse(b"<div><h3>a</h3><p>b</p></div>");
    doc.visit_elements_mut(&mut |el| {
        if el.name == "h3" || el.name == "p" {
            el.keep = true;
        }
    });
    let keeps = doc.keep_elements();
    let texts: Vec<_> = keeps.iter().map(|el| el.text()).collect();
    assert_eq!(texts, vec!["a", "b"]);
}
