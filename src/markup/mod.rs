//! Tolerant parsing of a passage fragment into a mutable element tree.
//!
//! The publisher's markup is close to XHTML but not guaranteed well-formed.
//! Parse errors never fail the request: whatever tree has been built when the
//! tokenizer gives up is kept, and a fragment with no usable structure simply
//! renders to nothing downstream.

use html_escape::decode_html_entities;
use quick_xml::events::BytesStart;
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use tracing::warn;

#[cfg(test)]
mod tests;

// Tags that never carry a closing counterpart in HTML.
const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

#[derive(Debug)]
pub enum Node {
    Element(Element),
    Text(String),
}

#[derive(Debug)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
    // Set by the transform pipeline for elements that contribute text to the
    // rendered output.
    pub keep: bool,
}

impl Element {
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .map(|value| value.split_ascii_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }

    // Concatenated descendant text in document order.
    pub fn text(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }
}

#[derive(Debug, Default)]
pub struct Document {
    pub children: Vec<Node>,
}

impl Document {
    // Pre-order walk over every element in the tree.
    pub fn visit_elements_mut<F: FnMut(&mut Element)>(&mut self, f: &mut F) {
        visit_in(&mut self.children, f);
    }

    pub fn find_first(&self, pred: &dyn Fn(&Element) -> bool) -> Option<&Element> {
        find_in(&self.children, pred)
    }

    // Detach every element matching the predicate, descendants included.
    pub fn detach_matching(&mut self, pred: &dyn Fn(&Element) -> bool) {
        detach_in(&mut self.children, pred);
    }

    // Keep elements in document order. Keeps are never nested, so the walk
    // does not descend into a matched element.
    pub fn keep_elements(&self) -> Vec<&Element> {
        let mut out = Vec::new();
        collect_keep(&self.children, &mut out);
        out
    }
}

// Best-effort parse of the fragment bytes. Start tags are stacked, end tags
// unwind to the nearest matching open element (stray ends are dropped), and
// anything still open at EOF folds back into its parent.
pub fn parse(fragment: &[u8]) -> Document {
    let mut reader = Reader::from_reader(fragment);
    reader.config_mut().check_end_names = false;

    let mut doc = Document::default();
    let mut stack: Vec<Element> = Vec::new();
    let mut buffer = Vec::new();

    loop {
        match reader.read_event_into(&mut buffer) {
            Err(e) => {
                warn!(
                    position = reader.buffer_position(),
                    error = %e,
                    "markup parse degraded, keeping partial tree"
                );
                break;
            }
            Ok(Event::Start(tag)) => {
                let element = element_from_tag(&tag);
                if VOID_TAGS.contains(&element.name.as_str()) {
                    push_node(&mut doc, &mut stack, Node::Element(element));
                } else {
                    stack.push(element);
                }
            }
            Ok(Event::Empty(tag)) => {
                push_node(&mut doc, &mut stack, Node::Element(element_from_tag(&tag)));
            }
            Ok(Event::End(tag)) => {
                let name = String::from_utf8_lossy(tag.name().into_inner()).to_lowercase();
                close_until(&mut doc, &mut stack, &name);
            }
            Ok(Event::Text(text)) => {
                let decoded =
                    decode_html_entities(&String::from_utf8_lossy(text.as_ref())).to_string();
                if !decoded.is_empty() {
                    push_node(&mut doc, &mut stack, Node::Text(decoded));
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => (),
        }
        buffer.clear();
    }

    while let Some(element) = stack.pop() {
        push_node(&mut doc, &mut stack, Node::Element(element));
    }

    doc
}

fn element_from_tag(tag: &BytesStart) -> Element {
    let name = String::from_utf8_lossy(tag.name().into_inner()).to_lowercase();
    let mut attrs = Vec::new();
    for attr in tag.attributes().flatten() {
        let key = String::from_utf8_lossy(attr.key.into_inner()).to_lowercase();
        let value = decode_html_entities(&String::from_utf8_lossy(&attr.value)).to_string();
        attrs.push((key, value));
    }
    Element {
        name,
        attrs,
        children: Vec::new(),
        keep: false,
    }
}

fn push_node(doc: &mut Document, stack: &mut Vec<Element>, node: Node) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => doc.children.push(node),
    }
}

fn close_until(doc: &mut Document, stack: &mut Vec<Element>, name: &str) {
    // A stray end tag with no matching open element is dropped.
    if !stack.iter().any(|el| el.name == name) {
        return;
    }
    loop {
        let element = match stack.pop() {
            Some(el) => el,
            None => return,
        };
        let matched = element.name == name;
        push_node(doc, stack, Node::Element(element));
        if matched {
            break;
        }
    }
}

fn collect_text(children: &[Node], out: &mut String) {
    for node in children {
        match node {
            Node::Text(t) => out.push_str(t),
            Node::Element(el) => collect_text(&el.children, out),
        }
    }
}

fn visit_in<F: FnMut(&mut Element)>(children: &mut Vec<Node>, f: &mut F) {
    for node in children {
        if let Node::Element(el) = node {
            f(el);
            visit_in(&mut el.children, f);
        }
    }
}

fn find_in<'a>(children: &'a [Node], pred: &dyn Fn(&Element) -> bool) -> Option<&'a Element> {
    for node in children {
        if let Node::Element(el) = node {
            if pred(el) {
                return Some(el);
            }
            if let Some(found) = find_in(&el.children, pred) {
                return Some(found);
            }
        }
    }
    None
}

fn detach_in(children: &mut Vec<Node>, pred: &dyn Fn(&Element) -> bool) {
    children.retain(|node| match node {
        Node::Element(el) => !pred(el),
        Node::Text(_) => true,
    });
    for node in children {
        if let Node::Element(el) = node {
            detach_in(&mut el.children, pred);
        }
    }
}

fn collect_keep<'a>(children: &'a [Node], out: &mut Vec<&'a Element>) {
    for node in children {
        if let Node::Element(el) = node {
            if el.keep {
                out.push(el);
            } else {
                collect_keep(&el.children, out);
            }
        }
    }
}
