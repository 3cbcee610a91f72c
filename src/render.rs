//! Flattens a transformed fragment tree into the final reply text, plus the
//! link-preview metadata in rich mode.

use lazy_static::lazy_static;
use regex::Regex;

use crate::fragment::find_subslice;
use crate::markup::Document;
use crate::transform::escape_reserved;

// The publisher tags the passage container with its canonical OSIS reference.
const OSIS_MARKER: &[u8] = b"data-osis=\"";

const SUMMARY_LIMIT: usize = 150;
// Bodies up to SUMMARY_LIMIT + SUMMARY_SLACK chars are returned whole; the
// ellipsis itself is three chars.
const SUMMARY_SLACK: usize = 3;

lazy_static! {
    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
}

#[derive(Debug)]
pub struct RichPassage {
    pub text: String,
    pub content_id: String,
    pub title: String,
    pub summary: String,
}

// Plain mode: header line, blank line, one paragraph per keep element. None
// means the fragment held no renderable verses.
pub fn render_plain(doc: &Document, reference: &str, version: &str) -> Option<String> {
    let keeps = doc.keep_elements();
    if keeps.is_empty() {
        return None;
    }
    let mut out = format!("{}({})\n\n", escape_reserved(&title_case(reference)), version);
    for element in keeps {
        out.push_str(element.text().trim());
        out.push_str("\n\n");
    }
    Some(out.trim_end().to_string())
}

pub fn render_rich(
    doc: &Document,
    raw: &[u8],
    reference: &str,
    version: &str,
    heading: Option<String>,
) -> Option<RichPassage> {
    let text = render_plain(doc, reference, version)?;
    let identifier = osis_identifier(raw).unwrap_or_default();
    let heading = heading.unwrap_or_else(|| title_case(reference));
    Some(RichPassage {
        summary: summarize(&text),
        content_id: format!("{}/{}", identifier, version),
        title: format!("{} ({})", heading.trim(), version),
        text,
    })
}

// Body after the header line, markdown stripped, whitespace collapsed,
// truncated for preview display.
pub fn summarize(text: &str) -> String {
    let body = text.split_once('\n').map(|(_, rest)| rest).unwrap_or("");
    // Escape backslashes drop first, then whatever '*' remains is a marker.
    let body = body.replace('\\', "");
    let body = body.replace('*', "");
    let body = WHITESPACE_RUN.replace_all(&body, " ");
    let body = body.trim();
    if body.chars().count() > SUMMARY_LIMIT + SUMMARY_SLACK {
        let cut: String = body.chars().take(SUMMARY_LIMIT).collect();
        format!("{}...", cut)
    } else {
        body.to_string()
    }
}

// "john 3:16" -> "John 3:16"; every alphabetic run restarts capitalization.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut boundary = true;
    for c in text.chars() {
        if c.is_alphabetic() {
            if boundary {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            boundary = false;
        } else {
            out.push(c);
            boundary = true;
        }
    }
    out
}

fn osis_identifier(raw: &[u8]) -> Option<String> {
    let start = find_subslice(raw, OSIS_MARKER)? + OSIS_MARKER.len();
    let rest = &raw[start..];
    let end = rest.iter().position(|&b| b == b'"')?;
    Some(String::from_utf8_lossy(&rest[..end]).to_string())
}
