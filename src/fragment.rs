//! Locates the passage container inside a fetched publisher page.

// The publisher wraps every rendered passage in this container and closes it
// with a comment sentinel.
const START_MARKER: &[u8] = b"<div class=\"passage-text\">";
const END_MARKER: &[u8] = b"<!--END .passage-text-->";

// Byte range [start, end) of the first passage rendering, or None when the
// page carries no passage at all (e.g. an unrecognized reference). A missing
// end marker extends the fragment to the end of input.
pub fn locate(raw: &[u8]) -> Option<&[u8]> {
    let start = find_subslice(raw, START_MARKER)?;
    let rest = &raw[start..];
    let end = find_subslice(rest, END_MARKER).unwrap_or(rest.len());
    Some(&rest[..end])
}

pub(crate) fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}
