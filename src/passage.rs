//! Request orchestration: URL building, fetch, and the locate → parse →
//! transform → render pipeline. Everything below the fetch is pure over the
//! page bytes.

use std::time::Duration;

use reqwest::blocking::Client;
use tracing::debug;
use url::Url;

use crate::fetch::{self, FetchError};
use crate::fragment;
use crate::markup;
use crate::render::{self, RichPassage};
use crate::transform;

pub const DEFAULT_VERSION: &str = "ESV";

const PASSAGE_ENDPOINT: &str = "https://www.biblegateway.com/passage/";
const FETCH_DEADLINE: Duration = Duration::from_secs(10);

#[derive(Debug)]
pub struct PassageRequest {
    pub reference: String,
    pub version: String,
    pub rich: bool,
}

impl PassageRequest {
    pub fn new(reference: &str, version: Option<&str>, rich: bool) -> Self {
        Self {
            reference: reference.trim().to_string(),
            version: version.unwrap_or(DEFAULT_VERSION).to_string(),
            rich,
        }
    }
}

// The single terminal value per request; fetch failures are the Err arm of
// get_passage.
#[derive(Debug)]
pub enum PassageOutcome {
    Plain(String),
    Rich(RichPassage),
    NotFound,
    Empty,
}

pub struct PassageService {
    http: Client,
    endpoint: Url,
}

impl PassageService {
    pub fn new() -> Self {
        Self {
            http: Client::new(),
            endpoint: Url::parse(PASSAGE_ENDPOINT).expect("passage endpoint is a valid URL"),
        }
    }

    pub fn get_passage(&self, request: &PassageRequest) -> Result<PassageOutcome, FetchError> {
        let url = self.passage_url(&request.reference, &request.version);
        debug!(%url, "fetching passage page");
        let raw = fetch::fetch(&self.http, url, FETCH_DEADLINE)?;
        Ok(render_page(&raw, request))
    }

    fn passage_url(&self, reference: &str, version: &str) -> Url {
        let search = reference.trim().to_lowercase();
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("search", &search)
            .append_pair("version", version)
            .append_pair("interface", "print");
        url
    }
}

impl Default for PassageService {
    fn default() -> Self {
        Self::new()
    }
}

// The pipeline after the fetch. The heading is captured before the transform
// passes rewrite it, so rich-mode titles show the publisher's own wording.
pub fn render_page(raw: &[u8], request: &PassageRequest) -> PassageOutcome {
    let fragment = match fragment::locate(raw) {
        Some(bytes) => bytes,
        None => return PassageOutcome::NotFound,
    };

    let mut doc = markup::parse(fragment);
    // Clutter is detached before the heading is captured, so a heading
    // inside a footnotes or cross-reference block can never supply the
    // title.
    transform::strip_clutter(&mut doc);
    let heading = doc
        .find_first(&|el| transform::is_heading(&el.name))
        .map(|el| el.text());
    transform::run(&mut doc, request.rich);

    if request.rich {
        match render::render_rich(&doc, raw, &request.reference, &request.version, heading) {
            Some(rich) => PassageOutcome::Rich(rich),
            None => PassageOutcome::Empty,
        }
    } else {
        match render::render_plain(&doc, &request.reference, &request.version) {
            Some(text) => PassageOutcome::Plain(text),
            None => PassageOutcome::Empty,
        }
    }
}
