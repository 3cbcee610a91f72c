use std::time::Duration;

use reqwest::blocking::Client;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request exceeded its deadline")]
    Timeout,
    #[error("transport error: {0}")]
    Transport(reqwest::Error),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Transport(e)
        }
    }
}

// Single GET with a hard deadline, no retries. The body is returned for any
// HTTP status; the fragment locator decides whether it is usable.
pub fn fetch(client: &Client, url: Url, deadline: Duration) -> Result<Vec<u8>, FetchError> {
    let response = client.get(url).timeout(deadline).send()?;
    let body = response.bytes()?;
    Ok(body.to_vec())
}
