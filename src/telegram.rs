//! Minimal Telegram Bot API surface: long polling plus the two reply calls
//! the bot needs, and the command dispatch that sits between the gateway and
//! the passage pipeline. The pipeline itself never touches this module.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::warn;

use crate::passage::{PassageOutcome, PassageRequest, PassageService};
use crate::render::RichPassage;

const API_BASE: &str = "https://api.telegram.org";

const START_REPLY: &str = "Hello! Please write /help to see the commands available.";
const HELP_REPLY: &str = "Available Commands :-\n\
    /verse <reference> [version] - Look up a passage\n\
    /ymi - Access YMI Devotion Site";
const YMI_REPLY: &str = "YMI => https://ymi.today/devotionals/";

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("telegram rejected the call: {0}")]
    Api(String),
}

#[derive(Debug, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
    pub inline_query: Option<InlineQuery>,
}

#[derive(Debug, Deserialize)]
pub struct Message {
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct InlineQuery {
    pub id: String,
    pub query: String,
}

#[derive(Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    description: Option<String>,
    result: Option<T>,
}

pub struct Gateway {
    http: Client,
    base: String,
    poll_timeout: Duration,
}

impl Gateway {
    pub fn new(token: &str, poll_timeout: Duration) -> Result<Self, GatewayError> {
        // The poll call holds the connection open for poll_timeout, so the
        // client deadline must sit above it.
        let http = Client::builder()
            .timeout(poll_timeout + Duration::from_secs(10))
            .build()?;
        Ok(Self {
            http,
            base: format!("{}/bot{}", API_BASE, token),
            poll_timeout,
        })
    }

    pub fn get_updates(&self, offset: i64) -> Result<Vec<Update>, GatewayError> {
        self.call(
            "getUpdates",
            &json!({
                "offset": offset,
                "timeout": self.poll_timeout.as_secs(),
                "allowed_updates": ["message", "inline_query"],
            }),
        )
    }

    pub fn send_message(&self, chat_id: i64, text: &str) -> Result<(), GatewayError> {
        let _: serde_json::Value = self.call(
            "sendMessage",
            &json!({
                "chat_id": chat_id,
                "text": text,
                "parse_mode": "Markdown",
            }),
        )?;
        Ok(())
    }

    pub fn answer_inline_query(
        &self,
        query_id: &str,
        passage: &RichPassage,
    ) -> Result<(), GatewayError> {
        let _: serde_json::Value = self.call(
            "answerInlineQuery",
            &json!({
                "inline_query_id": query_id,
                "results": [{
                    "type": "article",
                    "id": passage.content_id,
                    "title": passage.title,
                    "description": passage.summary,
                    "input_message_content": {
                        "message_text": passage.text,
                        "parse_mode": "Markdown",
                    },
                }],
            }),
        )?;
        Ok(())
    }

    fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: &serde_json::Value,
    ) -> Result<T, GatewayError> {
        let url = format!("{}/{}", self.base, method);
        let response: ApiResponse<T> = self.http.post(&url).json(params).send()?.json()?;
        if !response.ok {
            return Err(GatewayError::Api(
                response
                    .description
                    .unwrap_or_else(|| "unknown error".to_string()),
            ));
        }
        response
            .result
            .ok_or_else(|| GatewayError::Api("missing result".to_string()))
    }
}

pub fn handle_update(
    gateway: &Gateway,
    service: &PassageService,
    default_version: &str,
    update: Update,
) -> Result<(), GatewayError> {
    if let Some(query) = update.inline_query {
        return handle_inline(gateway, service, default_version, query);
    }
    let message = match update.message {
        Some(message) => message,
        None => return Ok(()),
    };
    let text = match message.text {
        Some(text) => text,
        None => return Ok(()),
    };
    let chat_id = message.chat.id;

    if let Some(args) = command_args(&text, "/verse") {
        let reply = verse_reply(service, args, default_version);
        return gateway.send_message(chat_id, &reply);
    }
    if command_args(&text, "/start").is_some() {
        return gateway.send_message(chat_id, START_REPLY);
    }
    if command_args(&text, "/help").is_some() {
        return gateway.send_message(chat_id, HELP_REPLY);
    }
    if command_args(&text, "/ymi").is_some() {
        return gateway.send_message(chat_id, YMI_REPLY);
    }
    if text.starts_with('/') {
        return gateway.send_message(
            chat_id,
            &format!("Sorry '{}' is not a valid command", text),
        );
    }
    gateway.send_message(
        chat_id,
        &format!("Sorry I can't recognize you , you said '{}'", text),
    )
}

// Argument tail of a command message, or None when the text is some other
// command. The command token must end at the text, at whitespace, or at a
// group-chat "@BotName" mention, so "/verseabc" never matches "/verse".
pub fn command_args<'a>(text: &'a str, command: &str) -> Option<&'a str> {
    let rest = text.strip_prefix(command)?;
    if rest.is_empty() {
        return Some("");
    }
    if let Some(mention) = rest.strip_prefix('@') {
        return match mention.split_once(char::is_whitespace) {
            Some((_, args)) => Some(args),
            None => Some(""),
        };
    }
    if rest.starts_with(char::is_whitespace) {
        return Some(rest);
    }
    None
}

fn handle_inline(
    gateway: &Gateway,
    service: &PassageService,
    default_version: &str,
    query: InlineQuery,
) -> Result<(), GatewayError> {
    let text = query.query.trim();
    if text.is_empty() {
        return Ok(());
    }
    let (reference, version) = split_version(text, default_version);
    let request = PassageRequest::new(reference, Some(version), true);
    match service.get_passage(&request) {
        Ok(PassageOutcome::Rich(rich)) => gateway.answer_inline_query(&query.id, &rich),
        Ok(_) => Ok(()),
        Err(e) => {
            warn!(error = %e, reference, "inline passage lookup failed");
            Ok(())
        }
    }
}

fn verse_reply(service: &PassageService, args: &str, default_version: &str) -> String {
    let args = args.trim();
    if args.is_empty() {
        return "Usage: /verse <reference> [version]".to_string();
    }
    let (reference, version) = split_version(args, default_version);
    let request = PassageRequest::new(reference, Some(version), false);
    match service.get_passage(&request) {
        Ok(PassageOutcome::Plain(text)) => text,
        // Plain requests never produce the rich variant, but relay the text
        // if one ever shows up.
        Ok(PassageOutcome::Rich(rich)) => rich.text,
        Ok(PassageOutcome::NotFound) => format!("Sorry, I don't recognize '{}'", reference),
        Ok(PassageOutcome::Empty) => format!("No passage content for '{}'", reference),
        Err(e) => {
            warn!(error = %e, reference, "passage fetch failed");
            "Could not retrieve the passage, please try again later".to_string()
        }
    }
}

// A trailing all-caps token names the translation; everything else is the
// reference.
pub fn split_version<'a>(args: &'a str, default_version: &'a str) -> (&'a str, &'a str) {
    if let Some((head, tail)) = args.rsplit_once(' ') {
        if tail.len() >= 2 && tail.chars().all(|c| c.is_ascii_uppercase()) {
            return (head.trim(), tail);
        }
    }
    (args, default_version)
}
