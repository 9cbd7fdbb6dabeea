use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::FetchError;

/// The endpoint the application fetches its jokes from
pub const DEFAULT_API_URL: &str =
    "https://v2.jokeapi.dev/joke/Any?lang=fr&blacklistFlags=religious,political,racist,sexist&safe-mode";

/// Shown in place of a joke when none could be fetched
pub const FALLBACK_JOKE: &str = "Impossible de récupérer une blague.";

/// The text of a joke, ready for display
pub type JokeText = String;

/// A joke as returned by JokeAPI
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum JokePayload {
    Single { joke: String },
    #[serde(rename = "twopart")]
    TwoPart { setup: String, delivery: String },
}

impl JokePayload {
    /// Flatten the payload into display text; two-part jokes keep their pause
    pub fn into_text(self) -> JokeText {
        match self {
            JokePayload::Single { joke } => joke,
            JokePayload::TwoPart { setup, delivery } => format!("{setup} ... {delivery}"),
        }
    }
}

/// Where jokes come from
#[async_trait]
pub trait JokeSource: Send + Sync {
    async fn fetch(&self) -> Result<JokeText, FetchError>;
}

/// Fetches jokes over HTTP from a JokeAPI-compatible endpoint
#[derive(Clone, Debug)]
pub struct HttpJokeSource {
    client: reqwest::Client,
    url: String,
}

impl HttpJokeSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<HttpJokeSource, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(HttpJokeSource {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl JokeSource for HttpJokeSource {
    async fn fetch(&self) -> Result<JokeText, FetchError> {
        tracing::debug!(url = %self.url, "fetching joke");
        let body = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let payload: JokePayload = serde_json::from_str(&body)?;
        Ok(payload.into_text())
    }
}
