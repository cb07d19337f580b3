//! Blocking HTTP clients for the two NLP sidecars: the dependency
//! parser and the word-sense disambiguation service. Both speak plain
//! JSON; both are called from `spawn_blocking`, so the blocking reqwest
//! client is the right tool.

use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use wordhints_core::{ParsedToken, Parser, SenseClassifier, TextHolder};
use wordhints_types::UniversalPos;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

fn http_client() -> Result<Client> {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .context("build http client")
}

/// Client for the dependency-parser sidecar.
pub struct RemoteParser {
    client: Client,
    url: String,
}

impl RemoteParser {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: http_client()?,
            url: url.into(),
        })
    }
}

#[derive(Serialize)]
struct ParseRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct WireToken {
    text: String,
    lemma: String,
    pos: String,
    tag: String,
    dep: String,
    head: usize,
    #[serde(default)]
    is_sent_start: bool,
}

impl Parser for RemoteParser {
    fn parse(&self, text: &str) -> Result<Vec<ParsedToken>> {
        let tokens: Vec<WireToken> = self
            .client
            .post(&self.url)
            .json(&ParseRequest { text })
            .send()
            .context("call parser service")?
            .error_for_status()
            .context("parser service returned an error")?
            .json()
            .context("decode parser response")?;
        Ok(tokens
            .into_iter()
            .map(|token| ParsedToken {
                pos: UniversalPos::from_tag(&token.pos),
                text: token.text,
                lemma: token.lemma,
                tag: token.tag,
                dep: token.dep,
                head: token.head,
                is_sent_start: token.is_sent_start,
            })
            .collect())
    }
}

/// Client for the word-sense disambiguation sidecar. The whole text is
/// disambiguated in a single round trip; the sidecar answers with one
/// optional sense key per requested target, in order.
pub struct RemoteSenseClassifier {
    client: Client,
    url: String,
}

impl RemoteSenseClassifier {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: http_client()?,
            url: url.into(),
        })
    }
}

#[derive(Serialize)]
struct DisambiguateRequest<'a> {
    tokens: Vec<WsdToken>,
    targets: &'a [usize],
}

#[derive(Serialize)]
struct WsdToken {
    text: String,
    lemma: String,
    pos: &'static str,
}

#[derive(Deserialize)]
struct DisambiguateResponse {
    senses: Vec<Option<String>>,
}

impl SenseClassifier for RemoteSenseClassifier {
    fn disambiguate(
        &self,
        holder: &TextHolder,
        targets: &[usize],
    ) -> Result<HashMap<usize, String>> {
        if targets.is_empty() {
            return Ok(HashMap::new());
        }

        // Phrasal bases go over the wire as one underscored lemma so the
        // sidecar can match multi-word WordNet entries.
        let tokens: Vec<WsdToken> = holder
            .iter()
            .map(|token| {
                let lemma = if matches!(token.is_phrasal_base_verb(), Ok(true)) {
                    token.lemma_extended().replace(' ', "_")
                } else {
                    token.lemma().to_string()
                };
                WsdToken {
                    text: token.text().to_string(),
                    lemma,
                    pos: token.pos().as_tag(),
                }
            })
            .collect();

        let response: DisambiguateResponse = self
            .client
            .post(&self.url)
            .json(&DisambiguateRequest { tokens, targets })
            .send()
            .context("call disambiguation service")?
            .error_for_status()
            .context("disambiguation service returned an error")?
            .json()
            .context("decode disambiguation response")?;

        if response.senses.len() != targets.len() {
            bail!(
                "disambiguation service answered {} senses for {} targets",
                response.senses.len(),
                targets.len()
            );
        }
        Ok(targets
            .iter()
            .zip(response.senses)
            .filter_map(|(&index, sense)| sense.map(|sense| (index, sense)))
            .collect())
    }
}
