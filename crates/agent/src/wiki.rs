use anyhow::{bail, Context, Result};
use reqwest::Client;
use serde::Deserialize;
use url::form_urlencoded;

#[derive(Debug, Deserialize)]
struct SummaryResponse {
    #[serde(default)]
    extract: String,
}

/// Encyclopedia summary for a topic: the first two sentences of the page
/// extract.
pub async fn summary(http: &Client, base_url: &str, topic: &str) -> Result<String> {
    if topic.is_empty() {
        bail!("no topic given");
    }

    let title: String =
        form_urlencoded::byte_serialize(topic.replace(' ', "_").as_bytes()).collect();
    let url = format!("{base_url}/{title}");

    let response = http
        .get(&url)
        .send()
        .await
        .context("encyclopedia service unreachable")?;

    if !response.status().is_success() {
        bail!("no article found for '{topic}'");
    }

    let payload = response
        .json::<SummaryResponse>()
        .await
        .context("encyclopedia response unreadable")?;

    if payload.extract.is_empty() {
        bail!("article for '{topic}' has no summary");
    }

    Ok(first_sentences(&payload.extract, 2))
}

fn first_sentences(text: &str, count: usize) -> String {
    let mut taken = Vec::new();
    for sentence in text.split_inclusive(". ") {
        taken.push(sentence);
        if taken.len() == count {
            break;
        }
    }
    taken.concat().trim().to_string()
}
