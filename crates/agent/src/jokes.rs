use anyhow::{bail, Context, Result};
use reqwest::Client;
use serde::Deserialize;

const JOKES: &[&str] = &[
    "I told my computer I needed a break, and it said 'no problem, I'll go to sleep.'",
    "Why do programmers prefer dark mode? Because light attracts bugs.",
    "There are only 10 kinds of people: those who understand binary and those who don't.",
    "I would tell you a UDP joke, but you might not get it.",
    "A SQL query walks into a bar, approaches two tables and asks: may I join you?",
    "Why did the developer go broke? Because they used up all their cache.",
];

pub fn local_joke(seed: usize) -> &'static str {
    JOKES[seed % JOKES.len()]
}

#[derive(Debug, Deserialize)]
struct FactResponse {
    #[serde(default)]
    text: String,
}

/// Random trivia from the facts service; used for the "fun fact" trigger.
pub async fn random_fact(http: &Client, url: &str) -> Result<String> {
    let response = http
        .get(url)
        .send()
        .await
        .context("facts service unreachable")?;

    if !response.status().is_success() {
        bail!("facts service answered {}", response.status());
    }

    let payload = response
        .json::<FactResponse>()
        .await
        .context("facts response unreadable")?;

    if payload.text.is_empty() {
        bail!("facts service returned an empty fact");
    }
    Ok(payload.text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joke_rotation_covers_the_list() {
        assert_ne!(local_joke(0), local_joke(1));
        assert_eq!(local_joke(0), local_joke(JOKES.len()));
    }
}
