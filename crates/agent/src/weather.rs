use anyhow::{bail, Context, Result};
use reqwest::Client;
use url::form_urlencoded;

/// One-line weather snippet for a location, empty location meaning "wherever
/// the service geolocates this host".
pub async fn weather_line(http: &Client, base_url: &str, location: &str) -> Result<String> {
    let url = if location.is_empty() {
        format!("{base_url}/?format=3")
    } else {
        let encoded: String =
            form_urlencoded::byte_serialize(location.as_bytes()).collect();
        format!("{base_url}/{encoded}?format=3")
    };

    let response = http
        .get(&url)
        .send()
        .await
        .context("weather service unreachable")?;

    if !response.status().is_success() {
        bail!("weather service answered {}", response.status());
    }

    let text = response
        .text()
        .await
        .context("weather response unreadable")?;

    let line = text.trim();
    if line.is_empty() {
        bail!("weather service returned an empty report");
    }
    Ok(line.to_string())
}
