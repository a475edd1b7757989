use anyhow::{bail, Result};
use bosun_storage::ContactBook;
use once_cell::sync::Lazy;
use regex::Regex;
use url::form_urlencoded;

/// Narrow outbound-messaging contract: recipient and body in, confirmation
/// text out.
pub trait MessageGateway: Send + Sync {
    fn send(&self, number: &str, body: &str) -> Result<String>;
}

/// Default gateway: produces a click-to-send link rather than driving a
/// browser session.
pub struct LinkGateway;

impl MessageGateway for LinkGateway {
    fn send(&self, number: &str, body: &str) -> Result<String> {
        let digits = number.trim_start_matches('+');
        let encoded: String = form_urlencoded::byte_serialize(body.as_bytes()).collect();
        Ok(format!(
            "Message for {number} is ready: https://wa.me/{digits}?text={encoded}"
        ))
    }
}

static SEND_GRAMMAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^to\s+(.+?)\s+saying\s+(.+)$").expect("valid messaging grammar regex")
});

/// Remainder grammar of the messaging handler:
/// "to <contact-or-number> saying <message>". Contact names resolve through
/// the contact book.
pub fn send_message(
    gateway: &dyn MessageGateway,
    contacts: &ContactBook,
    remainder: &str,
) -> Result<String> {
    let Some(captures) = SEND_GRAMMAR.captures(remainder.trim()) else {
        bail!("say it like: send whatsapp to <contact> saying <message>");
    };

    let recipient = captures[1].trim();
    let body = captures[2].trim();

    let number = match contacts.get(&recipient.to_lowercase()) {
        Some(number) => number.clone(),
        None => recipient.to_string(),
    };

    let number: String = number
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect();
    if !number.starts_with('+') || number.len() < 8 {
        bail!("'{recipient}' is not a saved contact or a full number with country code (+...)");
    }

    gateway.send(&number, body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contacts() -> ContactBook {
        let mut book = ContactBook::new();
        book.insert("mom".to_string(), "+15551234567".to_string());
        book
    }

    #[test]
    fn resolves_contact_names() {
        let reply = send_message(&LinkGateway, &contacts(), "to mom saying on my way").unwrap();
        assert!(reply.contains("+15551234567"));
        assert!(reply.contains("wa.me/15551234567"));
        assert!(reply.contains("text=on+my+way"));
    }

    #[test]
    fn accepts_raw_international_numbers() {
        let reply =
            send_message(&LinkGateway, &ContactBook::new(), "to +44 7700 900123 saying hi")
                .unwrap();
        assert!(reply.contains("wa.me/447700900123"));
    }

    #[test]
    fn rejects_numbers_without_country_code() {
        assert!(send_message(&LinkGateway, &ContactBook::new(), "to 12345 saying hi").is_err());
    }

    #[test]
    fn rejects_malformed_grammar() {
        assert!(send_message(&LinkGateway, &ContactBook::new(), "hello there").is_err());
    }
}
