use bosun_core::MemoryDocument;

/// "remember <key> is <value>" / "remember <key> = <value>". The remainder
/// arrives with the trigger already stripped.
pub fn remember(memory: &mut MemoryDocument, remainder: &str) -> String {
    let remainder = remainder.trim();

    let split = remainder
        .split_once(" is ")
        .or_else(|| remainder.split_once('='));

    let Some((key, value)) = split else {
        return "Use the format: remember <key> is <value>.".to_string();
    };

    let key = key.trim().to_string();
    let value = value.trim().to_string();
    if key.is_empty() || value.is_empty() {
        return "Use the format: remember <key> is <value>.".to_string();
    }

    memory.facts.insert(key.clone(), value.clone());
    format!("Saved: {key} equals {value}")
}

/// Read-only lookup; the orchestrator falls through to the generative
/// fallback when the key is unknown.
pub fn recall(memory: &MemoryDocument, key: &str) -> Option<String> {
    memory
        .facts
        .get(key.trim())
        .map(|value| format!("{} is {}.", key.trim(), value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remember_then_recall() {
        let mut memory = MemoryDocument::default();
        let saved = remember(&mut memory, "color is blue");
        assert_eq!(saved, "Saved: color equals blue");
        assert_eq!(recall(&memory, "color").as_deref(), Some("color is blue."));
    }

    #[test]
    fn recall_is_idempotent() {
        let mut memory = MemoryDocument::default();
        remember(&mut memory, "port = 8080");
        assert_eq!(recall(&memory, "port"), recall(&memory, "port"));
    }

    #[test]
    fn remember_overwrites() {
        let mut memory = MemoryDocument::default();
        remember(&mut memory, "color is blue");
        remember(&mut memory, "color is green");
        assert_eq!(recall(&memory, "color").as_deref(), Some("color is green."));
    }

    #[test]
    fn unknown_key_is_none() {
        assert!(recall(&MemoryDocument::default(), "nothing").is_none());
    }

    #[test]
    fn malformed_remember_explains_the_format() {
        let mut memory = MemoryDocument::default();
        assert!(remember(&mut memory, "just words").contains("format"));
        assert!(memory.facts.is_empty());
    }
}
