//! Level normalization rules shared by every parser and the ingest path.

/// Normalize a raw level token to the record's canonical short uppercase tag.
///
/// Empty input stays empty — an absent level must never be rewritten to a
/// default, it has to round-trip as `""`.
pub fn normalize(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    match trimmed.to_ascii_uppercase().as_str() {
        "ERR" => "ERROR".to_string(),
        "WARNING" => "WARN".to_string(),
        "DBG" => "DEBUG".to_string(),
        "CRITICAL" | "CRIT" => "FATAL".to_string(),
        other => other.to_string(),
    }
}
