//! Name normalization applied symmetrically to queries and gazetteer
//! entries before scoring.

/// Normalizes a place name for similarity scoring.
///
/// The pipeline:
/// 1. Lowercase
/// 2. Replace every non-alphanumeric character with a space
/// 3. Collapse whitespace
/// 4. Trim
#[must_use]
pub fn normalize(input: &str) -> String {
    let replaced: String = input
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();

    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Splits a normalized name into tokens sorted alphabetically and joined
/// by single spaces.
#[must_use]
pub fn sorted_tokens(normalized: &str) -> String {
    let mut tokens: Vec<&str> = normalized.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}
