use unicode_normalization::UnicodeNormalization;

/// Normalize free text for keyword containment checks.
///
/// Steps (order matters):
/// 1. Unicode NFKD normalization (decomposes accents and ligatures)
/// 2. Strip to ASCII
/// 3. Control characters become spaces
/// 4. Lowercase
/// 5. Collapse whitespace runs to a single space and trim
///
/// The output only contains printable ASCII, so normalizing it again is a
/// no-op.
pub fn normalize_text(text: &str) -> String {
    let ascii: String = text
        .nfkd()
        .filter(|c| c.is_ascii())
        .map(|c| {
            if c.is_ascii_control() {
                ' '
            } else {
                c.to_ascii_lowercase()
            }
        })
        .collect();

    ascii.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalize a handle into the key used to deduplicate candidates.
///
/// `" @Jean.Dupont "` → `"jean.dupont"`.
pub fn normalize_identifier(identifier: &str) -> String {
    identifier
        .trim()
        .trim_start_matches('@')
        .trim()
        .to_lowercase()
}
