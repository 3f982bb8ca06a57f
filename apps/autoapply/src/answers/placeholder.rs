//! Multilingual vocabulary of instructional option texts ("Select an option", "Choisissez…").

pub const PLACEHOLDER_TOKENS: &[&str] = &[
    "select",
    "sélect",
    "selecciona",
    "seleccione",
    "choose",
    "choisissez",
    "choisir",
    "auswählen",
    "wählen",
];

const NON_ANSWERS: &[&str] = &["none", "n/a", "na", "-", "null"];

/// True for instructional options that are not real answers. Blank options count.
pub fn is_placeholder_option(text: &str) -> bool {
    let lower = text.trim().to_lowercase();
    lower.is_empty() || PLACEHOLDER_TOKENS.iter().any(|tok| lower.contains(tok))
}

/// Blank text or the none/N/A family.
pub fn is_empty_answer(text: &str) -> bool {
    let lower = text.trim().to_lowercase();
    let bare = lower.trim_matches(|c: char| c == '.' || c == '!' || c.is_whitespace());
    bare.is_empty() || NON_ANSWERS.contains(&bare)
}

/// Broader check applied before persisting: placeholders plus the none/N/A family.
pub fn is_non_answer(text: &str) -> bool {
    is_placeholder_option(text) || is_empty_answer(text)
}
