//! Static descriptions for predicted type codes.
//!
//! The table only covers a handful of types. Codes without an entry get
//! [`FALLBACK_DESCRIPTION`] rather than a generated one.

/// Shown for any code without an entry in [`DESCRIPTIONS`].
pub const FALLBACK_DESCRIPTION: &str = "Description not available for this type yet.";

/// Known type descriptions, keyed by upper-case code.
pub const DESCRIPTIONS: &[(&str, &str)] = &[
    ("INTP", "Thinkers: Analytical, logical, and curious."),
    ("INFJ", "Advocates: Insightful, altruistic, and idealistic."),
    ("ENFP", "Campaigners: Enthusiastic, creative, and sociable."),
    ("ESTJ", "Executives: Organized, direct, and practical."),
];

/// Look up the description for `code`, falling back to [`FALLBACK_DESCRIPTION`].
///
/// Accepts any string; matching ignores surrounding whitespace and case.
pub fn describe(code: &str) -> &'static str {
    let code = code.trim();
    DESCRIPTIONS
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(code))
        .map(|&(_, desc)| desc)
        .unwrap_or(FALLBACK_DESCRIPTION)
}
