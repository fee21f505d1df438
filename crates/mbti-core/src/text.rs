//! Text normalisation applied before embedding.
//!
//! Mirrors the cleaning used when the classifier heads were fitted, so the
//! embedder sees the same distribution of text at inference time:
//!
//! 1. Lowercase everything
//! 2. Replace the `|||` post delimiter with a space
//! 3. Drop URLs (`http` followed by non-whitespace)
//! 4. Drop everything that is not an ASCII letter or whitespace
//! 5. Collapse whitespace runs to a single space
//! 6. Trim
//!
//! "Whitespace" throughout is [`is_space`]: Unicode `White_Space` plus the
//! ASCII information separators U+001C..=U+001F.

use std::sync::LazyLock;

use regex::Regex;

/// Delimiter separating individual posts in the training corpus.
const POST_DELIMITER: &str = "|||";

static URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"http[^\s\x1c-\x1f]+").unwrap());
static NON_ALPHA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z\s\x1c-\x1f]").unwrap());
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\s\x1c-\x1f]+").unwrap());

/// Whitespace as the normalizer and the empty-input check understand it.
pub fn is_space(c: char) -> bool {
    c.is_whitespace() || ('\u{1c}'..='\u{1f}').contains(&c)
}

/// `true` when `text` has nothing but whitespace (or nothing at all).
pub fn is_blank(text: &str) -> bool {
    text.chars().all(is_space)
}

/// Normalise raw user text into the form the embedder expects.
///
/// Total: every input, including the empty string, produces a (possibly
/// empty) string of lowercase ASCII letters separated by single spaces.
pub fn normalize(text: &str) -> String {
    let lower = text.to_lowercase();
    let joined = lower.replace(POST_DELIMITER, " ");
    let no_urls = URL.replace_all(&joined, "");
    let letters = NON_ALPHA.replace_all(&no_urls, "");
    let collapsed = WHITESPACE.replace_all(&letters, " ");
    collapsed.trim_matches(is_space).to_string()
}
