//! Free-text sanitisation for user-supplied content.
//!
//! Messages, descriptions, bios, and posts are stored as plain text. Markup
//! is removed rather than escaped: `<script>` and `<style>` blocks are
//! dropped with their contents, any remaining tags are stripped, and control
//! characters other than newlines and tabs are discarded.

use std::sync::LazyLock;

use regex::Regex;

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|error| panic!("sanitiser regex failed to compile: {error}"))
}

/// `<script>`/`<style>` blocks with their contents. An unterminated opening
/// tag drops everything after it.
///
/// # Panics
///
/// Panics on first use if the pattern fails to compile.
static BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?is)<\s*(script|style)\b[^>]*>.*?<\s*/\s*(script|style)\s*>|<\s*(script|style)\b[^>]*>.*")
});

/// A complete tag. A `<` with no closing `>` before the next `<` is text.
///
/// # Panics
///
/// Panics on first use if the pattern fails to compile.
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"<\s*/?\s*[A-Za-z!][^<>]*>"));

static BLANK_LINES_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"\n{3,}"));

fn strip_markup(input: &str) -> String {
    let without_blocks = BLOCK_RE.replace_all(input, "");
    let without_tags = TAG_RE.replace_all(&without_blocks, "");
    without_tags
        .chars()
        .filter(|ch| !ch.is_control() || *ch == '\n' || *ch == '\t')
        .collect()
}

/// Sanitise single-line text: strip markup and collapse all whitespace runs
/// into single spaces.
///
/// # Examples
/// ```
/// use dfds_backend::domain::sanitize::sanitize_inline;
///
/// let clean = sanitize_inline("  lunch <b>money</b><script>alert(1)</script> ");
/// assert_eq!(clean, "lunch money");
/// ```
pub fn sanitize_inline(input: &str) -> String {
    strip_markup(input)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Sanitise multi-line text: strip markup, normalise line endings, trim
/// trailing whitespace per line, and keep at most one blank line in a row.
pub fn sanitize_multiline(input: &str) -> String {
    let normalised = input.replace("\r\n", "\n").replace('\r', "\n");
    let stripped = strip_markup(&normalised);
    let trimmed_lines = stripped
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n");
    BLANK_LINES_RE
        .replace_all(trimmed_lines.trim(), "\n\n")
        .into_owned()
}

/// Errors raised when sanitised text violates length bounds.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TextBoundsError {
    /// The text was empty after sanitising.
    #[error("must not be empty")]
    Empty,
    /// The text was shorter than the minimum.
    #[error("must be at least {min} characters")]
    TooShort { min: usize },
    /// The text exceeded the maximum.
    #[error("must be at most {max} characters")]
    TooLong { max: usize },
}

/// Check the character count of already-sanitised text against bounds.
pub fn check_bounds(text: &str, min: usize, max: usize) -> Result<(), TextBoundsError> {
    let length = text.chars().count();
    if length == 0 && min > 0 {
        return Err(TextBoundsError::Empty);
    }
    if length < min {
        return Err(TextBoundsError::TooShort { min });
    }
    if length > max {
        return Err(TextBoundsError::TooLong { max });
    }
    Ok(())
}
