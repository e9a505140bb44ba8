use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;

/// Opening delimiter of a placeholder.
pub const OPEN: &str = "{{";

/// A single `{{ ... }}` occurrence inside a template.
///
/// `raw` is the text between the delimiters exactly as written; the
/// canonical variable name is `raw` trimmed (see [`Placeholder::name`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placeholder<'t> {
    /// Byte offset of the opening `{{`.
    pub start: usize,
    /// Byte offset just past the closing `}}`.
    pub end: usize,
    pub raw: &'t str,
}

impl<'t> Placeholder<'t> {
    /// Canonical (trimmed) variable name.
    pub fn name(&self) -> &'t str {
        self.raw.trim()
    }

    pub fn kind(&self) -> NameKind {
        classify_name(self.name())
    }

    pub fn is_valid(&self) -> bool {
        self.kind() == NameKind::Valid
    }

    pub fn span(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Classification of a trimmed placeholder name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameKind {
    Valid,
    /// `{{}}` or `{{   }}`.
    Empty,
    /// Multi-word name such as `first name`.
    ContainsWhitespace,
}

/// Classify an already-trimmed name.
pub fn classify_name(name: &str) -> NameKind {
    if name.is_empty() {
        NameKind::Empty
    } else if name.chars().any(char::is_whitespace) {
        NameKind::ContainsWhitespace
    } else {
        NameKind::Valid
    }
}

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Content may not contain braces, so `{{ a {{ b }}` only matches `{{ b }}`
    // and stray delimiters never swallow neighbouring placeholders.
    RE.get_or_init(|| Regex::new(r"\{\{([^{}]*)\}\}").expect("valid regex"))
}

/// Iterate every placeholder occurrence in `template`, left to right.
///
/// Unmatched or malformed delimiters produce no item. Templates without any
/// `{{` skip the regex entirely.
pub fn placeholders(template: &str) -> impl Iterator<Item = Placeholder<'_>> {
    let has_open = memchr::memmem::find(template.as_bytes(), OPEN.as_bytes()).is_some();
    has_open
        .then(|| placeholder_regex().captures_iter(template))
        .into_iter()
        .flatten()
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let inner = caps.get(1)?;
            Some(Placeholder {
                start: whole.start(),
                end: whole.end(),
                raw: inner.as_str(),
            })
        })
}
