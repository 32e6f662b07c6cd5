use regex::Regex;
use std::sync::LazyLock;

use super::{ESCAPED_NEWLINE, unquote};

static MSGID_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"msgid ""\n"\\n"\n((?:".*"\n)+)msgstr"#).expect("multi-line msgid pattern")
});

static MSGSTR_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"msgstr ""\n"\\n"\n((?:".*"(?:\n|\z))+)"#).expect("multi-line msgstr pattern")
});

// Fragments that only carry formatting, never text.
const MARKER_FRAGMENTS: [&str; 5] = ["", "\"", "'", "\"\"", "''"];

/// Logical text of a multi-line entry together with the indentation used
/// inside its quoted continuation lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultilineText {
    pub content: String,
    pub indentation_depth: usize,
}

impl MultilineText {
    /// Read the `msgid` of a block written in the canonical multi-line shape:
    /// `msgid ""`, a `"\n"` line, quoted continuation lines, then `msgstr`.
    pub fn parse(block: &str) -> Option<Self> {
        let caps = MSGID_BLOCK_RE.captures(block)?;
        Some(Self::from_continuation_lines(caps.get(1)?.as_str()))
    }

    /// Same shape, read from the `msgstr` field instead.
    pub fn parse_msgstr(block: &str) -> Option<Self> {
        let caps = MSGSTR_BLOCK_RE.captures(block)?;
        Some(Self::from_continuation_lines(caps.get(1)?.as_str()))
    }

    /// Depth comes from the first whitespace/punctuation-only fragment and is
    /// fixed from then on. Text fragments lose one trailing `\n` escape and
    /// surrounding whitespace, then get joined with single spaces.
    pub fn from_continuation_lines(lines: &str) -> Self {
        let mut fragments = Vec::new();
        let mut depth = None;
        for line in lines.lines() {
            let fragment = unquote(line);
            if is_artifact(fragment) {
                continue;
            }
            if MARKER_FRAGMENTS.contains(&fragment.trim()) {
                depth.get_or_insert_with(|| leading_spaces(fragment));
                continue;
            }
            let text = fragment
                .strip_suffix(ESCAPED_NEWLINE)
                .unwrap_or(fragment)
                .trim();
            if !text.is_empty() {
                fragments.push(text);
            }
        }

        Self {
            content: fragments.join(" "),
            indentation_depth: depth.unwrap_or(0),
        }
    }

    pub fn indent(&self) -> String {
        " ".repeat(self.indentation_depth)
    }
}

fn is_artifact(fragment: &str) -> bool {
    fragment.is_empty() || fragment == "\"" || fragment == ESCAPED_NEWLINE
}

fn leading_spaces(fragment: &str) -> usize {
    fragment.chars().take_while(|ch| *ch == ' ').count()
}
