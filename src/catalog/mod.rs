use regex::Regex;
use std::sync::LazyLock;

mod driver;
mod multiline;
mod rewrite;
mod single;

pub use driver::{CatalogDriver, FileReport, RestoreReport, catalog_path, restore_catalogs};
pub use multiline::MultilineText;
pub use rewrite::{CHUNK_WIDTH, rewrite, wrap_translation};
pub use single::{translate_direct, translate_fallback};

pub const BLOCK_SEPARATOR: &str = "\n\n";
pub const DEFAULT_CATALOG_NAME: &str = "django.po";

pub(crate) const MSGSTR_PREFIX: &str = "msgstr ";
pub(crate) const ESCAPED_NEWLINE: &str = "\\n";

// The value runs to the first unescaped quote.
static MSGID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"msgid "((?:[^"\\]|\\.)*)""#).expect("msgid pattern")
});

/// Shape of one catalog block, decided before any translation happens.
///
/// The multi-line shape is only considered when the block carries exactly one
/// `msgid` and that id is the empty string; every other single-id block is a
/// plain entry, and blocks with zero or several ids take the fallback path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Plain { source: String },
    Multiline(MultilineText),
    HeaderOrMalformed,
}

impl Entry {
    pub fn classify(block: &str) -> Self {
        let mut ids = msgids(block);
        if ids.len() != 1 {
            return Entry::HeaderOrMalformed;
        }
        let source = ids.remove(0);
        if source.is_empty()
            && let Some(text) = MultilineText::parse(block)
        {
            return Entry::Multiline(text);
        }
        Entry::Plain { source }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Entry::Plain { .. } => "plain",
            Entry::Multiline(_) => "multiline",
            Entry::HeaderOrMalformed => "header",
        }
    }
}

/// Every `msgid "..."` value in the text, in order of appearance.
pub fn msgids(text: &str) -> Vec<String> {
    MSGID_RE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).map(|value| value.as_str().to_string()))
        .collect()
}

/// Split catalog text into blocks, dropping empty fragments.
pub fn split_blocks(content: &str) -> Vec<&str> {
    content
        .split(BLOCK_SEPARATOR)
        .filter(|block| !block.is_empty())
        .collect()
}

pub fn join_blocks(blocks: &[String]) -> String {
    blocks.join(BLOCK_SEPARATOR)
}

/// Concatenated value of the `msgstr` field: the `msgstr` line plus every
/// quoted continuation line after it. `None` when the text has no such field.
pub(crate) fn msgstr_value(text: &str) -> Option<String> {
    let lines = text.split('\n').collect::<Vec<_>>();
    let (start, end) = msgstr_span(&lines)?;
    let mut value = unquote(&lines[start][MSGSTR_PREFIX.len()..]).to_string();
    for line in &lines[start + 1..end] {
        value.push_str(unquote(line));
    }
    Some(value)
}

/// Replace the whole `msgstr` field (including continuation lines) with
/// `field`, keeping every other line and the trailing newline as they were.
pub(crate) fn replace_msgstr_field(text: &str, field: &str) -> String {
    let lines = text.split('\n').collect::<Vec<_>>();
    let Some((start, end)) = msgstr_span(&lines) else {
        return text.to_string();
    };
    let mut out = Vec::with_capacity(lines.len());
    out.extend_from_slice(&lines[..start]);
    out.push(field);
    out.extend_from_slice(&lines[end..]);
    out.join("\n")
}

fn msgstr_span(lines: &[&str]) -> Option<(usize, usize)> {
    let start = lines
        .iter()
        .position(|line| line.starts_with(MSGSTR_PREFIX))?;
    let end = lines[start + 1..]
        .iter()
        .position(|line| !line.starts_with('"'))
        .map_or(lines.len(), |offset| start + 1 + offset);
    Some((start, end))
}

pub(crate) fn unquote(value: &str) -> &str {
    let value = value.trim();
    value
        .strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(value)
}

/// Make backend output safe inside a quoted PO value. Bare quotes and raw
/// newlines are escaped; existing escape sequences pass through untouched.
pub(crate) fn escape_po_value(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut escaping = false;
    for ch in text.chars() {
        if escaping {
            out.push(ch);
            escaping = false;
            continue;
        }
        match ch {
            '\\' => {
                out.push(ch);
                escaping = true;
            }
            '"' => out.push_str("\\\""),
            '\n' => out.push_str(ESCAPED_NEWLINE),
            '\r' => {}
            _ => out.push(ch),
        }
    }
    if escaping {
        out.push('\\');
    }
    out
}
