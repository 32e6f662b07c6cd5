use anyhow::Result;

use super::multiline::MultilineText;
use super::{ESCAPED_NEWLINE, MSGSTR_PREFIX, escape_po_value, replace_msgstr_field};
use crate::backend::TranslationBackend;

pub const CHUNK_WIDTH: usize = 80;

/// Translate a multi-line entry and write the result into the block's
/// `msgstr` field using the same wrapping style as the `msgid`.
pub async fn rewrite<B>(backend: &B, text: &MultilineText, block: &str) -> Result<String>
where
    B: TranslationBackend + ?Sized,
{
    let raw = backend.translate(&text.content).await?;
    let translated = strip_suffix_artifact(&raw, backend.suffix_artifact_len());
    let lines = wrap_translation(&escape_po_value(translated), text.indentation_depth);
    Ok(replace_msgstr_field(
        block,
        &assemble_field(&lines, &text.indent()),
    ))
}

/// Drop exactly `len` trailing characters from a raw backend result.
pub(crate) fn strip_suffix_artifact(raw: &str, len: usize) -> &str {
    let keep = raw.chars().count().saturating_sub(len);
    match raw.char_indices().nth(keep) {
        Some((index, _)) => &raw[..index],
        None => raw,
    }
}

/// Cut `text` into quoted lines of at most [`CHUNK_WIDTH`] characters. The
/// first line carries the indentation and is shortened by its width; a `\n`
/// escape ending any later chunk is dropped; the last line always ends in
/// `\n"`.
pub fn wrap_translation(text: &str, indentation_depth: usize) -> Vec<String> {
    let chars = text.chars().collect::<Vec<_>>();
    let indent = " ".repeat(indentation_depth);
    let first_width = CHUNK_WIDTH.saturating_sub(indentation_depth);

    let mut lines = Vec::new();
    let mut cursor = 0;
    while cursor < chars.len() {
        let first = lines.is_empty();
        let width = if first { first_width } else { CHUNK_WIDTH };
        let end = chunk_end(&chars, cursor, width);
        let chunk = chars[cursor..end].iter().collect::<String>();
        if first {
            lines.push(format!("\"{indent}{chunk}\""));
        } else if let Some(stripped) = chunk.strip_suffix(ESCAPED_NEWLINE) {
            lines.push(format!("\"{stripped}\""));
        } else {
            lines.push(format!("\"{chunk}\""));
        }
        cursor = end;
    }

    if lines.is_empty() {
        lines.push(format!("\"{indent}\""));
    }
    if let Some(last) = lines.last_mut() {
        last.pop();
        last.push_str(ESCAPED_NEWLINE);
        last.push('"');
    }
    lines
}

// A boundary inside an escape sequence would leave a dangling backslash that
// escapes the closing quote, so such a chunk gives its last char to the next.
// Only the first chunk can end up empty, when the indentation leaves it one
// column or none.
fn chunk_end(chars: &[char], start: usize, width: usize) -> usize {
    let end = (start + width).min(chars.len());
    if end == chars.len() {
        return end;
    }
    let backslashes = chars[start..end]
        .iter()
        .rev()
        .take_while(|ch| **ch == '\\')
        .count();
    if backslashes % 2 == 1 { end - 1 } else { end }
}

fn assemble_field(lines: &[String], indent: &str) -> String {
    let indent_line = format!("\"{indent}\"");
    let mut field = Vec::with_capacity(lines.len() + 4);
    field.push(format!("{MSGSTR_PREFIX}\"\""));
    field.push(format!("\"{ESCAPED_NEWLINE}\""));
    field.push(indent_line.clone());
    field.extend(lines.iter().cloned());
    field.push(indent_line);
    field.join("\n")
}
