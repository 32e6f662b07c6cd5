use anyhow::Result;

use super::{MSGSTR_PREFIX, escape_po_value, msgids, msgstr_value, replace_msgstr_field};
use crate::backend::TranslationBackend;

/// Translate a plain entry. Blocks whose `msgstr` already holds text, blocks
/// without a `msgstr` field and empty sources come back unchanged without a
/// backend call.
pub async fn translate_direct<B>(backend: &B, block: &str, source_texts: &[String]) -> Result<String>
where
    B: TranslationBackend + ?Sized,
{
    match msgstr_value(block) {
        Some(value) if value.is_empty() => {}
        _ => return Ok(block.to_string()),
    }
    let Some(source) = source_texts.first().filter(|source| !source.is_empty()) else {
        return Ok(block.to_string());
    };

    let translated = backend.translate(source).await?;
    let field = format!("{MSGSTR_PREFIX}\"{}\"", escape_po_value(&translated));
    Ok(replace_msgstr_field(block, &field))
}

/// Treat the last two lines of the block as the `msgid`/`msgstr` pair and
/// translate only the last one. Everything above stays verbatim.
pub async fn translate_fallback<B>(backend: &B, block: &str) -> Result<String>
where
    B: TranslationBackend + ?Sized,
{
    let mut parts = block.split('\n').map(str::to_string).collect::<Vec<_>>();
    let Some(last) = parts.iter().rposition(|part| !part.is_empty()) else {
        return Ok(block.to_string());
    };
    if last == 0 {
        return Ok(block.to_string());
    }

    let ids = msgids(&parts[last - 1]);
    if ids.is_empty() {
        return Ok(block.to_string());
    }
    parts[last] = translate_direct(backend, &parts[last], &ids).await?;
    Ok(parts.join("\n"))
}
