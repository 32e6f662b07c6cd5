use anyhow::Result;
use std::future::Future;
use std::pin::Pin;

/// Characters a translation service is known to append to multi-line
/// translations; stripped by the rewriter without looking at them.
pub const SUFFIX_ARTIFACT_LEN: usize = 2;

pub type BackendFuture<'a> = Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>>;

/// A translation service bound to one target language. Implementations must
/// reject unsupported languages when they are built, not on first use.
pub trait TranslationBackend: Send + Sync {
    fn target_language(&self) -> &str;

    fn translate<'a>(&'a self, text: &'a str) -> BackendFuture<'a>;

    /// Characters the rewriter drops from the end of a multi-line
    /// translation. The default of two matches the machine-translation
    /// service the catalog layout was tuned against, which closes those
    /// translations with a two-character artifact. `Translator` returns 0
    /// on purpose: tool-call output carries no such suffix, and stripping
    /// would eat real text.
    fn suffix_artifact_len(&self) -> usize {
        SUFFIX_ARTIFACT_LEN
    }
}
