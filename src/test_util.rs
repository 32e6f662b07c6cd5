#[cfg(test)]
pub(crate) fn with_temp_home<F, R>(func: F) -> R
where
    F: FnOnce(&std::path::Path) -> R,
{
    static HOME_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());
    let _guard = HOME_MUTEX.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let dir = tempfile::tempdir().expect("tempdir");
    let old_home = std::env::var("HOME").ok();
    let old_base = std::env::var(crate::paths::BASE_DIR_ENV).ok();
    // SAFETY: every test touching these variables holds HOME_MUTEX.
    unsafe {
        std::env::set_var("HOME", dir.path());
        std::env::remove_var(crate::paths::BASE_DIR_ENV);
    }
    let result = func(dir.path());
    unsafe {
        match old_home {
            Some(old) => std::env::set_var("HOME", old),
            None => std::env::remove_var("HOME"),
        }
        if let Some(old) = old_base {
            std::env::set_var(crate::paths::BASE_DIR_ENV, old);
        }
    }
    result
}

#[cfg(test)]
pub(crate) use fake::FakeBackend;

#[cfg(test)]
mod fake {
    use anyhow::anyhow;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::backend::{BackendFuture, TranslationBackend};

    /// In-memory backend: looks translations up in a table, echoes unknown
    /// text, optionally appends a suffix or fails every call.
    #[derive(Debug, Default)]
    pub(crate) struct FakeBackend {
        pairs: HashMap<String, String>,
        suffix: String,
        fail: bool,
        calls: AtomicUsize,
    }

    impl FakeBackend {
        pub(crate) fn identity() -> Self {
            Self::default()
        }

        pub(crate) fn with_pairs(pairs: &[(&str, &str)]) -> Self {
            Self {
                pairs: pairs
                    .iter()
                    .map(|(source, target)| (source.to_string(), target.to_string()))
                    .collect(),
                ..Self::default()
            }
        }

        pub(crate) fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        pub(crate) fn with_suffix(mut self, suffix: &str) -> Self {
            self.suffix = suffix.to_string();
            self
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl TranslationBackend for FakeBackend {
        fn target_language(&self) -> &str {
            "fr"
        }

        fn translate<'a>(&'a self, text: &'a str) -> BackendFuture<'a> {
            Box::pin(async move {
                self.calls.fetch_add(1, Ordering::SeqCst);
                if self.fail {
                    return Err(anyhow!("backend unavailable"));
                }
                let translated = self.pairs.get(text).map(String::as_str).unwrap_or(text);
                Ok(format!("{}{}", translated, self.suffix))
            })
        }
    }
}
