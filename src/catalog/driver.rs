use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::multiline::MultilineText;
use super::{
    DEFAULT_CATALOG_NAME, Entry, join_blocks, msgstr_value, rewrite, split_blocks,
    translate_direct, translate_fallback,
};
use crate::backend::TranslationBackend;
use crate::backup::{BackupEntry, BackupStore};
use crate::error::CatalogError;

const MESSAGES_DIR: &str = "LC_MESSAGES";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub path: PathBuf,
    pub translated: usize,
    pub skipped: usize,
    pub written: bool,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreReport {
    pub path: PathBuf,
    pub backup: BackupEntry,
}

/// Walks the configured locale roots and translates the catalog of the
/// backend's target language in each one, one file at a time.
#[derive(Debug)]
pub struct CatalogDriver<B> {
    backend: B,
    locale_paths: Vec<PathBuf>,
    catalog_name: String,
    backup: Option<(BackupStore, u64)>,
    dry_run: bool,
}

impl<B: TranslationBackend> CatalogDriver<B> {
    pub fn new(backend: B, locale_paths: Vec<PathBuf>) -> Self {
        Self {
            backend,
            locale_paths,
            catalog_name: DEFAULT_CATALOG_NAME.to_string(),
            backup: None,
            dry_run: false,
        }
    }

    pub fn with_catalog_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !name.trim().is_empty() {
            self.catalog_name = name;
        }
        self
    }

    /// Copy every catalog into `store` before overwriting it.
    pub fn with_backup(mut self, store: BackupStore, ttl_days: u64) -> Self {
        self.backup = Some((store, ttl_days));
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn catalog_path(&self, locale_root: &Path) -> PathBuf {
        catalog_path(locale_root, self.backend.target_language(), &self.catalog_name)
    }

    pub async fn translate_all(&self) -> Result<Vec<FileReport>> {
        let mut reports = Vec::with_capacity(self.locale_paths.len());
        for root in &self.locale_paths {
            let path = self.catalog_path(root);
            if !path.is_file() {
                return Err(CatalogError::MissingCatalog {
                    lang: self.backend.target_language().to_string(),
                    path,
                }
                .into());
            }
            reports.push(self.translate_file(&path).await?);
        }
        Ok(reports)
    }

    /// Nothing is written unless every block translated successfully.
    pub async fn translate_file(&self, path: &Path) -> Result<FileReport> {
        info!("translating catalog {}", path.display());
        let original = fs::read_to_string(path)
            .with_context(|| format!("failed to read catalog: {}", path.display()))?;

        let mut blocks = Vec::new();
        let mut translated = 0;
        let mut skipped = 0;
        for block in split_blocks(&original) {
            let out = self.translate_block(block).await?;
            if out == block {
                skipped += 1;
            } else {
                translated += 1;
            }
            blocks.push(out);
        }
        let content = join_blocks(&blocks);

        let written = !self.dry_run && content != original;
        if written {
            if let Some((store, ttl_days)) = &self.backup {
                let lang = self.backend.target_language();
                let entry = store.save(path, lang, *ttl_days)?;
                debug!("backed up {} to {}", path.display(), entry.backup.display());
            }
            write_atomically(path, &content)?;
        }
        info!(
            "{}: {} translated, {} skipped",
            path.display(),
            translated,
            skipped
        );

        Ok(FileReport {
            path: path.to_path_buf(),
            translated,
            skipped,
            written,
            content,
        })
    }

    pub async fn translate_block(&self, block: &str) -> Result<String> {
        let entry = Entry::classify(block);
        debug!("block kind: {}", entry.kind());
        match entry {
            Entry::HeaderOrMalformed => translate_fallback(&self.backend, block).await,
            Entry::Multiline(text) => {
                if has_translation(block) {
                    return Ok(block.to_string());
                }
                rewrite(&self.backend, &text, block).await
            }
            Entry::Plain { source } => translate_direct(&self.backend, block, &[source]).await,
        }
    }
}

/// `<root>/<lang>/LC_MESSAGES/<catalog_name>`.
pub fn catalog_path(locale_root: &Path, lang: &str, catalog_name: &str) -> PathBuf {
    locale_root.join(lang).join(MESSAGES_DIR).join(catalog_name)
}

/// Puts the latest backup of each root's catalog back in place. Every root
/// must have one before anything is written.
pub fn restore_catalogs(
    store: &BackupStore,
    locale_paths: &[PathBuf],
    lang: &str,
    catalog_name: &str,
) -> Result<Vec<RestoreReport>> {
    let mut pending = Vec::with_capacity(locale_paths.len());
    for root in locale_paths {
        let path = catalog_path(root, lang, catalog_name);
        let Some(entry) = store.latest(&path)? else {
            return Err(CatalogError::NoBackup { path }.into());
        };
        let content = store.read(&entry)?;
        pending.push((path, entry, content));
    }

    let mut reports = Vec::with_capacity(pending.len());
    for (path, entry, content) in pending {
        write_atomically(&path, &content)?;
        info!("restored {} from {}", path.display(), entry.backup.display());
        reports.push(RestoreReport { path, backup: entry });
    }
    Ok(reports)
}

fn has_translation(block: &str) -> bool {
    if let Some(existing) = MultilineText::parse_msgstr(block) {
        return !existing.content.is_empty();
    }
    msgstr_value(block).is_some_and(|value| !value.is_empty())
}

// Same-directory temp file so the final rename never crosses filesystems.
fn write_atomically(path: &Path, content: &str) -> Result<()> {
    let dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut file = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("failed to create temp file in {}", dir.display()))?;
    file.write_all(content.as_bytes())
        .with_context(|| format!("failed to write catalog: {}", path.display()))?;
    if let Ok(metadata) = fs::metadata(path) {
        fs::set_permissions(file.path(), metadata.permissions())
            .with_context(|| format!("failed to copy permissions of {}", path.display()))?;
    }
    file.persist(path)
        .map_err(|err| err.error)
        .with_context(|| format!("failed to replace catalog: {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::FakeBackend;
    use tempfile::tempdir;

    const CATALOG: &str = concat!(
        "# French translations.\n",
        "#\n",
        "#, fuzzy\n",
        "msgid \"\"\n",
        "msgstr \"\"\n",
        "\"Project-Id-Version: shop\\n\"\n",
        "\"Content-Type: text/plain; charset=UTF-8\\n\"\n",
        "\n",
        "#: shop/models.py:10\n",
        "msgid \"Price\"\n",
        "msgstr \"\"\n",
        "\n",
        "#: shop/models.py:11\n",
        "msgid \"Stock\"\n",
        "msgstr \"Inventaire\"\n",
        "\n",
        "#: shop/views.py:41\n",
        "msgid \"\"\n",
        "\"\\n\"\n",
        "\"    Thanks for your order\\n\"\n",
        "\"    \"\n",
        "msgstr \"\"\n",
    );

    fn write_catalog(root: &Path, lang: &str, content: &str) -> PathBuf {
        let dir = root.join(lang).join(MESSAGES_DIR);
        fs::create_dir_all(&dir).expect("create locale dir");
        let path = dir.join(DEFAULT_CATALOG_NAME);
        fs::write(&path, content).expect("write catalog");
        path
    }

    fn backend() -> FakeBackend {
        FakeBackend::with_pairs(&[
            ("Price", "Prix"),
            ("Thanks for your order", "Merci pour votre commande!!"),
        ])
    }

    #[tokio::test]
    async fn translates_catalog_in_place() {
        let dir = tempdir().expect("tempdir");
        let path = write_catalog(dir.path(), "fr", CATALOG);
        let driver = CatalogDriver::new(backend(), vec![dir.path().to_path_buf()]);

        let reports = driver.translate_all().await.expect("translate");
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].translated, 2);
        assert_eq!(reports[0].skipped, 2);
        assert!(reports[0].written);

        let written = fs::read_to_string(&path).expect("read back");
        assert!(written.contains("msgid \"Price\"\nmsgstr \"Prix\"\n"));
        assert!(written.contains("msgstr \"Inventaire\""));
        assert!(written.ends_with(concat!(
            "msgstr \"\"\n",
            "\"\\n\"\n",
            "\"    \"\n",
            "\"    Merci pour votre commande\\n\"\n",
            "\"    \"\n",
        )));
        assert!(written.starts_with("# French translations.\n#\n#, fuzzy\nmsgid \"\"\nmsgstr \"\"\n"));
        assert_eq!(written.matches("\n\n").count(), 3);
    }

    #[tokio::test]
    async fn second_pass_changes_nothing() {
        let dir = tempdir().expect("tempdir");
        let path = write_catalog(dir.path(), "fr", CATALOG);
        let driver = CatalogDriver::new(backend(), vec![dir.path().to_path_buf()]);
        driver.translate_all().await.expect("first pass");
        let first = fs::read_to_string(&path).expect("read first");
        let calls = driver.backend().calls();

        let reports = driver.translate_all().await.expect("second pass");
        assert_eq!(reports[0].translated, 0);
        assert!(!reports[0].written);
        assert_eq!(driver.backend().calls(), calls);
        assert_eq!(fs::read_to_string(&path).expect("read second"), first);
    }

    #[tokio::test]
    async fn missing_catalog_is_reported() {
        let dir = tempdir().expect("tempdir");
        write_catalog(dir.path(), "de", CATALOG);
        let driver = CatalogDriver::new(backend(), vec![dir.path().to_path_buf()]);

        let err = driver.translate_all().await.expect_err("missing catalog");
        match err.downcast_ref::<CatalogError>() {
            Some(CatalogError::MissingCatalog { lang, path }) => {
                assert_eq!(lang, "fr");
                assert!(path.ends_with("fr/LC_MESSAGES/django.po"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn failed_backend_leaves_file_untouched() {
        let dir = tempdir().expect("tempdir");
        let path = write_catalog(dir.path(), "fr", CATALOG);
        let driver = CatalogDriver::new(FakeBackend::failing(), vec![dir.path().to_path_buf()]);

        assert!(driver.translate_all().await.is_err());
        assert_eq!(fs::read_to_string(&path).expect("read back"), CATALOG);
    }

    #[tokio::test]
    async fn dry_run_does_not_write() {
        let dir = tempdir().expect("tempdir");
        let path = write_catalog(dir.path(), "fr", CATALOG);
        let driver =
            CatalogDriver::new(backend(), vec![dir.path().to_path_buf()]).with_dry_run(true);

        let report = driver.translate_file(&path).await.expect("dry run");
        assert!(!report.written);
        assert!(report.content.contains("msgstr \"Prix\""));
        assert_eq!(fs::read_to_string(&path).expect("read back"), CATALOG);
    }

    #[tokio::test]
    async fn custom_catalog_name_is_resolved() {
        let dir = tempdir().expect("tempdir");
        let driver = CatalogDriver::new(backend(), vec![dir.path().to_path_buf()])
            .with_catalog_name("djangojs.po");
        assert_eq!(
            driver.catalog_path(dir.path()),
            dir.path().join("fr").join("LC_MESSAGES").join("djangojs.po")
        );
    }

    fn backup_store(dir: &Path) -> BackupStore {
        BackupStore::at(dir.join("backup"))
    }

    #[tokio::test]
    async fn backup_is_taken_before_write() {
        let dir = tempdir().expect("tempdir");
        let path = write_catalog(dir.path(), "fr", CATALOG);
        let store = backup_store(dir.path());
        let driver = CatalogDriver::new(backend(), vec![dir.path().to_path_buf()])
            .with_backup(store.clone(), 7);

        driver.translate_all().await.expect("translate");

        let entries = store.entries_for("fr").expect("entries");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].src, path);
        assert_eq!(entries[0].catalog, DEFAULT_CATALOG_NAME);
        assert!(entries[0].backup.starts_with(store.dir().join("fr")));
        assert_eq!(store.read(&entries[0]).expect("backup"), CATALOG);
        assert_ne!(fs::read_to_string(&path).expect("catalog"), CATALOG);
    }

    #[tokio::test]
    async fn untouched_catalog_is_not_backed_up() {
        let dir = tempdir().expect("tempdir");
        write_catalog(dir.path(), "fr", CATALOG);
        let store = backup_store(dir.path());
        let driver = CatalogDriver::new(backend(), vec![dir.path().to_path_buf()])
            .with_backup(store.clone(), 7)
            .with_dry_run(true);

        driver.translate_all().await.expect("translate");
        assert!(store.entries_for("fr").expect("entries").is_empty());
    }

    #[tokio::test]
    async fn restore_undoes_a_translation_run() {
        let dir = tempdir().expect("tempdir");
        let path = write_catalog(dir.path(), "fr", CATALOG);
        let store = backup_store(dir.path());
        let roots = vec![dir.path().to_path_buf()];
        let driver = CatalogDriver::new(backend(), roots.clone()).with_backup(store.clone(), 7);
        driver.translate_all().await.expect("translate");
        assert_ne!(fs::read_to_string(&path).expect("translated"), CATALOG);

        let reports =
            restore_catalogs(&store, &roots, "fr", DEFAULT_CATALOG_NAME).expect("restore");
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].path, path);
        assert_eq!(reports[0].backup.lang, "fr");
        assert_eq!(fs::read_to_string(&path).expect("restored"), CATALOG);
    }

    #[test]
    fn restore_without_backup_writes_nothing() {
        let dir = tempdir().expect("tempdir");
        let first = tempdir().expect("first root");
        let french = write_catalog(first.path(), "fr", "msgid \"A\"\nmsgstr \"\"\n");
        let store = backup_store(dir.path());
        store.save(&french, "fr", 1).expect("save");
        fs::write(&french, "msgid \"A\"\nmsgstr \"B\"\n").expect("edit");
        let second = tempdir().expect("second root");
        write_catalog(second.path(), "fr", CATALOG);

        let roots = vec![first.path().to_path_buf(), second.path().to_path_buf()];
        let err = restore_catalogs(&store, &roots, "fr", DEFAULT_CATALOG_NAME).unwrap_err();
        match err.downcast_ref::<CatalogError>() {
            Some(CatalogError::NoBackup { path }) => {
                assert!(path.starts_with(second.path()));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(
            fs::read_to_string(&french).expect("first root"),
            "msgid \"A\"\nmsgstr \"B\"\n"
        );
    }
}
