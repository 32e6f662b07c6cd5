use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("language code '{0}' is not supported by the translator")]
    UnsupportedLanguage(String),
    #[error("the catalog for code '{lang}' does not exist: {}", .path.display())]
    MissingCatalog { lang: String, path: PathBuf },
    #[error("no backup to restore for {}", .path.display())]
    NoBackup { path: PathBuf },
}
