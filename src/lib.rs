use anyhow::{Context, Result, anyhow};
use std::path::{Path, PathBuf};

pub mod backend;
pub mod backup;
pub mod catalog;
pub mod error;
pub mod languages;
pub mod logging;
mod paths;
mod providers;
pub mod settings;
pub mod translations;
mod translator;

#[cfg(test)]
mod test_util;

pub use backend::{BackendFuture, TranslationBackend};
pub use backup::{BackupEntry, BackupStore};
pub use catalog::{CatalogDriver, Entry, FileReport, MultilineText, RestoreReport};
pub use error::CatalogError;
pub use providers::{Claude, Gemini, OpenAI, Provider, ProviderKind, ProviderUsage};
pub use settings::Settings;
pub use translations::TranslateOptions;
pub use translator::{ExecutionOutput, Translator};

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub lang: String,
    pub model: Option<String>,
    pub key: Option<String>,
    pub formal: String,
    pub source_lang: Option<String>,
    pub locale_paths: Vec<String>,
    pub catalog: Option<String>,
    pub settings_path: Option<String>,
    pub backup: bool,
    pub restore: bool,
    pub dry_run: bool,
}

pub async fn run(config: Config) -> Result<String> {
    let settings_path = config.settings_path.as_deref().map(Path::new);
    let settings = settings::load_settings(settings_path)?;
    let registry = languages::LanguageRegistry::load()?;
    registry.ensure_supported(&config.lang)?;

    if config.restore {
        let reports = restore_catalogs(&BackupStore::open(), &config, &settings)?;
        return Ok(format_restores(&reports));
    }

    let formality = config.formal.trim().to_string();
    if formality.is_empty() {
        return Err(anyhow!("formality is empty"));
    }
    let source_lang = config
        .source_lang
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(settings.source_lang.as_str())
        .to_string();

    let selection =
        providers::resolve_provider_selection(config.model.as_deref(), config.key.as_deref())?;
    let key = providers::resolve_key(selection.provider, config.key.as_deref())
        .with_context(|| "no API key found for selected provider")?;
    let model = selection.requested_model.unwrap_or_default();
    let provider = providers::build_provider(selection.provider, key, model);

    let options = TranslateOptions {
        lang: config.lang.trim().to_string(),
        formality,
        source_lang,
    };
    let translator = Translator::new(provider, settings.clone(), &registry, options)?;

    let reports = translate_catalogs(translator, &config, &settings).await?;
    Ok(format_reports(&reports, config.dry_run))
}

/// Runs the catalog driver over the configured locale roots.
pub async fn translate_catalogs<B: TranslationBackend>(
    backend: B,
    config: &Config,
    settings: &Settings,
) -> Result<Vec<FileReport>> {
    let locale_paths = resolve_locale_paths(config, settings)?;
    let catalog_name = resolve_catalog_name(config, settings);

    let mut driver = CatalogDriver::new(backend, locale_paths)
        .with_catalog_name(catalog_name)
        .with_dry_run(config.dry_run);
    if config.backup {
        driver = driver.with_backup(BackupStore::open(), settings.backup_ttl_days);
    }
    driver.translate_all().await
}

/// Puts the newest backup of each configured catalog back in place.
pub fn restore_catalogs(
    store: &BackupStore,
    config: &Config,
    settings: &Settings,
) -> Result<Vec<RestoreReport>> {
    let locale_paths = resolve_locale_paths(config, settings)?;
    let catalog_name = resolve_catalog_name(config, settings);
    catalog::restore_catalogs(store, &locale_paths, config.lang.trim(), &catalog_name)
}

fn resolve_catalog_name(config: &Config, settings: &Settings) -> String {
    config
        .catalog
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(settings.catalog_name.as_str())
        .to_string()
}

/// `--locale-path` flags replace the configured roots entirely.
pub fn resolve_locale_paths(config: &Config, settings: &Settings) -> Result<Vec<PathBuf>> {
    let raw = if config.locale_paths.is_empty() {
        &settings.locale_paths
    } else {
        &config.locale_paths
    };
    let paths = raw
        .iter()
        .filter_map(|value| paths::normalize_dir(value))
        .collect::<Vec<_>>();
    if paths.is_empty() {
        return Err(anyhow!(
            "no locale paths configured (use --locale-path or [catalog] locale_paths)"
        ));
    }
    Ok(paths)
}

pub fn format_reports(reports: &[FileReport], dry_run: bool) -> String {
    if dry_run {
        return reports
            .iter()
            .map(|report| format!("==> {} <==\n{}", report.path.display(), report.content))
            .collect::<Vec<_>>()
            .join("\n");
    }
    reports
        .iter()
        .map(|report| {
            format!(
                "{}: {} translated, {} skipped",
                report.path.display(),
                report.translated,
                report.skipped
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_restores(reports: &[RestoreReport]) -> String {
    reports
        .iter()
        .map(|report| {
            format!(
                "{}: restored from {}",
                report.path.display(),
                report.backup.backup.display()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
