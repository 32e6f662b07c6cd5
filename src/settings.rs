use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::catalog::DEFAULT_CATALOG_NAME;
use crate::paths;

const DEFAULT_SETTINGS_TOML: &str = include_str!("../settings.toml");
const DEFAULT_BACKUP_TTL_DAYS: u64 = 30;

#[derive(Debug, Clone)]
pub struct Settings {
    pub formally: HashMap<String, String>,
    pub locale_paths: Vec<String>,
    pub catalog_name: String,
    pub source_lang: String,
    pub backup_ttl_days: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            formally: HashMap::new(),
            locale_paths: Vec::new(),
            catalog_name: DEFAULT_CATALOG_NAME.to_string(),
            source_lang: "auto".to_string(),
            backup_ttl_days: DEFAULT_BACKUP_TTL_DAYS,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    formally: Option<HashMap<String, String>>,
    catalog: Option<CatalogSettings>,
    translate: Option<TranslateSettings>,
    backup: Option<BackupSettings>,
}

#[derive(Debug, Default, Deserialize)]
struct CatalogSettings {
    locale_paths: Option<Vec<String>>,
    name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct TranslateSettings {
    source_lang: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct BackupSettings {
    ttl_days: Option<u64>,
}

impl Settings {
    /// Settings shipped with the binary, without any file on disk.
    pub fn builtin() -> Result<Self> {
        let mut settings = Settings::default();
        settings.merge(parse_settings(DEFAULT_SETTINGS_TOML, Path::new("<builtin>"))?);
        Ok(settings)
    }

    fn merge(&mut self, incoming: SettingsFile) {
        if let Some(map) = incoming.formally {
            self.formally.extend(map);
        }
        if let Some(catalog) = incoming.catalog {
            if let Some(paths) = catalog.locale_paths {
                self.locale_paths = paths;
            }
            if let Some(name) = catalog.name
                && !name.trim().is_empty()
            {
                self.catalog_name = name.trim().to_string();
            }
        }
        if let Some(translate) = incoming.translate
            && let Some(source_lang) = translate.source_lang
            && !source_lang.trim().is_empty()
        {
            self.source_lang = source_lang.trim().to_string();
        }
        if let Some(backup) = incoming.backup
            && let Some(ttl_days) = backup.ttl_days
            && ttl_days > 0
        {
            self.backup_ttl_days = ttl_days;
        }
    }
}

pub fn load_settings(extra_path: Option<&Path>) -> Result<Settings> {
    let mut settings = Settings::builtin()?;
    ensure_home_settings_file()?;

    let mut ordered_paths = vec![
        PathBuf::from("settings.toml"),
        PathBuf::from("settings.local.toml"),
    ];
    if let Some(base) = paths::base_dir() {
        ordered_paths.push(base.join("settings.toml"));
        ordered_paths.push(base.join("settings.local.toml"));
    }
    if let Some(extra) = extra_path {
        if !extra.exists() {
            return Err(anyhow!("settings file not found: {}", extra.display()));
        }
        ordered_paths.push(extra.to_path_buf());
    }

    for path in ordered_paths {
        if path.is_file() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("failed to read settings: {}", path.display()))?;
            settings.merge(parse_settings(&content, &path)?);
        }
    }

    Ok(settings)
}

fn parse_settings(content: &str, path: &Path) -> Result<SettingsFile> {
    toml::from_str(content).with_context(|| format!("failed to parse settings: {}", path.display()))
}

fn ensure_home_settings_file() -> Result<()> {
    let Some(base) = paths::base_dir() else {
        return Ok(());
    };
    fs::create_dir_all(&base)
        .with_context(|| format!("failed to create settings directory: {}", base.display()))?;
    let path = base.join("settings.toml");
    if !path.exists() {
        fs::write(&path, DEFAULT_SETTINGS_TOML)
            .with_context(|| format!("failed to write settings: {}", path.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::with_temp_home;

    #[test]
    fn builtin_settings_carry_defaults() {
        let settings = Settings::builtin().expect("settings");
        assert_eq!(settings.catalog_name, "django.po");
        assert_eq!(settings.source_lang, "auto");
        assert_eq!(settings.backup_ttl_days, 30);
        assert!(settings.locale_paths.is_empty());
        assert!(settings.formally.contains_key("formal"));
        assert!(settings.formally.contains_key("casual"));
    }

    #[test]
    fn later_files_override_earlier_ones() {
        with_temp_home(|home| {
            let base = home.join(".po-translator-rust");
            fs::create_dir_all(&base).unwrap();
            fs::write(
                base.join("settings.local.toml"),
                r#"
[catalog]
locale_paths = ["~/app/locale"]
name = "messages.po"

[formally]
formal = "Address the reader with the polite form."
"#,
            )
            .unwrap();
            let extra = home.join("extra.toml");
            fs::write(
                &extra,
                "[catalog]\nname = \"djangojs.po\"\n\n[backup]\nttl_days = 7\n",
            )
            .unwrap();

            let settings = load_settings(Some(&extra)).expect("settings");
            assert_eq!(settings.catalog_name, "djangojs.po");
            assert_eq!(settings.locale_paths, vec!["~/app/locale".to_string()]);
            assert_eq!(settings.backup_ttl_days, 7);
            assert_eq!(
                settings.formally.get("formal").map(String::as_str),
                Some("Address the reader with the polite form.")
            );
            assert!(settings.formally.contains_key("casual"));
        });
    }

    #[test]
    fn creates_home_settings_on_first_load() {
        with_temp_home(|home| {
            load_settings(None).expect("settings");
            let written = fs::read_to_string(home.join(".po-translator-rust/settings.toml"))
                .expect("home settings");
            assert_eq!(written, DEFAULT_SETTINGS_TOML);
        });
    }

    #[test]
    fn missing_extra_file_is_an_error() {
        with_temp_home(|home| {
            let err = load_settings(Some(&home.join("nope.toml"))).unwrap_err();
            assert!(err.to_string().contains("settings file not found"));
        });
    }

    #[test]
    fn invalid_toml_reports_the_path() {
        with_temp_home(|home| {
            let extra = home.join("broken.toml");
            fs::write(&extra, "[catalog\nname = 1").unwrap();
            let err = load_settings(Some(&extra)).unwrap_err();
            assert!(format!("{:#}", err).contains("broken.toml"));
        });
    }
}
