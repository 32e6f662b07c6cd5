use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;

use crate::error::CatalogError;

#[derive(Debug, Clone)]
pub struct LanguageRegistry {
    codes: HashMap<String, String>,
}

impl LanguageRegistry {
    pub fn load() -> Result<Self> {
        let raw = include_str!("iso_639.json");
        let parsed: IsoData =
            serde_json::from_str(raw).with_context(|| "failed to parse ISO 639 language data")?;
        Ok(LanguageRegistry {
            codes: parsed.codes,
        })
    }

    pub fn is_valid_code(&self, code: &str) -> bool {
        let code = normalize_code(code);
        matches!(code.len(), 2 | 3) && self.codes.contains_key(&code)
    }

    pub fn iso_name(&self, code: &str) -> Option<String> {
        let code = normalize_code(code);
        self.codes.get(&code).cloned()
    }

    /// Locale codes as used for catalog directories: an ISO 639 code with an
    /// optional region or script subtag (`pt_BR`, `zh-Hans`, `sr_Latn`).
    pub fn is_supported_locale(&self, code: &str) -> bool {
        match split_locale(code) {
            Some((base, Some(subtag))) => self.is_valid_code(base) && is_valid_subtag(subtag),
            Some((base, None)) => self.is_valid_code(base),
            None => false,
        }
    }

    pub fn ensure_supported(&self, code: &str) -> Result<()> {
        if self.is_supported_locale(code) {
            Ok(())
        } else {
            Err(CatalogError::UnsupportedLanguage(code.trim().to_string()).into())
        }
    }

    /// Human readable name for prompts, falling back to the code itself.
    pub fn display_name(&self, code: &str) -> String {
        let Some((base, subtag)) = split_locale(code) else {
            return code.trim().to_string();
        };
        match (self.iso_name(base), subtag) {
            (Some(name), Some(subtag)) => format!("{} ({})", name, subtag),
            (Some(name), None) => name,
            (None, _) => code.trim().to_string(),
        }
    }
}

fn split_locale(code: &str) -> Option<(&str, Option<&str>)> {
    let code = code.trim();
    if code.is_empty() {
        return None;
    }
    match code.split_once(['_', '-']) {
        Some((base, subtag)) if !base.is_empty() && !subtag.is_empty() => {
            Some((base, Some(subtag)))
        }
        Some(_) => None,
        None => Some((code, None)),
    }
}

fn is_valid_subtag(subtag: &str) -> bool {
    (2..=4).contains(&subtag.len()) && subtag.chars().all(|ch| ch.is_ascii_alphanumeric())
}

fn normalize_code(code: &str) -> String {
    code.trim().to_lowercase()
}

#[derive(Debug, Deserialize)]
struct IsoData {
    codes: HashMap<String, String>,
}
