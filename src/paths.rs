use std::path::{Path, PathBuf};

pub(crate) const BASE_DIR_ENV: &str = "PO_TRANSLATOR_RUST_DIR";
const BASE_DIR_NAME: &str = ".po-translator-rust";

/// Directory holding home settings and backups. `PO_TRANSLATOR_RUST_DIR`
/// wins over `$HOME/.po-translator-rust`.
pub(crate) fn base_dir() -> Option<PathBuf> {
    if let Some(dir) = base_dir_override() {
        return Some(dir);
    }
    home_dir().map(|home| home.join(BASE_DIR_NAME))
}

pub(crate) fn backup_dir() -> PathBuf {
    base_dir()
        .unwrap_or_else(|| PathBuf::from(BASE_DIR_NAME))
        .join("backup")
}

/// Expands a leading `~` and drops redundant separators.
pub fn normalize_dir(value: &str) -> Option<PathBuf> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    let expanded = expand_tilde(trimmed);
    Some(normalize_path(Path::new(&expanded)))
}

fn base_dir_override() -> Option<PathBuf> {
    std::env::var(BASE_DIR_ENV)
        .ok()
        .and_then(|value| normalize_dir(&value))
}

fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME").ok().and_then(|home| {
        let home = home.trim();
        if home.is_empty() {
            None
        } else {
            Some(PathBuf::from(home))
        }
    })
}

fn normalize_path(path: &Path) -> PathBuf {
    path.components().collect()
}

fn expand_tilde(value: &str) -> String {
    if value != "~" && !value.starts_with("~/") {
        return value.to_string();
    }
    let Some(home) = home_dir() else {
        return value.to_string();
    };
    let home = home.to_string_lossy();
    if value == "~" {
        home.to_string()
    } else {
        format!("{}{}", home, &value[1..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::with_temp_home;

    #[test]
    fn expands_home_prefix() {
        with_temp_home(|home| {
            assert_eq!(normalize_dir("~"), Some(home.to_path_buf()));
            assert_eq!(
                normalize_dir(" ~/app//locale "),
                Some(home.join("app").join("locale"))
            );
            assert_eq!(normalize_dir("~other/locale"), Some(PathBuf::from("~other/locale")));
            assert_eq!(normalize_dir("   "), None);
        });
    }

    #[test]
    fn base_dir_override_wins() {
        with_temp_home(|home| {
            assert_eq!(base_dir(), Some(home.join(BASE_DIR_NAME)));
            let custom = home.join("custom");
            unsafe {
                std::env::set_var(BASE_DIR_ENV, &custom);
            }
            assert_eq!(backup_dir(), custom.join("backup"));
            unsafe {
                std::env::remove_var(BASE_DIR_ENV);
            }
        });
    }
}
