use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::paths;

const INDEX_FILE_NAME: &str = "index.json";
const SECONDS_PER_DAY: u64 = 86_400;
const DEFAULT_TTL_DAYS: u64 = 30;

/// One saved copy of a catalog, filed under its locale.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct BackupEntry {
    pub id: String,
    pub lang: String,
    pub catalog: String,
    pub src: PathBuf,
    pub backup: PathBuf,
    pub digest: String,
    pub created_at: u64,
    pub expires_at: u64,
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct BackupIndex {
    entries: Vec<BackupEntry>,
}

/// Catalog copies laid out as `<dir>/<lang>/<stem>-<created_at>-<id>.po`
/// with an `index.json` describing every live copy.
#[derive(Debug, Clone)]
pub struct BackupStore {
    dir: PathBuf,
}

impl BackupStore {
    /// The store under the base directory (`~/.po-translator-rust/backup`).
    pub fn open() -> Self {
        Self::at(paths::backup_dir())
    }

    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Saves the current content of `src`. A catalog whose latest copy has
    /// the same digest is not copied again; that copy's expiry is renewed.
    pub fn save(&self, src: &Path, lang: &str, ttl_days: u64) -> Result<BackupEntry> {
        let content = fs::read(src)
            .with_context(|| format!("failed to read catalog for backup: {}", src.display()))?;
        let digest = format!("{:x}", md5::compute(&content));

        let ttl_days = if ttl_days == 0 {
            DEFAULT_TTL_DAYS
        } else {
            ttl_days
        };
        let now = now_unix();
        let expires_at = now.saturating_add(ttl_days.saturating_mul(SECONDS_PER_DAY));

        let mut index = self.read_index()?;
        prune(&mut index, now);

        if let Some(existing) = latest_in(&index, src)
            .filter(|entry| entry.digest == digest)
            .map(|entry| entry.id.clone())
            && let Some(entry) = index.entries.iter_mut().find(|entry| entry.id == existing)
        {
            entry.expires_at = entry.expires_at.max(expires_at);
            let entry = entry.clone();
            self.write_index(&index)?;
            return Ok(entry);
        }

        let lang_dir = self.dir.join(sanitize_component(lang, "unknown"));
        fs::create_dir_all(&lang_dir)
            .with_context(|| format!("failed to create backup dir: {}", lang_dir.display()))?;

        let catalog = src
            .file_name()
            .and_then(|value| value.to_str())
            .unwrap_or("catalog.po")
            .to_string();
        let stem = src
            .file_stem()
            .and_then(|value| value.to_str())
            .unwrap_or("catalog");
        let id_seed = format!("{}:{}:{}", src.display(), now, digest);
        let id = format!("{:x}", md5::compute(id_seed.as_bytes()));
        let backup = lang_dir.join(format!(
            "{}-{}-{}.po",
            sanitize_component(stem, "catalog"),
            now,
            &id[..8]
        ));
        fs::write(&backup, &content)
            .with_context(|| format!("failed to write backup: {}", backup.display()))?;

        let entry = BackupEntry {
            id,
            lang: lang.to_string(),
            catalog,
            src: src.to_path_buf(),
            backup,
            digest,
            created_at: now,
            expires_at,
        };
        index.entries.push(entry.clone());
        self.write_index(&index)?;
        Ok(entry)
    }

    /// Most recent live copy of `src`, if any.
    pub fn latest(&self, src: &Path) -> Result<Option<BackupEntry>> {
        let mut index = self.read_index()?;
        let now = now_unix();
        index.entries.retain(|entry| is_live(entry, now));
        Ok(latest_in(&index, src).cloned())
    }

    /// Live copies filed under `lang`, oldest first.
    pub fn entries_for(&self, lang: &str) -> Result<Vec<BackupEntry>> {
        let now = now_unix();
        Ok(self
            .read_index()?
            .entries
            .into_iter()
            .filter(|entry| entry.lang == lang && is_live(entry, now))
            .collect())
    }

    /// Content of a saved copy, checked against its recorded digest.
    pub fn read(&self, entry: &BackupEntry) -> Result<String> {
        let content = fs::read(&entry.backup)
            .with_context(|| format!("failed to read backup: {}", entry.backup.display()))?;
        if format!("{:x}", md5::compute(&content)) != entry.digest {
            return Err(anyhow!("backup is corrupted: {}", entry.backup.display()));
        }
        String::from_utf8(content)
            .with_context(|| format!("backup is not UTF-8: {}", entry.backup.display()))
    }

    fn index_path(&self) -> PathBuf {
        self.dir.join(INDEX_FILE_NAME)
    }

    fn read_index(&self) -> Result<BackupIndex> {
        let path = self.index_path();
        if !path.exists() {
            return Ok(BackupIndex::default());
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read backup index: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse backup index: {}", path.display()))
    }

    fn write_index(&self, index: &BackupIndex) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create backup dir: {}", self.dir.display()))?;
        let content = serde_json::to_string_pretty(index)?;
        let path = self.index_path();
        fs::write(&path, content)
            .with_context(|| format!("failed to write backup index: {}", path.display()))
    }
}

// Ties on `created_at` go to the entry recorded last.
fn latest_in<'a>(index: &'a BackupIndex, src: &Path) -> Option<&'a BackupEntry> {
    index
        .entries
        .iter()
        .filter(|entry| entry.src == src)
        .max_by_key(|entry| entry.created_at)
}

fn is_live(entry: &BackupEntry, now: u64) -> bool {
    entry.expires_at > now && entry.backup.exists()
}

// Drops dead entries from the index and their files from disk.
fn prune(index: &mut BackupIndex, now: u64) {
    index.entries.retain(|entry| {
        let alive = is_live(entry, now);
        if !alive && entry.backup.exists() {
            let _ = fs::remove_file(&entry.backup);
        }
        alive
    });
}

fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

fn sanitize_component(value: &str, fallback: &str) -> String {
    let out = value
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
                ch
            } else {
                '_'
            }
        })
        .collect::<String>();
    if out.is_empty() {
        fallback.to_string()
    } else {
        out
    }
}
