//! On-disk report cache keyed by source content.
//!
//! A cached report is reused only when the SHA-256 of the current source and
//! of the detection options matches the one stored with it. Repository
//! metadata is not part of the entry; callers stamp fresh metadata on a hit.
//! Cache failures are never fatal: unreadable or corrupt entries are dropped
//! and the file is rescanned.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::ScanConfig;
use crate::error::ScanError;
use crate::report::ScanReport;

#[derive(Serialize, Deserialize)]
struct CacheEntry {
    hash: String,
    report: ScanReport,
}

pub struct ScanCache {
    dir: PathBuf,
}

impl ScanCache {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, ScanError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| ScanError::io(&dir, e))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Hash of `source` together with every option that changes what a scan
    /// detects. Fields are NUL-separated so adjacent values cannot run together.
    pub fn entry_hash(config: &ScanConfig, source: &str) -> String {
        let mut hasher = Sha256::new();
        let lists = [
            &config.pending_work_tags,
            &config.component_base_classes,
            &config.lazy_load_callees,
        ];
        hasher.update(config.cross_reference_tag.as_bytes());
        hasher.update([0]);
        for list in lists {
            for item in list {
                hasher.update(item.as_bytes());
                hasher.update([0]);
            }
            hasher.update([1]);
        }
        hasher.update(source.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    fn entry_path(&self, report_path: &str) -> PathBuf {
        let file_name: String = report_path
            .chars()
            .map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c })
            .collect();
        self.dir.join(format!("{}.json", file_name))
    }

    pub fn get(&self, report_path: &str, config: &ScanConfig, source: &str) -> Option<ScanReport> {
        let entry_path = self.entry_path(report_path);
        let data = fs::read_to_string(&entry_path).ok()?;

        let entry: CacheEntry = match serde_json::from_str(&data) {
            Ok(entry) => entry,
            Err(error) => {
                tracing::warn!(path = report_path, %error, "dropping corrupt cache entry");
                fs::remove_file(&entry_path).ok();
                return None;
            }
        };

        (entry.hash == Self::entry_hash(config, source)).then_some(entry.report)
    }

    pub fn set(&self, report_path: &str, config: &ScanConfig, source: &str, report: &ScanReport) {
        let entry = CacheEntry {
            hash: Self::entry_hash(config, source),
            report: report.clone(),
        };
        let written = serde_json::to_string(&entry)
            .map_err(|e| e.to_string())
            .and_then(|data| fs::write(self.entry_path(report_path), data).map_err(|e| e.to_string()));
        if let Err(error) = written {
            tracing::warn!(path = report_path, %error, "failed to write cache entry");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repo::RepoMetadata;
    use tempfile::TempDir;

    #[test]
    fn test_hit_requires_same_content() {
        let dir = TempDir::new().unwrap();
        let cache = ScanCache::new(dir.path().join("cache")).unwrap();
        let config = ScanConfig::default();
        let report = ScanReport::new("src/App.tsx", RepoMetadata::placeholder());

        cache.set("src/App.tsx", &config, "const a = 1;", &report);
        assert_eq!(cache.get("src/App.tsx", &config, "const a = 1;"), Some(report));
        assert_eq!(cache.get("src/App.tsx", &config, "const a = 2;"), None);
        assert_eq!(cache.get("src/Other.tsx", &config, "const a = 1;"), None);
    }

    #[test]
    fn test_hit_requires_same_detection_options() {
        let dir = TempDir::new().unwrap();
        let cache = ScanCache::new(dir.path()).unwrap();
        let config = ScanConfig::default();
        let report = ScanReport::new("src/App.tsx", RepoMetadata::placeholder());
        cache.set("src/App.tsx", &config, "", &report);

        let retagged = ScanConfig {
            pending_work_tags: vec!["hack".to_string()],
            ..ScanConfig::default()
        };
        let rebased = ScanConfig {
            component_base_classes: vec!["Widget".to_string()],
            ..ScanConfig::default()
        };
        let relocated = ScanConfig {
            repository_root: "/elsewhere".into(),
            ..ScanConfig::default()
        };
        assert_eq!(cache.get("src/App.tsx", &retagged, ""), None);
        assert_eq!(cache.get("src/App.tsx", &rebased, ""), None);
        assert!(cache.get("src/App.tsx", &relocated, "").is_some());
    }

    #[test]
    fn test_corrupt_entry_is_dropped() {
        let dir = TempDir::new().unwrap();
        let cache = ScanCache::new(dir.path()).unwrap();
        let entry = cache.entry_path("src/App.tsx");
        fs::write(&entry, "{not json").unwrap();

        assert_eq!(cache.get("src/App.tsx", &ScanConfig::default(), ""), None);
        assert!(!entry.exists());
    }

    #[test]
    fn test_entry_hash_is_hex_sha256() {
        let config = ScanConfig::default();
        let hash = ScanCache::entry_hash(&config, "const a = 1;");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(hash, ScanCache::entry_hash(&config, "const a = 1;"));
        assert_ne!(hash, ScanCache::entry_hash(&config, "const a = 2;"));
    }
}
