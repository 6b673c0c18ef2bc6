use chrono::{DateTime, Local};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, Result};
use crate::model::{Project, WorkType};

/// Cached catalog of projects and work types
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogCache {
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub work_types: Vec<WorkType>,
    pub last_updated: String, // RFC 3339 timestamp
}

impl CatalogCache {
    /// Create a new empty cache
    pub fn new() -> Self {
        CatalogCache {
            projects: Vec::new(),
            work_types: Vec::new(),
            last_updated: Local::now().to_rfc3339(),
        }
    }

    /// Get the cache file path
    pub fn get_cache_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "ticktock", "ticktock")
            .map(|proj_dirs| proj_dirs.cache_dir().join("catalog_cache.json"))
    }

    /// Load cache from the default location
    pub fn load() -> Result<Self> {
        let cache_path = Self::get_cache_path().ok_or(ConfigError::NoConfigDirectory)?;
        Self::load_from(&cache_path)
    }

    /// Load cache from `path`; a missing file yields an empty cache
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let cache_data = fs::read_to_string(path)?;
        let cache: CatalogCache = serde_json::from_str(&cache_data)?;
        Ok(cache)
    }

    /// Save cache to the default location
    pub fn save(&self) -> Result<()> {
        let cache_path = Self::get_cache_path().ok_or(ConfigError::NoConfigDirectory)?;
        self.save_to(&cache_path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let cache_data = serde_json::to_string_pretty(self)?;
        fs::write(path, cache_data)?;
        Ok(())
    }

    /// Replace the cached catalog
    pub fn update(&mut self, projects: Vec<Project>, work_types: Vec<WorkType>) {
        self.projects = projects;
        self.work_types = work_types;
        self.last_updated = Local::now().to_rfc3339();
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty() && self.work_types.is_empty()
    }

    /// Check if cache is stale (older than specified hours)
    pub fn is_stale(&self, hours: i64) -> bool {
        if let Ok(last_updated) = DateTime::parse_from_rfc3339(&self.last_updated) {
            let now = Local::now();
            let duration = now.signed_duration_since(last_updated);
            duration.num_hours() >= hours
        } else {
            true // unparseable timestamps count as stale
        }
    }

    pub fn clear(&mut self) {
        self.projects.clear();
        self.work_types.clear();
        self.last_updated = Local::now().to_rfc3339();
    }
}

impl Default for CatalogCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::{demo_projects, demo_work_types};
    use tempfile::TempDir;

    #[test]
    fn test_cache_new() {
        let cache = CatalogCache::new();
        assert!(cache.is_empty());
        assert!(!cache.last_updated.is_empty());
    }

    #[test]
    fn test_update_replaces_catalog() {
        let mut cache = CatalogCache::new();
        cache.update(demo_projects(), demo_work_types());
        assert_eq!(cache.projects.len(), 5);
        assert_eq!(cache.work_types[1].name, "Feature Development");

        cache.update(vec![], demo_work_types());
        assert!(cache.projects.is_empty());
        assert!(!cache.is_empty());
    }

    #[test]
    fn test_is_stale() {
        let mut cache = CatalogCache::new();
        assert!(!cache.is_stale(24));

        let two_days_ago = Local::now() - chrono::Duration::days(2);
        cache.last_updated = two_days_ago.to_rfc3339();
        assert!(cache.is_stale(24));
        assert!(!cache.is_stale(72));

        cache.last_updated = "yesterday".to_string();
        assert!(cache.is_stale(24));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("catalog_cache.json");

        let mut cache = CatalogCache::new();
        cache.update(demo_projects(), demo_work_types());
        cache.save_to(&path).unwrap();

        let loaded = CatalogCache::load_from(&path).unwrap();
        assert_eq!(loaded.projects, cache.projects);
        assert_eq!(loaded.last_updated, cache.last_updated);
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let loaded = CatalogCache::load_from(&dir.path().join("absent.json")).unwrap();
        assert!(loaded.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut cache = CatalogCache::new();
        cache.update(demo_projects(), demo_work_types());
        cache.clear();
        assert!(cache.is_empty());
    }
}
