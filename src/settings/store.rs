//! Settings store with a read-through cache
//!
//! Reads are hot (every attack consults settings), writes are rare admin
//! actions. The cache is refreshed explicitly on write; a community with no
//! stored settings falls back to the documented defaults rather than
//! failing the command.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use ahash::AHashMap;

use crate::core::{CommunityId, EngineError, Result};
use crate::settings::CommunitySettings;

pub trait SettingsRepository: Send + Sync {
    fn load(&self, community: CommunityId) -> Result<Option<CommunitySettings>>;
    fn store(&self, community: CommunityId, settings: &CommunitySettings) -> Result<()>;
}

/// In-process repository for tests and the demo binary
#[derive(Debug, Default)]
pub struct MemorySettingsRepository {
    inner: Mutex<AHashMap<CommunityId, CommunitySettings>>,
}

impl MemorySettingsRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsRepository for MemorySettingsRepository {
    fn load(&self, community: CommunityId) -> Result<Option<CommunitySettings>> {
        Ok(self.inner.lock().unwrap().get(&community).cloned())
    }

    fn store(&self, community: CommunityId, settings: &CommunitySettings) -> Result<()> {
        self.inner
            .lock()
            .unwrap()
            .insert(community, settings.clone());
        Ok(())
    }
}

/// Repository backed by a directory of `<community>.toml` files
#[derive(Debug)]
pub struct TomlSettingsRepository {
    dir: PathBuf,
}

impl TomlSettingsRepository {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, community: CommunityId) -> PathBuf {
        self.dir.join(format!("{}.toml", community.0))
    }
}

impl SettingsRepository for TomlSettingsRepository {
    fn load(&self, community: CommunityId) -> Result<Option<CommunitySettings>> {
        let path = self.path_for(community);
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path)?;
        let settings = toml::from_str(&content)
            .map_err(|e| EngineError::Settings(format!("{}: {}", path.display(), e)))?;
        Ok(Some(settings))
    }

    fn store(&self, community: CommunityId, settings: &CommunitySettings) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let text = toml::to_string_pretty(settings)
            .map_err(|e| EngineError::Settings(e.to_string()))?;
        std::fs::write(self.path_for(community), text)?;
        Ok(())
    }
}

/// Cached settings reader shared by every attack path
pub struct SettingsStore {
    repo: Arc<dyn SettingsRepository>,
    cache: Mutex<AHashMap<CommunityId, Arc<CommunitySettings>>>,
}

impl SettingsStore {
    pub fn new(repo: Arc<dyn SettingsRepository>) -> Self {
        Self {
            repo,
            cache: Mutex::new(AHashMap::new()),
        }
    }

    /// Current settings for a community; defaults when nothing is stored
    pub fn get(&self, community: CommunityId) -> Result<Arc<CommunitySettings>> {
        if let Some(cached) = self.cache.lock().unwrap().get(&community) {
            return Ok(Arc::clone(cached));
        }
        let settings = Arc::new(self.repo.load(community)?.unwrap_or_default());
        self.cache
            .lock()
            .unwrap()
            .insert(community, Arc::clone(&settings));
        Ok(settings)
    }

    /// Administrative write: persist first, then refresh the cache
    pub fn update<F>(&self, community: CommunityId, mutate: F) -> Result<()>
    where
        F: FnOnce(&mut CommunitySettings),
    {
        let mut settings = self.get(community)?.as_ref().clone();
        mutate(&mut settings);
        self.repo.store(community, &settings)?;
        self.cache
            .lock()
            .unwrap()
            .insert(community, Arc::new(settings));
        Ok(())
    }

    /// Drop a cached entry, forcing the next read to hit the repository
    pub fn invalidate(&self, community: CommunityId) {
        self.cache.lock().unwrap().remove(&community);
    }
}
