//! Keeping fetched JSON around under a name (`jx-save="key"`), to
//! render it again later without fetching.

use std::{collections::HashMap, path::PathBuf};

use anyhow::{Result, Context, bail};

pub trait Cache {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    entries: HashMap<String, String>,
}

impl MemoryCache {
    pub fn new() -> MemoryCache {
        MemoryCache::default()
    }
}

impl Cache for MemoryCache {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One `<key>.json` file per entry in `dir`.
#[derive(Debug, Clone)]
pub struct DirCache {
    dir: PathBuf,
}

fn check_key(key: &str) -> Result<()> {
    if key.is_empty()
        || key.starts_with('.')
        || !key.chars().all(|c| c.is_ascii_alphanumeric() || "-_.".contains(c))
    {
        bail!("invalid cache key {key:?}: only ASCII letters, digits, '-', '_' \
               and '.' (not leading) are allowed")
    }
    Ok(())
}

impl DirCache {
    /// The directory is created when the first entry is written.
    pub fn new(dir: impl Into<PathBuf>) -> DirCache {
        DirCache { dir: dir.into() }
    }

    fn path(&self, key: &str) -> Result<PathBuf> {
        check_key(key)?;
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl Cache for DirCache {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path(key)?;
        match std::fs::read_to_string(&path) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("reading cache file {path:?}")),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.path(key)?;
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating cache dir {:?}", self.dir))?;
        std::fs::write(&path, value)
            .with_context(|| format!("writing cache file {path:?}"))
    }
}

/// Either kind, as picked by configuration.
#[derive(Debug, Clone)]
pub enum AnyCache {
    Memory(MemoryCache),
    Dir(DirCache),
}

impl Cache for AnyCache {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match self {
            AnyCache::Memory(c) => c.get(key),
            AnyCache::Dir(c) => c.get(key),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match self {
            AnyCache::Memory(c) => c.set(key, value),
            AnyCache::Dir(c) => c.set(key, value),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn t_memory_cache() {
        let mut c = MemoryCache::new();
        assert_eq!(c.get("k").unwrap(), None);
        c.set("k", "[1]").unwrap();
        c.set("k", "[2]").unwrap();
        assert_eq!(c.get("k").unwrap().as_deref(), Some("[2]"));
    }

    #[test]
    fn t_dir_cache() {
        let dir = std::env::temp_dir().join(format!("jx-cache-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        let mut c = AnyCache::Dir(DirCache::new(&dir));
        assert_eq!(c.get("users").unwrap(), None);
        c.set("users", "{\"a\":1}").unwrap();
        assert_eq!(c.get("users").unwrap().as_deref(), Some("{\"a\":1}"));
        assert!(dir.join("users.json").is_file());
        assert!(c.set("../escape", "x").is_err());
        assert!(c.get(".hidden").is_err());
        assert!(c.set("", "x").is_err());
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
