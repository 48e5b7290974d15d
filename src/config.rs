//! Settings from the environment; the binary overrides them from its
//! command line flags.

use std::path::PathBuf;

use anyhow::Result;
use kstring::KString;

use crate::{cache::{AnyCache, DirCache, MemoryCache},
            fetch::FileFetcher,
            markers::{Markers, DEFAULT_PREFIX},
            util::{getenv, parse_bool}};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory the file fetcher resolves urls against (`JX_ROOT`).
    pub root: PathBuf,
    /// Persistent cache directory (`JX_CACHE_DIR`); in-memory cache
    /// if unset.
    pub cache_dir: Option<PathBuf>,
    /// Marker attribute prefix (`JX_PREFIX`).
    pub prefix: KString,
    /// `JX_TRACE`
    pub trace: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            root: PathBuf::from("."),
            cache_dir: None,
            prefix: KString::from_static(DEFAULT_PREFIX),
            trace: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Config> {
        Config::from_vars(getenv)
    }

    /// `get` returns the value of the named variable, if set.
    pub fn from_vars(get: impl Fn(&str) -> Result<Option<String>>) -> Result<Config> {
        let mut config = Config::default();
        if let Some(root) = get("JX_ROOT")? {
            config.root = root.into();
        }
        config.cache_dir = get("JX_CACHE_DIR")?
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);
        if let Some(prefix) = get("JX_PREFIX")? {
            config.prefix = prefix.into();
        }
        if let Some(trace) = get("JX_TRACE")? {
            config.trace = parse_bool("JX_TRACE", &trace)?;
        }
        Ok(config)
    }

    pub fn markers(&self) -> Markers {
        Markers::with_prefix(&self.prefix)
    }

    pub fn fetcher(&self) -> FileFetcher {
        FileFetcher::new(&self.root)
    }

    pub fn cache(&self) -> AnyCache {
        match &self.cache_dir {
            Some(dir) => AnyCache::Dir(DirCache::new(dir)),
            None => AnyCache::Memory(MemoryCache::new()),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Result<Option<String>> {
        let map: HashMap<String, String> = pairs.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| Ok(map.get(name).cloned())
    }

    #[test]
    fn t_defaults() {
        let config = Config::from_vars(vars(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.root, PathBuf::from("."));
        assert_eq!(config.markers().each, "jx-each");
        assert!(matches!(config.cache(), AnyCache::Memory(_)));
    }

    #[test]
    fn t_from_vars() {
        let config = Config::from_vars(vars(&[
            ("JX_ROOT", "/srv/www"),
            ("JX_CACHE_DIR", "/var/cache/jx"),
            ("JX_PREFIX", "data-"),
            ("JX_TRACE", "1"),
        ])).unwrap();
        assert_eq!(config.root, PathBuf::from("/srv/www"));
        assert_eq!(config.cache_dir, Some(PathBuf::from("/var/cache/jx")));
        assert_eq!(config.markers().cond, "data-if");
        assert!(config.trace);
        assert!(matches!(config.cache(), AnyCache::Dir(_)));

        let config = Config::from_vars(vars(&[("JX_CACHE_DIR", "")])).unwrap();
        assert_eq!(config.cache_dir, None);
        assert!(Config::from_vars(vars(&[("JX_TRACE", "sometimes")])).is_err());
    }
}
