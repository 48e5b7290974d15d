//! Where the data comes from. The controller only sees the `Fetcher`
//! trait; real HTTP is out of scope, the file based fetcher serves
//! a directory the way a static web server would.

use std::{collections::HashMap, io::ErrorKind, path::PathBuf};

use kstring::KString;

use crate::{binding::Method, def_boxed_thiserror};

def_boxed_thiserror!(BindError, pub enum BindErrorKind {
    #[error("HTTP {0}")]
    Status(u16),
    #[error("reading {path:?}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
});

impl BindError {
    pub fn status(code: u16) -> BindError {
        BindErrorKind::Status(code).into()
    }
}

pub trait Fetcher {
    /// The complete response body for a successful (2xx) request.
    fn fetch(&self, method: Method, url: &str) -> Result<String, BindError>;
}

impl<F: Fetcher + ?Sized> Fetcher for &F {
    fn fetch(&self, method: Method, url: &str) -> Result<String, BindError> {
        (**self).fetch(method, url)
    }
}

/// Serves files below `root`; GET and POST read the same file. The
/// query string is ignored.
#[derive(Debug, Clone)]
pub struct FileFetcher {
    root: PathBuf,
}

impl FileFetcher {
    pub fn new(root: impl Into<PathBuf>) -> FileFetcher {
        FileFetcher { root: root.into() }
    }

    /// The file for `url`, or None if the url tries to leave `root`.
    pub fn path_for(&self, url: &str) -> Option<PathBuf> {
        let path = url.split(&['?', '#'][..]).next().unwrap_or("");
        let mut full = self.root.clone();
        for segment in path.split('/') {
            match segment {
                "" | "." => (),
                ".." => return None,
                s => full.push(s),
            }
        }
        Some(full)
    }
}

impl Fetcher for FileFetcher {
    fn fetch(&self, _method: Method, url: &str) -> Result<String, BindError> {
        let path = self.path_for(url).ok_or_else(|| BindError::status(403))?;
        if path.is_dir() {
            return Err(BindError::status(404))
        }
        std::fs::read_to_string(&path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => BindError::status(404),
            ErrorKind::PermissionDenied => BindError::status(403),
            _ => BindErrorKind::Io { path, source }.into(),
        })
    }
}

/// Canned responses, keyed by method and url.
#[derive(Debug, Clone, Default)]
pub struct MapFetcher {
    responses: HashMap<(Method, KString), (u16, String)>,
}

impl MapFetcher {
    pub fn new() -> MapFetcher {
        MapFetcher::default()
    }

    pub fn with(mut self, method: Method, url: &str, status: u16, body: &str) -> MapFetcher {
        self.responses.insert((method, KString::from_ref(url)), (status, body.to_string()));
        self
    }
}

impl Fetcher for MapFetcher {
    fn fetch(&self, method: Method, url: &str) -> Result<String, BindError> {
        match self.responses.get(&(method, KString::from_ref(url))) {
            Some((status, body)) if (200..300).contains(status) => Ok(body.clone()),
            Some((status, _)) => Err(BindError::status(*status)),
            None => Err(BindError::status(404)),
        }
    }
}
