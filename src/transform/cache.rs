//! Compiled-stylesheet cache.
//!
//! Keyed by the stylesheet path exactly as passed in; `a.xsl` and `./a.xsl`
//! are different keys. A path is compiled at most once per cache. A failed
//! compile stores nothing.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct StylesheetCache<S> {
    compiled: HashMap<PathBuf, S>,
}

impl<S> StylesheetCache<S> {
    pub fn new() -> Self {
        Self {
            compiled: HashMap::new(),
        }
    }

    /// Return the cached value for `path`, running `compile` on a miss.
    pub fn get_or_compile<E>(
        &mut self,
        path: &Path,
        compile: impl FnOnce() -> Result<S, E>,
    ) -> Result<&S, E> {
        match self.compiled.entry(path.to_path_buf()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => Ok(entry.insert(compile()?)),
        }
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.compiled.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.compiled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.compiled.is_empty()
    }
}

impl<S> Default for StylesheetCache<S> {
    fn default() -> Self {
        Self::new()
    }
}
