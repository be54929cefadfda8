//! Path registry mapping walked directories to their entry ids.

use fnv::FnvHashMap;

use super::path::{normalize_absolute_path, normalize_relative_path, strip_root, ROOT_PATH};
use crate::error::{DirqlError, Result};
use crate::storage::EntryId;

/// Normalized relative directory path to entry id. Filled only by the walk.
#[derive(Debug, Default)]
pub struct PathRegistry {
    paths: FnvHashMap<String, EntryId>,
    /// Absolute walk root; when set, absolute FROM paths under it resolve too.
    absolute_root: Option<String>,
}

impl PathRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_absolute_root(&mut self, root: &str) {
        self.absolute_root = Some(normalize_absolute_path(root));
    }

    pub fn absolute_root(&self) -> Option<&str> {
        self.absolute_root.as_deref()
    }

    /// Registers a directory; the key is normalized first.
    pub(crate) fn register(&mut self, path: &str, id: EntryId) -> Result<()> {
        let key = normalize_relative_path(path).ok_or_else(|| {
            DirqlError::Index(format!("cannot register directory path {path:?}"))
        })?;
        if self.paths.contains_key(&key) {
            return Err(DirqlError::Index(format!("directory {key:?} visited twice")));
        }
        self.paths.insert(key, id);
        Ok(())
    }

    /// Looks up an already normalized key.
    pub fn get(&self, key: &str) -> Option<EntryId> {
        self.paths.get(key).copied()
    }

    /// Resolves FROM-path text to an entry id.
    pub fn resolve(&self, text: &str) -> Result<EntryId> {
        self.normalize(text)
            .and_then(|key| self.get(&key))
            .ok_or_else(|| DirqlError::UnknownPath(text.to_string()))
    }

    fn normalize(&self, text: &str) -> Option<String> {
        if !text.starts_with('/') {
            return normalize_relative_path(text);
        }
        let root = self.absolute_root.as_deref()?;
        let relative = strip_root(text, root)?;
        normalize_relative_path(relative)
    }

    /// The root's id, once the walk has registered it.
    pub fn root(&self) -> Option<EntryId> {
        self.get(ROOT_PATH)
    }

    /// Registered paths in lexicographic order.
    pub fn paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self.paths.keys().map(String::as_str).collect();
        paths.sort_unstable();
        paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> PathRegistry {
        let mut registry = PathRegistry::new();
        registry.register(".", EntryId::new(1)).unwrap();
        registry.register("subdir1", EntryId::new(3)).unwrap();
        registry.register("subdir2/subdir3", EntryId::new(8)).unwrap();
        registry
    }

    #[test]
    fn resolves_root_and_relative_paths() {
        let registry = registry();
        assert_eq!(registry.resolve(".").unwrap(), EntryId::new(1));
        assert_eq!(registry.resolve("./subdir1/").unwrap(), EntryId::new(3));
        assert_eq!(registry.resolve("subdir2//subdir3").unwrap(), EntryId::new(8));
        assert_eq!(registry.root(), Some(EntryId::new(1)));
    }

    #[test]
    fn resolution_is_repeatable() {
        let registry = registry();
        assert_eq!(
            registry.resolve("subdir1").unwrap(),
            registry.resolve("subdir1").unwrap()
        );
    }

    #[test]
    fn unknown_paths_fail() {
        let registry = registry();
        assert!(matches!(
            registry.resolve("missing"),
            Err(DirqlError::UnknownPath(path)) if path == "missing"
        ));
        assert!(matches!(registry.resolve(".."), Err(DirqlError::UnknownPath(_))));
        assert!(matches!(registry.resolve("/abs"), Err(DirqlError::UnknownPath(_))));
    }

    #[test]
    fn absolute_paths_resolve_under_the_root() {
        let mut registry = registry();
        registry.set_absolute_root("/data/root/");
        assert_eq!(registry.resolve("/data/root").unwrap(), EntryId::new(1));
        assert_eq!(registry.resolve("/data/root/subdir1").unwrap(), EntryId::new(3));
        assert!(registry.resolve("/data/other").is_err());
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut registry = registry();
        assert!(matches!(
            registry.register("./subdir1", EntryId::new(9)),
            Err(DirqlError::Index(_))
        ));
    }

    #[test]
    fn paths_are_sorted() {
        assert_eq!(registry().paths(), vec![".", "subdir1", "subdir2/subdir3"]);
    }
}
