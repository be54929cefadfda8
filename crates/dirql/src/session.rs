//! Build-then-query sessions over one walked root.
//!
//! A session is built once (walk, drive, engine load) and is read-only
//! afterwards; every query runs parse → rewrite → execute against it.

use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use std::time::Instant;

use crate::engine::{RelationalEngine, RowSet, SqliteEngine};
use crate::error::{canonicalize_existing_path, DirqlError, Result};
use crate::index::{
    into_visits, normalize_absolute_path, walk_it, Catalog, DirectoryNaming, DirectoryVisit,
    WalkData, WalkDriver,
};
use crate::query::{rewrite, EngineRequest, StatementParser};
use crate::types::{IndexOptions, PathStyle};

pub struct Session<E: RelationalEngine = SqliteEngine> {
    root: PathBuf,
    catalog: Catalog,
    engine: E,
}

impl Session<SqliteEngine> {
    /// Walks `root` and indexes everything below it.
    pub fn open(root: impl AsRef<Path>, options: &IndexOptions) -> Result<Self> {
        let started = Instant::now();
        let root = canonicalize_existing_path(root.as_ref().to_path_buf());
        if !root.is_dir() {
            return Err(DirqlError::InvalidInput(format!(
                "not a directory: {}",
                root.display()
            )));
        }

        let ignored: Vec<PathBuf> = options
            .ignore_directories
            .iter()
            .cloned()
            .map(canonicalize_existing_path)
            .collect();
        let walk_data = WalkData::new(&root, &ignored);
        let tree = walk_it(&walk_data)?;
        log::info!(
            "dirql walk complete root={} dirs={} files={} skipped={} elapsed_ms={}",
            root.display(),
            walk_data.num_dirs.load(Ordering::Relaxed),
            walk_data.num_files.load(Ordering::Relaxed),
            walk_data.num_errors.load(Ordering::Relaxed),
            started.elapsed().as_millis()
        );

        Self::from_visits(root, into_visits(tree), options)
    }

    /// Indexes a pre-made visit stream. `root` only spells absolute directories.
    pub fn from_visits<I>(root: impl Into<PathBuf>, visits: I, options: &IndexOptions) -> Result<Self>
    where
        I: IntoIterator<Item = DirectoryVisit>,
    {
        let started = Instant::now();
        let root = root.into();
        let naming = match options.path_style {
            PathStyle::Relative => DirectoryNaming::Relative,
            PathStyle::Absolute => {
                DirectoryNaming::Absolute(normalize_absolute_path(&root.to_string_lossy()))
            }
        };

        let mut catalog = Catalog::new();
        let stats = WalkDriver::new(&mut catalog, naming).drive(visits)?;
        let engine = SqliteEngine::load(&catalog)?;

        log::info!(
            "dirql index built root={} entries={} edges={} dirs={} files={} elapsed_ms={}",
            root.display(),
            catalog.len(),
            catalog.closure().len(),
            stats.directories,
            stats.files,
            started.elapsed().as_millis()
        );
        Ok(Self::from_parts(root, catalog, engine))
    }
}

impl<E: RelationalEngine> Session<E> {
    pub fn from_parts(root: PathBuf, catalog: Catalog, engine: E) -> Self {
        Self {
            root,
            catalog,
            engine,
        }
    }

    /// Parses, rewrites, and executes one statement.
    pub fn query(&self, text: &str) -> Result<RowSet> {
        let started = Instant::now();
        let request = self.prepare(text)?;
        let rows = self.engine.execute(&request)?;
        log::debug!(
            "dirql query rows={} elapsed_ms={}",
            rows.len(),
            started.elapsed().as_millis()
        );
        Ok(rows)
    }

    /// Parses and rewrites a statement without executing it.
    pub fn prepare(&self, text: &str) -> Result<EngineRequest> {
        let statement = StatementParser::parse(text)?;
        rewrite(&statement, self.catalog.paths())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }
}
