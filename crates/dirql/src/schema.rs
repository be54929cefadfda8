//! Relational schema shared by the rewriter and the engine.
//!
//! `files` holds one row per entry, `relations` one row per closure edge.
//! The set of queryable columns is fixed here and nowhere else.

/// Table holding one row per walked entry.
pub const FILES_TABLE: &str = "files";

/// Table holding one row per closure edge.
pub const RELATIONS_TABLE: &str = "relations";

/// Rendering of every timestamp column, chosen so SQLite date functions accept it.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

pub const CREATE_TABLES: &str = "
CREATE TABLE files (
    file_id INTEGER PRIMARY KEY,
    file_name TEXT NOT NULL,
    directory TEXT NOT NULL,
    full_path TEXT NOT NULL,
    file_type TEXT,
    file_size INTEGER NOT NULL,
    access_time TEXT NOT NULL,
    modification_time TEXT NOT NULL,
    creation_time TEXT,
    owner_id INTEGER NOT NULL,
    group_id INTEGER NOT NULL
);
CREATE TABLE relations (
    ancestor_id INTEGER NOT NULL REFERENCES files(file_id),
    descendant_id INTEGER NOT NULL REFERENCES files(file_id),
    depth INTEGER NOT NULL,
    PRIMARY KEY (ancestor_id, descendant_id)
) WITHOUT ROWID;
CREATE INDEX relations_descendant ON relations(descendant_id);
";

pub const INSERT_FILE: &str = "INSERT INTO files (file_id, file_name, directory, full_path, \
     file_type, file_size, access_time, modification_time, creation_time, owner_id, group_id) \
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)";

pub const INSERT_RELATION: &str =
    "INSERT INTO relations (ancestor_id, descendant_id, depth) VALUES (?1, ?2, ?3)";

/// A column produced by expanding `*`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WildcardColumn {
    pub table: &'static str,
    pub name: &'static str,
}

impl WildcardColumn {
    const fn new(table: &'static str, name: &'static str) -> Self {
        Self { table, name }
    }

    /// The table-qualified reference, e.g. `files.file_name`.
    pub fn qualified(&self) -> String {
        format!("{}.{}", self.table, self.name)
    }
}

/// The columns `*` expands to, in result order.
pub const WILDCARD_COLUMNS: [WildcardColumn; 10] = [
    WildcardColumn::new(FILES_TABLE, "file_name"),
    WildcardColumn::new(FILES_TABLE, "directory"),
    WildcardColumn::new(FILES_TABLE, "full_path"),
    WildcardColumn::new(FILES_TABLE, "file_type"),
    WildcardColumn::new(FILES_TABLE, "file_size"),
    WildcardColumn::new(FILES_TABLE, "access_time"),
    WildcardColumn::new(FILES_TABLE, "modification_time"),
    WildcardColumn::new(FILES_TABLE, "owner_id"),
    WildcardColumn::new(FILES_TABLE, "group_id"),
    WildcardColumn::new(RELATIONS_TABLE, "depth"),
];

/// Columns queryable by name but left out of `*`.
pub const EXTRA_COLUMNS: [WildcardColumn; 4] = [
    WildcardColumn::new(FILES_TABLE, "file_id"),
    WildcardColumn::new(FILES_TABLE, "creation_time"),
    WildcardColumn::new(RELATIONS_TABLE, "ancestor_id"),
    WildcardColumn::new(RELATIONS_TABLE, "descendant_id"),
];

/// Names of the columns `*` expands to.
pub fn field_names() -> impl Iterator<Item = &'static str> {
    WILDCARD_COLUMNS.iter().map(|column| column.name)
}

/// Every column name a query may reference.
pub fn queryable_names() -> impl Iterator<Item = &'static str> {
    WILDCARD_COLUMNS
        .iter()
        .chain(EXTRA_COLUMNS.iter())
        .map(|column| column.name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_order_is_fixed() {
        let names: Vec<&str> = field_names().collect();
        assert_eq!(
            names,
            vec![
                "file_name",
                "directory",
                "full_path",
                "file_type",
                "file_size",
                "access_time",
                "modification_time",
                "owner_id",
                "group_id",
                "depth",
            ]
        );
        assert_eq!(WILDCARD_COLUMNS[9].qualified(), "relations.depth");
    }

    #[test]
    fn queryable_names_are_unique() {
        let mut names: Vec<&str> = queryable_names().collect();
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), total);
        assert_eq!(total, 14);
    }
}
