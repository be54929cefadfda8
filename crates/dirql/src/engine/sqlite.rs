//! In-memory SQLite engine.
//!
//! The catalog is copied into `files` and `relations` once, inside a single
//! transaction. Each request is rendered to SQL with the subtree root bound as
//! `?1` and the forwarded clause fragments spliced in as text.

use std::time::Instant;

use rusqlite::{params, Connection};

use super::rows::{RowSet, Value};
use super::RelationalEngine;
use crate::error::Result;
use crate::index::Catalog;
use crate::query::{EngineRequest, RowSource};
use crate::schema::{
    CREATE_TABLES, FILES_TABLE, INSERT_FILE, INSERT_RELATION, RELATIONS_TABLE, TIMESTAMP_FORMAT,
};

pub struct SqliteEngine {
    connection: Connection,
}

impl SqliteEngine {
    /// Creates an in-memory database holding every entry and closure edge.
    pub fn load(catalog: &Catalog) -> Result<Self> {
        let start = Instant::now();
        let mut connection = Connection::open_in_memory()?;
        connection.execute_batch(CREATE_TABLES)?;

        let tx = connection.transaction()?;
        {
            let mut insert_file = tx.prepare(INSERT_FILE)?;
            for entry in catalog.entries().iter() {
                let file_type = entry.type_code().map(String::from);
                let creation_time = entry
                    .creation_time
                    .map(|time| time.format(TIMESTAMP_FORMAT).to_string());
                insert_file.execute(params![
                    i64::from(entry.id.get()),
                    entry.name,
                    entry.directory,
                    entry.full_path(),
                    file_type,
                    i64::try_from(entry.size).unwrap_or(i64::MAX),
                    entry.access_time.format(TIMESTAMP_FORMAT).to_string(),
                    entry.modification_time.format(TIMESTAMP_FORMAT).to_string(),
                    creation_time,
                    i64::from(entry.owner_id),
                    i64::from(entry.group_id),
                ])?;
            }

            let mut insert_relation = tx.prepare(INSERT_RELATION)?;
            for edge in catalog.closure().edges() {
                insert_relation.execute(params![
                    i64::from(edge.ancestor_id.get()),
                    i64::from(edge.descendant_id.get()),
                    i64::from(edge.depth),
                ])?;
            }
        }
        tx.commit()?;

        log::debug!(
            "dirql engine loaded files={} relations={} elapsed_ms={}",
            catalog.len(),
            catalog.closure().len(),
            start.elapsed().as_millis()
        );
        Ok(Self { connection })
    }
}

impl RelationalEngine for SqliteEngine {
    fn execute(&self, request: &EngineRequest) -> Result<RowSet> {
        let sql = render_sql(request);
        let RowSource::Subtree { root } = request.source;
        log::debug!("dirql engine sql={} root={}", sql, root);

        let mut statement = self.connection.prepare(&sql)?;
        let columns: Vec<String> = statement
            .column_names()
            .into_iter()
            .map(String::from)
            .collect();
        let column_count = columns.len();

        let mut result = RowSet::new(columns);
        let mut rows = statement.query(params![i64::from(root.get())])?;
        while let Some(row) = rows.next()? {
            let values = (0..column_count)
                .map(|index| row.get_ref(index).map(Value::from))
                .collect::<rusqlite::Result<Vec<_>>>()?;
            result.rows.push(values);
        }
        Ok(result)
    }
}

/// Renders a request as a single SELECT over the subtree join.
pub fn render_sql(request: &EngineRequest) -> String {
    let mut sql = String::from("SELECT ");
    if request.distinct {
        sql.push_str("DISTINCT ");
    }

    let columns: Vec<String> = request
        .columns
        .iter()
        .map(|column| match &column.alias {
            Some(alias) => format!("{} AS {}", column.expr, quote_identifier(alias)),
            None => column.expr.clone(),
        })
        .collect();
    sql.push_str(&columns.join(", "));

    match request.source {
        RowSource::Subtree { .. } => {
            sql.push_str(&format!(
                " FROM {FILES_TABLE} JOIN {RELATIONS_TABLE} \
                 ON {FILES_TABLE}.file_id = {RELATIONS_TABLE}.descendant_id \
                 WHERE {RELATIONS_TABLE}.ancestor_id = ?1"
            ));
        }
    }

    if let Some(predicate) = &request.predicate {
        sql.push_str(&format!(" AND ({predicate})"));
    }
    if !request.group_by.is_empty() {
        sql.push_str(" GROUP BY ");
        sql.push_str(&request.group_by.join(", "));
    }
    if let Some(having) = &request.having {
        sql.push_str(" HAVING ");
        sql.push_str(having);
    }
    if !request.order_by.is_empty() {
        sql.push_str(" ORDER BY ");
        sql.push_str(&request.order_by.join(", "));
    }
    if let Some(limit) = &request.limit {
        sql.push_str(" LIMIT ");
        sql.push_str(limit);
    }
    if let Some(offset) = &request.offset {
        sql.push_str(" OFFSET ");
        sql.push_str(offset);
    }
    sql
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DirqlError;
    use crate::index::{DirectoryNaming, DirectoryVisit, WalkDriver};
    use crate::query::Projection;
    use crate::storage::EntryId;
    use crate::types::{EntryKind, EntryStat};

    fn catalog() -> Catalog {
        let mut catalog = Catalog::new();
        WalkDriver::new(&mut catalog, DirectoryNaming::Relative)
            .drive(vec![
                DirectoryVisit::new(".", EntryStat::synthetic(EntryKind::Directory, 4096))
                    .with_subdirectory("sub")
                    .with_file("a.txt", EntryStat::synthetic(EntryKind::Regular, 10)),
                DirectoryVisit::new("sub", EntryStat::synthetic(EntryKind::Directory, 4096))
                    .with_file("b.txt", EntryStat::synthetic(EntryKind::Regular, 20)),
            ])
            .unwrap();
        catalog
    }

    fn request(columns: &[&str], root: u32) -> EngineRequest {
        EngineRequest {
            distinct: false,
            columns: columns
                .iter()
                .map(|column| Projection::new(*column, None))
                .collect(),
            source: RowSource::Subtree {
                root: EntryId::new(root),
            },
            predicate: None,
            group_by: Vec::new(),
            having: None,
            order_by: vec!["file_id".to_string()],
            limit: None,
            offset: None,
        }
    }

    #[test]
    fn renders_every_clause_in_order() {
        let mut request = request(&["file_type"], 1);
        request.distinct = true;
        request.columns.push(Projection::new("count(*)", Some("n".to_string())));
        request.predicate = Some("file_size > 1 OR depth = 0".to_string());
        request.group_by = vec!["file_type".to_string()];
        request.having = Some("n > 0".to_string());
        request.limit = Some("5".to_string());
        request.offset = Some("1".to_string());

        assert_eq!(
            render_sql(&request),
            "SELECT DISTINCT file_type, count(*) AS \"n\" \
             FROM files JOIN relations ON files.file_id = relations.descendant_id \
             WHERE relations.ancestor_id = ?1 AND (file_size > 1 OR depth = 0) \
             GROUP BY file_type HAVING n > 0 ORDER BY file_id LIMIT 5 OFFSET 1"
        );
    }

    #[test]
    fn executes_over_the_subtree_only() {
        let engine = SqliteEngine::load(&catalog()).unwrap();
        let rows = engine
            .execute(&request(&["file_name", "depth", "file_type"], 3))
            .unwrap();

        assert_eq!(rows.columns, vec!["file_name", "depth", "file_type"]);
        assert_eq!(
            rows.rows,
            vec![
                vec![Value::from("sub"), Value::Integer(0), Value::from("D")],
                vec![Value::from("b.txt"), Value::Integer(1), Value::from("F")],
            ]
        );
    }

    #[test]
    fn timestamps_are_stored_as_text() {
        let engine = SqliteEngine::load(&catalog()).unwrap();
        let rows = engine
            .execute(&request(&["modification_time", "creation_time"], 1))
            .unwrap();
        assert_eq!(
            rows.rows[0],
            vec![Value::from("1970-01-01 00:00:00.000000"), Value::Null]
        );
    }

    #[test]
    fn engine_errors_are_forwarded() {
        let engine = SqliteEngine::load(&catalog()).unwrap();
        let error = engine
            .execute(&request(&["no_such_column"], 1))
            .unwrap_err();
        assert!(matches!(error, DirqlError::Engine(ref message) if message.contains("no_such_column")));
    }
}
