//! Row rendering.

use std::io::{self, Write};

use dirql::RowSet;

use crate::args::Format;

/// Writes one result set and flushes it, so each statement's rows are out
/// before the next statement runs.
pub fn write_rows(out: &mut impl Write, rows: &RowSet, format: Format) -> io::Result<()> {
    match format {
        Format::Table => write_table(out, rows)?,
        Format::Json => {
            serde_json::to_writer(&mut *out, rows).map_err(io::Error::other)?;
            writeln!(out)?;
        }
    }
    out.flush()
}

/// Header line of column names, then one tab-separated line per row.
fn write_table(out: &mut impl Write, rows: &RowSet) -> io::Result<()> {
    writeln!(out, "{}", rows.columns.join("\t"))?;
    for row in rows.iter() {
        let cells: Vec<String> = row.iter().map(ToString::to_string).collect();
        writeln!(out, "{}", cells.join("\t"))?;
    }
    Ok(())
}
