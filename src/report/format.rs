//! Terminal rendering of tables and their type summaries.
//!
//! Layout follows the familiar dataframe console style: a left-aligned row
//! index, right-aligned columns separated by two spaces, and head/tail
//! truncation for long tables.

use crate::domain::Table;

/// Tables longer than this print only their head and tail.
const MAX_ROWS: usize = 60;
const EDGE_ROWS: usize = 5;
const ELLIPSIS: &str = "...";

/// Render the whole table (or its head/tail when long).
pub fn format_table(table: &Table) -> String {
    let n_rows = table.n_rows();
    if table.n_cols() == 0 || n_rows == 0 {
        let names: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
        return format!("Empty DataFrame\nColumns: [{}]\nIndex: []", names.join(", "));
    }

    let truncated = n_rows > MAX_ROWS;
    let rows: Vec<Option<usize>> = if truncated {
        (0..EDGE_ROWS)
            .map(Some)
            .chain(std::iter::once(None))
            .chain((n_rows - EDGE_ROWS..n_rows).map(Some))
            .collect()
    } else {
        (0..n_rows).map(Some).collect()
    };

    let index: Vec<String> = rows
        .iter()
        .map(|r| r.map(|i| i.to_string()).unwrap_or_else(|| ELLIPSIS.to_string()))
        .collect();
    let index_width = index.iter().map(|s| s.chars().count()).max().unwrap_or(0);

    let mut columns: Vec<(String, Vec<String>, usize)> = Vec::with_capacity(table.n_cols());
    for col in &table.columns {
        // Decided once per column; every printed cell shares the same layout.
        let date_only = col.is_date_only();
        let cells: Vec<String> = rows
            .iter()
            .map(|r| {
                r.map(|i| col.display_cell_with(i, date_only))
                    .unwrap_or_else(|| ELLIPSIS.to_string())
            })
            .collect();
        let width = cells
            .iter()
            .map(|s| s.chars().count())
            .chain(std::iter::once(col.name.chars().count()))
            .max()
            .unwrap_or(0);
        columns.push((col.name.clone(), cells, width));
    }

    let mut out = String::new();
    out.push_str(&" ".repeat(index_width));
    for (name, _, width) in &columns {
        let width = *width;
        out.push_str(&format!("  {name:>width$}"));
    }

    for (row, idx) in index.iter().enumerate() {
        out.push('\n');
        out.push_str(&format!("{idx:<index_width$}"));
        for (_, cells, width) in &columns {
            let width = *width;
            out.push_str(&format!("  {:>width$}", cells[row]));
        }
    }

    if truncated {
        out.push_str(&format!("\n\n[{n_rows} rows x {} columns]", table.n_cols()));
    }
    out
}

/// One `name  dtype` line per column, then `dtype: object`.
pub fn format_dtypes(table: &Table) -> String {
    let dtypes = table.dtypes();
    let name_width = dtypes.iter().map(|(n, _)| n.chars().count()).max().unwrap_or(0);
    let type_width = dtypes.iter().map(|(_, d)| d.as_str().len()).max().unwrap_or(0);

    let mut out = String::new();
    for (name, dtype) in dtypes {
        out.push_str(&format!("{name:<name_width$}    {:>type_width$}\n", dtype.as_str()));
    }
    out.push_str("dtype: object");
    out
}
