//! CSV ingest and column type inference.
//!
//! Turns a CSV body into a `Table`:
//! - header cleanup (BOM, blanks, duplicates)
//! - short rows are padded with missing values, long rows are an error
//! - each column is typed independently: `int64` > `float64` > `bool` > `object`

use std::collections::HashMap;

use csv::StringRecord;
use log::debug;

use crate::domain::{Column, ColumnData, Table};
use crate::error::AppError;

/// Cell texts read as missing values.
const NA_VALUES: [&str; 9] = ["", "NA", "N/A", "NaN", "nan", "null", "NULL", "#N/A", "n/a"];

/// Parse a CSV document into a typed table.
pub fn read_csv_str(text: &str) -> Result<Table, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(3, format!("Failed to read CSV headers: {e}")))?
        .clone();
    let names = clean_headers(&headers);
    if names.is_empty() {
        return Err(AppError::new(3, "CSV has no columns."));
    }

    let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); names.len()];
    for (idx, result) in reader.records().enumerate() {
        // records() starts on the line after the header; CSV lines are 1-based.
        let line = idx + 2;
        let record = result
            .map_err(|e| AppError::new(3, format!("CSV parse error on line {line}: {e}")))?;
        if record.len() > names.len() {
            return Err(AppError::new(
                3,
                format!(
                    "CSV line {line}: expected {} fields, saw {}.",
                    names.len(),
                    record.len()
                ),
            ));
        }
        for (col, values) in cells.iter_mut().enumerate() {
            values.push(record.get(col).and_then(non_missing));
        }
    }

    let columns: Vec<Column> = names
        .into_iter()
        .zip(cells)
        .map(|(name, values)| {
            let data = infer_column(values);
            debug!("column '{name}' inferred as {}", data.dtype());
            Column::new(name, data)
        })
        .collect();

    Ok(Table::new(columns))
}

fn clean_headers(headers: &StringRecord) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    headers
        .iter()
        .enumerate()
        .map(|(idx, raw)| {
            let mut name = normalize_header_name(raw);
            if name.is_empty() {
                name = format!("Unnamed: {idx}");
            }
            let count = seen.entry(name.clone()).or_insert(0);
            let unique = if *count == 0 {
                name.clone()
            } else {
                format!("{name}.{count}")
            };
            *count += 1;
            unique
        })
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // UTF-8 exports from spreadsheet tools can carry a BOM on the first header,
    // which would otherwise make `Date` unreachable by name.
    name.trim().trim_start_matches('\u{feff}').to_string()
}

fn non_missing(cell: &str) -> Option<String> {
    if NA_VALUES.contains(&cell) {
        None
    } else {
        Some(cell.to_string())
    }
}

/// Pick the narrowest column type every non-missing value fits.
fn infer_column(values: Vec<Option<String>>) -> ColumnData {
    if values.is_empty() {
        return ColumnData::Object(values);
    }
    let has_missing = values.iter().any(Option::is_none);

    if !has_missing {
        if let Some(ints) = values
            .iter()
            .map(|v| v.as_deref().and_then(|s| s.parse::<i64>().ok()))
            .collect::<Option<Vec<_>>>()
        {
            return ColumnData::Int64(ints);
        }
    }

    let floats: Option<Vec<f64>> = values
        .iter()
        .map(|v| match v.as_deref() {
            None => Some(f64::NAN),
            Some(s) => s.parse::<f64>().ok(),
        })
        .collect();
    if let Some(floats) = floats {
        return ColumnData::Float64(floats);
    }

    if !has_missing {
        if let Some(bools) = values
            .iter()
            .map(|v| v.as_deref().and_then(parse_bool))
            .collect::<Option<Vec<_>>>()
        {
            return ColumnData::Bool(bools);
        }
    }

    ColumnData::Object(values)
}

fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "True" | "true" | "TRUE" => Some(true),
        "False" | "false" | "FALSE" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DType;

    #[test]
    fn infers_column_types() {
        let table = read_csv_str(
            "Source,Date,Mean,Count,Flag\n\
             GCAG,2016-12-06,0.7895,3,true\n\
             GISTEMP,2016-12-06,,4,false\n",
        )
        .unwrap();

        assert_eq!(table.n_rows(), 2);
        let dtypes: Vec<DType> = table.dtypes().into_iter().map(|(_, d)| d).collect();
        assert_eq!(
            dtypes,
            vec![DType::Object, DType::Object, DType::Float64, DType::Int64, DType::Bool]
        );
        match &table.column("Mean").unwrap().data {
            ColumnData::Float64(v) => {
                assert!((v[0] - 0.7895).abs() < 1e-12);
                assert!(v[1].is_nan());
            }
            other => panic!("unexpected column data: {other:?}"),
        }
    }

    #[test]
    fn ints_with_gaps_become_floats() {
        let table = read_csv_str("Year,Mean\n1880,1\n1881,\n").unwrap();
        assert_eq!(table.column("Year").unwrap().dtype(), DType::Int64);
        assert_eq!(table.column("Mean").unwrap().dtype(), DType::Float64);
    }

    #[test]
    fn headers_are_cleaned() {
        let table = read_csv_str("\u{feff}Date,,Date\n2016-01,a,b\n").unwrap();
        let names: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Date", "Unnamed: 1", "Date.1"]);
    }

    #[test]
    fn short_rows_pad_and_long_rows_fail() {
        let table = read_csv_str("a,b\n1\n2,x\n").unwrap();
        assert_eq!(table.column("b").unwrap().display_cell(0), "NaN");

        let err = read_csv_str("a,b\n1,2,3\n").unwrap_err();
        assert_eq!(err.exit_code(), 3);
        assert!(err.message().contains("line 2"));
    }

    #[test]
    fn header_only_csv_yields_empty_object_columns() {
        let table = read_csv_str("Date,Mean\n").unwrap();
        assert_eq!(table.n_rows(), 0);
        assert_eq!(table.column("Mean").unwrap().dtype(), DType::Object);
    }
}
