//! Text → datetime conversion for a single table column.
//!
//! The format is inferred from the first non-missing value and then applied to
//! every other value, so a column mixing `2016-01-01` and `01/02/2016` does not
//! silently flip between day-first and month-first readings.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use log::{debug, warn};

use crate::domain::{ColumnData, DateErrors, Table};
use crate::error::AppError;

/// Date layouts recognised by [`to_datetime`], tried in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFormat {
    Rfc3339,
    IsoDateTimeSpace,
    IsoDateTimeT,
    IsoDate,
    SlashYmd,
    SlashMdy,
    DotDmy,
    YearMonth,
    Year,
}

impl DateFormat {
    pub const ALL: [DateFormat; 9] = [
        DateFormat::Rfc3339,
        DateFormat::IsoDateTimeSpace,
        DateFormat::IsoDateTimeT,
        DateFormat::IsoDate,
        DateFormat::SlashYmd,
        DateFormat::SlashMdy,
        DateFormat::DotDmy,
        DateFormat::YearMonth,
        DateFormat::Year,
    ];

    /// First format that accepts `s`.
    pub fn detect(s: &str) -> Option<DateFormat> {
        Self::ALL.into_iter().find(|f| f.parse(s).is_some())
    }

    /// Offsets in RFC 3339 values are folded into UTC.
    pub fn parse(self, s: &str) -> Option<NaiveDateTime> {
        match self {
            DateFormat::Rfc3339 => DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.naive_utc()),
            DateFormat::IsoDateTimeSpace => {
                NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").ok()
            }
            DateFormat::IsoDateTimeT => NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").ok(),
            DateFormat::IsoDate => date_at_midnight(s, "%Y-%m-%d"),
            DateFormat::SlashYmd => date_at_midnight(s, "%Y/%m/%d"),
            DateFormat::SlashMdy => date_at_midnight(s, "%m/%d/%Y"),
            DateFormat::DotDmy => date_at_midnight(s, "%d.%m.%Y"),
            DateFormat::YearMonth => {
                let (year, month) = s.split_once('-')?;
                if year.len() != 4 || !(1..=2).contains(&month.len()) {
                    return None;
                }
                if !all_digits(year) || !all_digits(month) {
                    return None;
                }
                NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, 1)
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            }
            DateFormat::Year => {
                if s.len() != 4 || !all_digits(s) {
                    return None;
                }
                NaiveDate::from_ymd_opt(s.parse().ok()?, 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0))
            }
        }
    }
}

fn all_digits(s: &str) -> bool {
    s.bytes().all(|b| b.is_ascii_digit())
}

fn date_at_midnight(s: &str, fmt: &str) -> Option<NaiveDateTime> {
    NaiveDate::parse_from_str(s, fmt)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Convert `column` of `table` to `datetime64[ns]` in place.
///
/// With [`DateErrors::Raise`] the first bad value aborts and the column is left
/// untouched. With [`DateErrors::Coerce`] bad values become `NaT`. Returns how
/// many values were coerced.
pub fn to_datetime(table: &mut Table, column: &str, errors: DateErrors) -> Result<usize, AppError> {
    let col = table
        .column_mut(column)
        .ok_or_else(|| AppError::new(3, format!("Column `{column}` not found in table.")))?;

    let texts = match column_as_text(&col.data, column)? {
        Some(texts) => texts,
        None => return Ok(0),
    };

    let mut format: Option<DateFormat> = None;
    let mut coerced = 0usize;
    let mut out = Vec::with_capacity(texts.len());

    for (row, value) in texts.iter().enumerate() {
        let Some(text) = value.as_deref() else {
            out.push(None);
            continue;
        };

        if format.is_none() {
            format = DateFormat::detect(text);
            if let Some(f) = format {
                debug!("column `{column}`: inferred date format {f:?} from '{text}'");
            }
        }
        let parsed = format.and_then(|f| f.parse(text));

        match (parsed, errors) {
            (Some(dt), _) => out.push(Some(dt)),
            (None, DateErrors::Coerce) => {
                coerced += 1;
                out.push(None);
            }
            (None, DateErrors::Raise) => {
                return Err(AppError::new(
                    3,
                    format!("Unable to parse '{text}' as a date in column `{column}` (row {row})."),
                ));
            }
        }
    }

    if coerced > 0 {
        warn!("column `{column}`: {coerced} unparsable value(s) set to NaT");
    }
    col.data = ColumnData::DateTime(out);
    Ok(coerced)
}

/// Text view of a column for parsing; `None` when it is already datetime.
fn column_as_text(
    data: &ColumnData,
    column: &str,
) -> Result<Option<Vec<Option<String>>>, AppError> {
    let texts = match data {
        ColumnData::DateTime(_) => return Ok(None),
        ColumnData::Object(v) => v.clone(),
        ColumnData::Int64(v) => v.iter().map(|x| Some(x.to_string())).collect(),
        ColumnData::Float64(v) => v
            .iter()
            .map(|x| {
                if x.is_nan() {
                    None
                } else if x.fract() == 0.0 && x.is_finite() {
                    Some(format!("{}", *x as i64))
                } else {
                    Some(x.to_string())
                }
            })
            .collect(),
        ColumnData::Bool(_) => {
            return Err(AppError::new(
                3,
                format!("Column `{column}` is boolean and cannot be converted to dates."),
            ));
        }
    };
    Ok(Some(texts))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Column, DType};

    fn text_table(values: &[Option<&str>]) -> Table {
        Table::new(vec![Column::new(
            "Date",
            ColumnData::Object(values.iter().map(|v| v.map(str::to_string)).collect()),
        )])
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(0, 0, 0).unwrap()
    }

    #[test]
    fn iso_dates_become_datetimes() {
        let mut table = text_table(&[Some("2016-01-01"), Some("2016-02-01"), None]);
        let coerced = to_datetime(&mut table, "Date", DateErrors::Raise).unwrap();
        assert_eq!(coerced, 0);

        let col = table.column("Date").unwrap();
        assert_eq!(col.dtype(), DType::DateTime);
        assert_eq!(
            col.data,
            ColumnData::DateTime(vec![Some(ymd(2016, 1, 1)), Some(ymd(2016, 2, 1)), None])
        );
    }

    #[test]
    fn one_bad_value_fails_whole_column() {
        let mut table = text_table(&[Some("2016-01-01"), Some("not-a-date"), Some("2016-03-01")]);
        let before = table.clone();

        let err = to_datetime(&mut table, "Date", DateErrors::Raise).unwrap_err();
        assert_eq!(err.exit_code(), 3);
        assert!(err.message().contains("not-a-date"));
        assert!(err.message().contains("row 1"));
        assert_eq!(table, before);
    }

    #[test]
    fn coerce_turns_bad_values_into_nat() {
        let mut table = text_table(&[Some("garbage"), Some("2016-01"), Some("2016-13")]);
        let coerced = to_datetime(&mut table, "Date", DateErrors::Coerce).unwrap();
        assert_eq!(coerced, 2);
        assert_eq!(
            table.column("Date").unwrap().data,
            ColumnData::DateTime(vec![None, Some(ymd(2016, 1, 1)), None])
        );
    }

    #[test]
    fn format_is_fixed_by_first_value() {
        // Month-first is inferred; a later ISO value does not match it.
        let mut table = text_table(&[Some("01/02/2016"), Some("2016-01-03")]);
        assert!(to_datetime(&mut table, "Date", DateErrors::Raise).is_err());
    }

    #[test]
    fn detects_common_layouts() {
        assert_eq!(DateFormat::detect("2016-12-06"), Some(DateFormat::IsoDate));
        assert_eq!(DateFormat::detect("2016-12"), Some(DateFormat::YearMonth));
        assert_eq!(DateFormat::detect("1880"), Some(DateFormat::Year));
        assert_eq!(DateFormat::detect("2016-12-06T10:00:00"), Some(DateFormat::IsoDateTimeT));
        assert_eq!(DateFormat::detect("2016-12-06T10:00:00+02:00"), Some(DateFormat::Rfc3339));
        assert_eq!(DateFormat::detect("06.12.2016"), Some(DateFormat::DotDmy));
        assert_eq!(DateFormat::detect("not-a-date"), None);
    }

    #[test]
    fn year_month_rejects_signed_parts() {
        assert_eq!(DateFormat::YearMonth.parse("2016-+1"), None);
        assert_eq!(DateFormat::YearMonth.parse("+201-01"), None);
        assert_eq!(DateFormat::YearMonth.parse("2016--1"), None);
        assert_eq!(DateFormat::YearMonth.parse("2016-1"), Some(ymd(2016, 1, 1)));
        assert_eq!(DateFormat::detect("2016-+1"), None);
        assert_eq!(DateFormat::Year.parse("+201"), None);
    }

    #[test]
    fn integer_years_convert() {
        let mut table = Table::new(vec![Column::new("Year", ColumnData::Int64(vec![1880, 1881]))]);
        to_datetime(&mut table, "Year", DateErrors::Raise).unwrap();
        assert_eq!(
            table.column("Year").unwrap().data,
            ColumnData::DateTime(vec![Some(ymd(1880, 1, 1)), Some(ymd(1881, 1, 1))])
        );
    }

    #[test]
    fn missing_column_is_an_error() {
        let mut table = text_table(&[Some("2016-01-01")]);
        let err = to_datetime(&mut table, "When", DateErrors::Raise).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}
