use chrono::NaiveDateTime;
use csv::StringRecord;
use std::collections::HashMap;

use crate::error::DecodeError;

/// Accepted CSV timestamp layout, fractional seconds optional
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Case-insensitive header name -> column position
#[derive(Debug, Clone, Default)]
pub struct HeaderIndex {
    positions: HashMap<String, usize>,
}

impl HeaderIndex {
    pub fn new(headers: &StringRecord) -> Self {
        let mut positions = HashMap::new();
        for (idx, name) in headers.iter().enumerate() {
            // First occurrence wins on repeated headers
            positions.entry(name.trim().to_lowercase()).or_insert(idx);
        }
        Self { positions }
    }

    pub fn position(&self, column: &str) -> Option<usize> {
        self.positions.get(&column.to_lowercase()).copied()
    }
}

/// One CSV record viewed through its file's header
pub struct CsvRow<'a> {
    headers: &'a HeaderIndex,
    record: &'a StringRecord,
}

impl<'a> CsvRow<'a> {
    pub fn new(headers: &'a HeaderIndex, record: &'a StringRecord) -> Self {
        Self { headers, record }
    }

    /// Raw field, `None` when the header lacks the column or the row is short
    pub fn get(&self, column: &str) -> Option<&'a str> {
        self.headers
            .position(column)
            .and_then(|idx| self.record.get(idx))
    }

    fn require(&self, column: &'static str) -> Result<&'a str, DecodeError> {
        self.get(column)
            .ok_or(DecodeError::MissingColumn { column })
    }

    pub fn text(&self, column: &'static str) -> Result<String, DecodeError> {
        self.require(column).map(str::to_string)
    }

    pub fn int(&self, column: &'static str) -> Result<i32, DecodeError> {
        parse_int(column, self.require(column)?)
    }

    pub fn real(&self, column: &'static str) -> Result<f64, DecodeError> {
        let value = self.require(column)?;
        value
            .parse::<f64>()
            .map_err(|_| DecodeError::MalformedNumber {
                column,
                value: value.to_string(),
            })
    }

    pub fn timestamp(&self, column: &'static str) -> Result<NaiveDateTime, DecodeError> {
        let value = self.require(column)?;
        NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT).map_err(|_| {
            DecodeError::MalformedTimestamp {
                column,
                value: value.to_string(),
            }
        })
    }

    /// Nullable foreign key: empty or absent means no reference
    pub fn nullable_int(&self, column: &'static str) -> Result<Option<i32>, DecodeError> {
        match self.get(column) {
            None | Some("") => Ok(None),
            Some(value) => parse_int(column, value).map(Some),
        }
    }
}

fn parse_int(column: &'static str, value: &str) -> Result<i32, DecodeError> {
    value
        .parse::<i32>()
        .map_err(|_| DecodeError::MalformedNumber {
            column,
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record(fields: &[&str]) -> StringRecord {
        StringRecord::from(fields.to_vec())
    }

    #[test]
    fn test_header_lookup_ignores_case() {
        let headers = HeaderIndex::new(&record(&["ID", "Nombre"]));
        assert_eq!(headers.position("id"), Some(0));
        assert_eq!(headers.position("nombre"), Some(1));
        assert_eq!(headers.position("dinero"), None);
    }

    #[test]
    fn test_numbers_parse_strictly() {
        let headers = HeaderIndex::new(&record(&["puntos", "dinero", "nivel"]));
        let rec = record(&["5", "100.5", "1.0"]);
        let row = CsvRow::new(&headers, &rec);

        assert_eq!(row.int("puntos").unwrap(), 5);
        assert_eq!(row.real("dinero").unwrap(), 100.5);
        assert_eq!(
            row.int("nivel").unwrap_err(),
            DecodeError::MalformedNumber {
                column: "nivel",
                value: "1.0".to_string()
            }
        );
    }

    #[test]
    fn test_missing_column() {
        let headers = HeaderIndex::new(&record(&["id"]));
        let rec = record(&["1"]);
        let row = CsvRow::new(&headers, &rec);
        assert_eq!(
            row.text("nombre").unwrap_err(),
            DecodeError::MissingColumn { column: "nombre" }
        );
    }

    #[test]
    fn test_short_row_reports_missing_column() {
        let headers = HeaderIndex::new(&record(&["id", "nombre"]));
        let rec = record(&["1"]);
        let row = CsvRow::new(&headers, &rec);
        assert!(matches!(
            row.text("nombre"),
            Err(DecodeError::MissingColumn { column: "nombre" })
        ));
    }

    #[test]
    fn test_nullable_int() {
        let headers = HeaderIndex::new(&record(&["a", "b", "c"]));
        let rec = record(&["", "7", "x"]);
        let row = CsvRow::new(&headers, &rec);

        assert_eq!(row.nullable_int("a").unwrap(), None);
        assert_eq!(row.nullable_int("b").unwrap(), Some(7));
        assert!(row.nullable_int("c").is_err());
        // Column not in the header at all
        assert_eq!(row.nullable_int("d").unwrap(), None);
    }

    #[test]
    fn test_timestamp() {
        let headers = HeaderIndex::new(&record(&["t", "u", "v"]));
        let rec = record(&["2024-05-01 10:30:00", "2024-05-01 10:30:00.250", "01/05/2024"]);
        let row = CsvRow::new(&headers, &rec);

        let expected = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(10, 30, 0)
            .unwrap();
        assert_eq!(row.timestamp("t").unwrap(), expected);
        assert_eq!(
            row.timestamp("u").unwrap(),
            expected + chrono::Duration::milliseconds(250)
        );
        assert!(matches!(
            row.timestamp("v"),
            Err(DecodeError::MalformedTimestamp { column: "v", .. })
        ));
    }
}
