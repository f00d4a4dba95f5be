//! CSV input and output for sensor readings.
//!
//! Readings are UTF-8, comma-separated, one reading per row. The first row is
//! treated as a header if any of its cells is non-empty and non-numeric.
//! Empty cells are missing values and read as `NaN`.

use std::io::{Read, Write};

use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use ndarray::Array2;
use tracing::debug;

use crate::error::ReadingsError;

/// Parsed readings plus the header, when one was present.
#[derive(Debug, Clone)]
pub struct Readings {
    pub header: Option<Vec<String>>,
    pub values: Array2<f64>,
}

fn is_header(record: &StringRecord) -> bool {
    record.iter().any(|c| {
        let t = c.trim();
        !t.is_empty() && t.parse::<f64>().is_err()
    })
}

fn parse_cell(cell: &str, row: usize) -> Result<f64, ReadingsError> {
    let t = cell.trim();
    if t.is_empty() {
        return Ok(f64::NAN);
    }
    t.parse::<f64>().map_err(|_| ReadingsError::NotANumber { row, value: cell.to_owned() })
}

pub fn read_readings<R: Read>(reader: R) -> Result<Readings, ReadingsError> {
    let mut csv = ReaderBuilder::new().has_headers(false).flexible(true).from_reader(reader);

    let mut header = None;
    let mut flat = Vec::new();
    let mut width = None;
    let mut rows = 0;

    for (idx, result) in csv.records().enumerate() {
        let record = result?;
        let row = idx + 1;
        if idx == 0 && is_header(&record) {
            header = Some(record.iter().map(|c| c.trim().to_owned()).collect());
            continue;
        }
        if record.iter().all(|c| c.trim().is_empty()) {
            continue;
        }
        let expected = *width.get_or_insert(record.len());
        if record.len() != expected {
            return Err(ReadingsError::Ragged { row, expected, actual: record.len() });
        }
        for cell in record.iter() {
            flat.push(parse_cell(cell, row)?);
        }
        rows += 1;
    }

    let cols = width.ok_or(ReadingsError::Empty)?;
    let values = Array2::from_shape_vec((rows, cols), flat)
        .map_err(|e| ReadingsError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;
    debug!(rows, cols, header = header.is_some(), "read readings");
    Ok(Readings { header, values })
}

pub fn read_readings_file(path: impl AsRef<std::path::Path>) -> Result<Readings, ReadingsError> {
    read_readings(std::fs::File::open(path)?)
}

/// Writes one row per sample with columns `f0..fN`. `NaN` is written as an
/// empty cell so the output reads back the same way.
pub fn write_features<W: Write>(writer: W, features: &Array2<f64>) -> Result<(), ReadingsError> {
    let mut csv = WriterBuilder::new().from_writer(writer);
    let header: Vec<String> = (0..features.ncols()).map(|i| format!("f{}", i)).collect();
    csv.write_record(&header)?;
    for row in features.rows() {
        csv.write_record(row.iter().map(|v| if v.is_nan() { String::new() } else { v.to_string() }))?;
    }
    csv.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_header_is_detected() {
        let data = "ph1,ph2,ph3\n1,2,3\n4,,6\n";
        let readings = read_readings(data.as_bytes()).unwrap();
        assert_eq!(readings.header, Some(vec!["ph1".into(), "ph2".into(), "ph3".into()]));
        assert_eq!(readings.values.dim(), (2, 3));
        assert!(readings.values[[1, 1]].is_nan());
        assert_eq!(readings.values[[1, 2]], 6.0);
    }

    #[test]
    fn test_headerless_input() {
        let readings = read_readings("1.5,2\n3,-4e1\n".as_bytes()).unwrap();
        assert!(readings.header.is_none());
        assert_eq!(readings.values, array![[1.5, 2.0], [3.0, -40.0]]);
    }

    #[test]
    fn test_quoted_cells() {
        let readings = read_readings("\"a,b\",c\n\"1\",2\n".as_bytes()).unwrap();
        assert_eq!(readings.header.unwrap()[0], "a,b");
        assert_eq!(readings.values, array![[1.0, 2.0]]);
    }

    #[test]
    fn test_bad_cell_reports_row() {
        let err = read_readings("1,2\n3,x\n".as_bytes()).unwrap_err();
        assert!(matches!(err, ReadingsError::NotANumber { row: 2, .. }));
    }

    #[test]
    fn test_ragged_rows() {
        let err = read_readings("1,2\n3\n".as_bytes()).unwrap_err();
        assert!(matches!(err, ReadingsError::Ragged { expected: 2, actual: 1, .. }));
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(read_readings("a,b\n".as_bytes()), Err(ReadingsError::Empty)));
    }

    #[test]
    fn test_write_features() {
        let mut out = Vec::new();
        write_features(&mut out, &array![[1.0, f64::NAN], [0.5, 2.0]]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "f0,f1\n1,\n0.5,2\n");
    }
}
