//! CSV export of day curves.

use crate::{Point, Result};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow {
    minute: i32,
    time: String,
    value: f64,
    is_real: bool,
    real_value: Option<f64>,
}

impl From<&Point> for CsvRow {
    fn from(point: &Point) -> Self {
        CsvRow {
            minute: point.minute,
            time: point.time_label(),
            value: point.value,
            is_real: point.is_real,
            real_value: point.real_value,
        }
    }
}

/// Write a curve as CSV (with headers) to any writer
pub fn write_curve_csv<W: Write>(points: &[Point], writer: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    write_rows(&mut writer, points)?;
    writer.flush()?;
    Ok(())
}

fn write_rows<W: Write>(writer: &mut csv::Writer<W>, points: &[Point]) -> Result<()> {
    for point in points {
        writer.serialize(CsvRow::from(point))?;
    }
    Ok(())
}

/// Export a curve to a CSV file, replacing any existing file
///
/// The file is synced to disk before returning.
pub fn export_curve_csv(points: &[Point], path: &Path) -> Result<usize> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    write_rows(&mut writer, points)?;
    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    file.sync_all()?;

    tracing::info!("Exported {} curve points to {:?}", points.len(), path);
    Ok(points.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{generate_day_curve, Event, Profile};

    fn sample_curve() -> Vec<Point> {
        let events = vec![
            Event::glucose("2024-01-15T23:00:00", 100.0),
            Event::glucose("2024-01-15T23:30:00", 140.0),
        ];
        generate_day_curve(&events, &Profile::default(), 15)
    }

    #[test]
    fn test_write_curve_csv() {
        let mut buf = Vec::new();
        write_curve_csv(&sample_curve(), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "minute,time,value,is_real,real_value");
        assert_eq!(lines[1], "1380,23:00,100.0,true,100.0");
        assert_eq!(lines[2], "1395,23:15,120.0,false,");
        assert_eq!(lines.len(), 6);
    }

    #[test]
    fn test_export_curve_csv_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("out").join("curve.csv");

        let count = export_curve_csv(&sample_curve(), &path).unwrap();
        assert_eq!(count, 5);

        let reader = csv::Reader::from_path(&path).unwrap();
        assert_eq!(reader.into_records().count(), 5);
    }

    #[test]
    fn test_export_empty_curve() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("curve.csv");
        assert_eq!(export_curve_csv(&[], &path).unwrap(), 0);
        assert!(path.exists());
    }
}
