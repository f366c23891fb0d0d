use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

use thiserror::Error;

use crate::sim::{FilterSample, LoopSample};

#[derive(Debug, Error)]
pub enum TraceError {
    #[error("failed to read trace: {0}")]
    Io(#[from] io::Error),

    #[error("trace is empty, expected a header row")]
    MissingHeader,

    #[error("column `{0}` not found in header")]
    MissingColumn(String),

    #[error("line {line}: cannot parse `{value}` as a number")]
    BadValue { line: usize, value: String },
}

// ---------------------------------------------------------------------------
// Writers
// ---------------------------------------------------------------------------

/// Write a filter run to CSV.
///
/// Columns: tick, measurement, estimate, covariance, gain
pub fn write_filter_trace<W: Write>(writer: &mut W, trace: &[FilterSample]) -> io::Result<()> {
    writeln!(writer, "tick,measurement,estimate,covariance,gain")?;
    for s in trace {
        writeln!(
            writer,
            "{},{:.4},{:.4},{:.6},{:.6}",
            s.tick, s.measurement, s.estimate, s.covariance, s.gain
        )?;
    }
    Ok(())
}

/// Write a closed-loop run to CSV.
///
/// Columns: tick, setpoint, output, command, process_value
pub fn write_loop_trace<W: Write>(writer: &mut W, trace: &[LoopSample]) -> io::Result<()> {
    writeln!(writer, "tick,setpoint,output,command,process_value")?;
    for s in trace {
        writeln!(
            writer,
            "{},{:.4},{:.4},{:.4},{:.4}",
            s.tick, s.setpoint, s.output, s.command, s.process_value
        )?;
    }
    Ok(())
}

pub fn write_filter_trace_file(path: &str, trace: &[FilterSample]) -> io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    write_filter_trace(&mut file, trace)
}

pub fn write_loop_trace_file(path: &str, trace: &[LoopSample]) -> io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    write_loop_trace(&mut file, trace)
}

// ---------------------------------------------------------------------------
// Reader
// ---------------------------------------------------------------------------

/// Locate the `x` and `y` columns in a header row.
fn column_indices(header: &str, x_column: &str, y_column: &str) -> Result<(usize, usize), TraceError> {
    let columns: Vec<&str> = header.split(',').map(str::trim).collect();
    let position = |name: &str| {
        columns
            .iter()
            .position(|c| *c == name)
            .ok_or_else(|| TraceError::MissingColumn(name.to_string()))
    };
    Ok((position(x_column)?, position(y_column)?))
}

/// Parse one data row. `Ok(None)` for blank or short rows.
fn parse_row(line: &str, line_no: usize, xi: usize, yi: usize) -> Result<Option<(f64, f64)>, TraceError> {
    if line.trim().is_empty() {
        return Ok(None);
    }
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    let (Some(x), Some(y)) = (fields.get(xi).copied(), fields.get(yi).copied()) else {
        log::warn!("line {}: only {} fields; skipped", line_no, fields.len());
        return Ok(None);
    };
    let parse = |v: &str| {
        v.parse::<f64>().map_err(|_| TraceError::BadValue { line: line_no, value: v.to_string() })
    };
    Ok(Some((parse(x)?, parse(y)?)))
}

/// Read `(x, y)` pairs from a logged serial stream such as `timestamp,value`.
///
/// Only the last `max_points` rows are kept. Blank lines are skipped. A row
/// too short to hold either column is skipped with a warning; a value that
/// fails to parse is an error.
pub fn read_series<R: BufRead>(
    reader: R,
    x_column: &str,
    y_column: &str,
    max_points: usize,
) -> Result<Vec<(f64, f64)>, TraceError> {
    let mut lines = reader.lines();
    let header = lines.next().ok_or(TraceError::MissingHeader)??;
    let (xi, yi) = column_indices(&header, x_column, y_column)?;

    let mut window = VecDeque::with_capacity(max_points.min(4096));
    for (idx, line) in lines.enumerate() {
        let Some(point) = parse_row(&line?, idx + 2, xi, yi)? else {
            continue;
        };
        window.push_back(point);
        if window.len() > max_points {
            window.pop_front();
        }
    }

    log::debug!("read {} points of `{}` vs `{}`", window.len(), y_column, x_column);
    Ok(window.into())
}

/// Open `path` and [`read_series`] from it.
pub fn read_series_file(
    path: &str,
    x_column: &str,
    y_column: &str,
    max_points: usize,
) -> Result<Vec<(f64, f64)>, TraceError> {
    let file = std::fs::File::open(path)?;
    read_series(io::BufReader::new(file), x_column, y_column, max_points)
}

/// Rows appended to a series since an earlier read.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesTail {
    pub points: Vec<(f64, f64)>,
    /// Data rows consumed so far; pass back as `offset` on the next read.
    pub next_offset: usize,
}

/// Read only the data rows after the first `offset`, for a file that is
/// still being appended to.
///
/// A trailing row without a newline is treated as partially written and left
/// for the next read. A file holding nothing but a partial header yields an
/// empty tail rather than an error.
pub fn read_series_from<R: BufRead>(
    mut reader: R,
    x_column: &str,
    y_column: &str,
    offset: usize,
) -> Result<SeriesTail, TraceError> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 || !line.ends_with('\n') {
        return Ok(SeriesTail { points: Vec::new(), next_offset: offset });
    }
    let (xi, yi) = column_indices(&line, x_column, y_column)?;

    let mut points = Vec::new();
    let mut row = 0;
    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 || !line.ends_with('\n') {
            break;
        }
        if row >= offset {
            if let Some(point) = parse_row(&line, row + 2, xi, yi)? {
                points.push(point);
            }
        }
        row += 1;
    }

    Ok(SeriesTail { points, next_offset: row.max(offset) })
}

/// Open `path` and [`read_series_from`] it.
pub fn read_series_from_file(
    path: &str,
    x_column: &str,
    y_column: &str,
    offset: usize,
) -> Result<SeriesTail, TraceError> {
    let file = std::fs::File::open(path)?;
    read_series_from(io::BufReader::new(file), x_column, y_column, offset)
}

/// Placeholder series for a logger that has not produced data yet:
/// `(i, i + (i % 7) * 0.5)`.
pub fn sample_series(n: usize) -> Vec<(f64, f64)> {
    (0..n)
        .map(|i| (i as f64, i as f64 + (i % 7) as f64 * 0.5))
        .collect()
}

/// Write `(x, y)` pairs under a two-column header.
pub fn write_series<W: Write>(
    writer: &mut W,
    x_column: &str,
    y_column: &str,
    points: &[(f64, f64)],
) -> io::Result<()> {
    writeln!(writer, "{},{}", x_column, y_column)?;
    for (x, y) in points {
        writeln!(writer, "{},{}", x, y)?;
    }
    Ok(())
}

pub fn write_series_file(path: &str, x_column: &str, y_column: &str, points: &[(f64, f64)]) -> io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    write_series(&mut file, x_column, y_column, points)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_csv_has_header_and_rows() {
        let trace = vec![
            FilterSample { tick: 0, measurement: 51.2, estimate: 50.81, covariance: 0.34, gain: 0.68 },
            FilterSample { tick: 1, measurement: 48.8, estimate: 49.93, covariance: 0.22, gain: 0.44 },
        ];

        let mut buf = Vec::new();
        write_filter_trace(&mut buf, &trace).unwrap();
        let output = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = output.lines().collect();

        assert!(lines[0].starts_with("tick,"));
        assert_eq!(lines.len(), 3); // header + 2 data rows
        assert!(lines[1].starts_with("0,51.2000,"));
    }

    #[test]
    fn loop_csv_columns() {
        let trace = vec![LoopSample { tick: 3, setpoint: 1000.0, output: 50.0, command: 200.0, process_value: 16.0 }];
        let mut buf = Vec::new();
        write_loop_trace(&mut buf, &trace).unwrap();
        let output = String::from_utf8(buf).unwrap();
        assert_eq!(output.lines().nth(1), Some("3,1000.0000,50.0000,200.0000,16.0000"));
    }

    #[test]
    fn read_series_picks_named_columns() {
        let data = "value,timestamp\n1.5,0\n2.5,1\n\n3.5,2\n";
        let pts = read_series(data.as_bytes(), "timestamp", "value", 100).unwrap();
        assert_eq!(pts, vec![(0.0, 1.5), (1.0, 2.5), (2.0, 3.5)]);
    }

    #[test]
    fn read_series_keeps_last_window() {
        let mut data = String::from("timestamp,value\n");
        for i in 0..10 {
            data.push_str(&format!("{},{}\n", i, i * 10));
        }
        let pts = read_series(data.as_bytes(), "timestamp", "value", 3).unwrap();
        assert_eq!(pts, vec![(7.0, 70.0), (8.0, 80.0), (9.0, 90.0)]);
    }

    #[test]
    fn read_series_skips_short_rows() {
        let data = "timestamp,value\n0,1\n1\n2,3\n";
        let pts = read_series(data.as_bytes(), "timestamp", "value", 10).unwrap();
        assert_eq!(pts.len(), 2);
    }

    #[test]
    fn read_series_reports_bad_values() {
        let data = "timestamp,value\n0,1\n1,abc\n";
        match read_series(data.as_bytes(), "timestamp", "value", 10) {
            Err(TraceError::BadValue { line, value }) => {
                assert_eq!(line, 3);
                assert_eq!(value, "abc");
            }
            other => panic!("expected BadValue, got {:?}", other),
        }
    }

    #[test]
    fn read_series_missing_column() {
        let data = "time,value\n0,1\n";
        assert!(matches!(
            read_series(data.as_bytes(), "timestamp", "value", 10),
            Err(TraceError::MissingColumn(c)) if c == "timestamp"
        ));
    }

    #[test]
    fn read_series_empty_input() {
        assert!(matches!(read_series("".as_bytes(), "t", "v", 10), Err(TraceError::MissingHeader)));
    }

    #[test]
    fn tail_returns_only_new_rows() {
        let first = "timestamp,value\n0,1.0\n1,2.0\n";
        let tail = read_series_from(first.as_bytes(), "timestamp", "value", 0).unwrap();
        assert_eq!(tail.points, vec![(0.0, 1.0), (1.0, 2.0)]);
        assert_eq!(tail.next_offset, 2);

        let grown = "timestamp,value\n0,1.0\n1,2.0\n2,3.0\n\n3,4.0\n";
        let tail = read_series_from(grown.as_bytes(), "timestamp", "value", tail.next_offset).unwrap();
        assert_eq!(tail.points, vec![(2.0, 3.0), (3.0, 4.0)]);
        // The blank row still counts as consumed
        assert_eq!(tail.next_offset, 5);
    }

    #[test]
    fn tail_leaves_partial_row_for_next_read() {
        let data = "timestamp,value\n0,1.0\n1,2";
        let tail = read_series_from(data.as_bytes(), "timestamp", "value", 0).unwrap();
        assert_eq!(tail.points, vec![(0.0, 1.0)]);
        assert_eq!(tail.next_offset, 1);

        let done = "timestamp,value\n0,1.0\n1,2.5\n";
        let tail = read_series_from(done.as_bytes(), "timestamp", "value", tail.next_offset).unwrap();
        assert_eq!(tail.points, vec![(1.0, 2.5)]);
    }

    #[test]
    fn tail_of_unchanged_file_is_empty() {
        let data = "timestamp,value\n0,1.0\n";
        let tail = read_series_from(data.as_bytes(), "timestamp", "value", 1).unwrap();
        assert!(tail.points.is_empty());
        assert_eq!(tail.next_offset, 1);
    }

    #[test]
    fn tail_of_empty_file_is_empty() {
        let tail = read_series_from("".as_bytes(), "timestamp", "value", 0).unwrap();
        assert_eq!(tail, SeriesTail { points: Vec::new(), next_offset: 0 });
    }

    #[test]
    fn sample_series_round_trips() {
        let pts = sample_series(20);
        assert_eq!(pts[8], (8.0, 8.5));
        let mut buf = Vec::new();
        write_series(&mut buf, "timestamp", "value", &pts).unwrap();
        let back = read_series(buf.as_slice(), "timestamp", "value", 100).unwrap();
        assert_eq!(back, pts);
    }
}
