//! Plain-text landmark frame streams for the command-line front end.
//!
//! One frame per line holding 136 whitespace-separated numbers
//! `x0 y0 x1 y1 ... x67 y67`. A line containing only `-` is a frame without
//! detection. Blank lines and lines starting with `#` are skipped.

use crate::{constants::MEASUREMENT_DIM, landmarks::LandmarkSet, Error, Result};
use std::io::{BufRead, Write};

/// Marker for a frame in which the detector found nothing
pub const MISSING_FRAME_MARKER: &str = "-";

/// Parse one frame line
///
/// Returns `Ok(None)` for a missing-detection frame.
///
/// # Errors
///
/// Returns a parse error naming `line_number` if a value is not a number or
/// the line does not hold exactly 136 values
pub fn parse_frame(line: &str, line_number: usize) -> Result<Option<LandmarkSet>> {
    let trimmed = line.trim();
    if trimmed == MISSING_FRAME_MARKER {
        return Ok(None);
    }

    let values = trimmed
        .split_whitespace()
        .map(|token| {
            token.parse::<f64>().map_err(|e| Error::ParseError {
                line: line_number,
                message: format!("'{token}' is not a number: {e}"),
            })
        })
        .collect::<Result<Vec<f64>>>()?;

    if values.len() != MEASUREMENT_DIM {
        return Err(Error::ParseError {
            line: line_number,
            message: format!("expected {MEASUREMENT_DIM} values, found {}", values.len()),
        });
    }

    LandmarkSet::from_interleaved(&values).map(Some)
}

/// Read every frame from a reader
///
/// # Errors
///
/// Returns an I/O error if reading fails or a parse error for the first bad line
pub fn read_frames<R: BufRead>(reader: R) -> Result<Vec<Option<LandmarkSet>>> {
    let mut frames = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        frames.push(parse_frame(trimmed, index + 1)?);
    }
    Ok(frames)
}

/// Format a landmark set as one frame line (without newline)
#[must_use]
pub fn format_frame(set: &LandmarkSet) -> String {
    set.to_interleaved()
        .iter()
        .map(f64::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Write a landmark set as one frame line
///
/// # Errors
///
/// Returns an I/O error if the write fails
pub fn write_frame<W: Write>(writer: &mut W, set: &LandmarkSet) -> Result<()> {
    writeln!(writer, "{}", format_frame(set))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::NUM_FACIAL_LANDMARKS;
    use std::io::Cursor;

    fn frame_line(offset: f64) -> String {
        (0..MEASUREMENT_DIM)
            .map(|i| (offset + i as f64).to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn test_parse_frame() {
        let set = parse_frame(&frame_line(0.5), 1).unwrap().unwrap();
        assert_eq!(set[0].x, 0.5);
        assert_eq!(set[0].y, 1.5);
        assert_eq!(set[NUM_FACIAL_LANDMARKS - 1].y, 135.5);
    }

    #[test]
    fn test_parse_missing_frame() {
        assert!(parse_frame(" - ", 4).unwrap().is_none());
    }

    #[test]
    fn test_parse_errors_report_line() {
        match parse_frame("1 2 3", 9) {
            Err(Error::ParseError { line, message }) => {
                assert_eq!(line, 9);
                assert!(message.contains("expected 136"));
            }
            other => panic!("Expected ParseError, got {other:?}"),
        }

        let mut bad = frame_line(0.0);
        bad.push_str(" x");
        assert!(matches!(parse_frame(&bad, 2), Err(Error::ParseError { line: 2, .. })));
    }

    #[test]
    fn test_read_frames_skips_comments() {
        let input = format!("# header\n{}\n\n-\n{}\n", frame_line(0.0), frame_line(1.0));
        let frames = read_frames(Cursor::new(input)).unwrap();
        assert_eq!(frames.len(), 3);
        assert!(frames[0].is_some());
        assert!(frames[1].is_none());
        assert_eq!(frames[2].as_ref().unwrap()[0].x, 1.0);
    }

    #[test]
    fn test_write_then_read() {
        let set = parse_frame(&frame_line(-3.25), 1).unwrap().unwrap();
        let mut buffer = Vec::new();
        write_frame(&mut buffer, &set).unwrap();

        let frames = read_frames(Cursor::new(buffer)).unwrap();
        assert_eq!(frames, vec![Some(set)]);
    }
}
