//! Reader for `.jgw` world files.
//!
//! A world file georeferences a companion JPEG with six float lines:
//! pixel scale, rotation terms, and the map coordinates of the upper-left
//! pixel. Some ground-segment exports use a comma as the decimal
//! separator, so the first comma of a line is accepted as a decimal
//! point.

use serde::Serialize;

use crate::error::{ExtractError, Result};

/// The six georeferencing parameters of one world file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WorldFile {
    /// Pixel size in the x direction.
    pub scale_x: f64,
    /// Rotation about the y axis.
    pub rotation_y: f64,
    /// Rotation about the x axis.
    pub rotation_x: f64,
    /// Pixel size in the y direction (typically negative).
    pub scale_y: f64,
    /// X map coordinate of the upper-left pixel center.
    pub upper_left_x: f64,
    /// Y map coordinate of the upper-left pixel center.
    pub upper_left_y: f64,
}

/// Parses world-file bytes.
///
/// # Errors
///
/// Returns [`ExtractError::WorldFile`] unless the content is exactly six
/// parseable float lines (ignoring trailing blank lines).
pub fn parse(name: &str, bytes: &[u8]) -> Result<WorldFile> {
    let text = String::from_utf8_lossy(bytes);
    let mut lines: Vec<&str> = text.lines().collect();
    while lines.last().is_some_and(|line| line.trim().is_empty()) {
        lines.pop();
    }

    if lines.len() != 6 {
        return Err(ExtractError::WorldFile(format!(
            "'{name}' must have 6 lines, found {}",
            lines.len()
        )));
    }

    let mut values = [0f64; 6];
    for (index, line) in lines.iter().enumerate() {
        let cleaned = line.trim().replacen(',', ".", 1);
        values[index] = cleaned.parse::<f64>().map_err(|_| {
            ExtractError::WorldFile(format!("'{name}': invalid value '{}'", line.trim()))
        })?;
    }

    Ok(WorldFile {
        scale_x: values[0],
        rotation_y: values[1],
        rotation_x: values[2],
        scale_y: values[3],
        upper_left_x: values[4],
        upper_left_y: values[5],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_six_lines() {
        let wf = parse(
            "frame.jgw",
            b"30.0\n0.0\n0.0\n-30.0\n553785.0\n6432315.0\n",
        )
        .unwrap();
        assert_eq!(wf.scale_x, 30.0);
        assert_eq!(wf.scale_y, -30.0);
        assert_eq!(wf.upper_left_x, 553785.0);
    }

    #[test]
    fn test_comma_decimal_separator() {
        let wf = parse("frame.jgw", b"30,5\n0\n0\n-30,5\n1,25\n2,75\n").unwrap();
        assert_eq!(wf.scale_x, 30.5);
        assert_eq!(wf.upper_left_y, 2.75);
    }

    #[test]
    fn test_wrong_line_count_is_rejected() {
        let err = parse("frame.jgw", b"1\n2\n3\n").unwrap_err();
        assert!(err.to_string().contains("6 lines"));
    }

    #[test]
    fn test_invalid_float_is_rejected() {
        let err = parse("frame.jgw", b"a\n0\n0\n-1\n0\n0\n").unwrap_err();
        assert!(err.to_string().contains("invalid value"));
    }
}
