use crate::error::{CliError, Result};
use nalgebra::Point3;
use phasegrid::core::models::cell::SimulationCell;
use std::path::Path;
use tracing::debug;

/// One trajectory frame: positions, one scalar value per atom, and the
/// orthorhombic box the frame was recorded in.
#[derive(Debug, Clone)]
pub struct Frame {
    pub step: u64,
    pub cell: SimulationCell,
    pub positions: Vec<Point3<f64>>,
    pub values: Vec<f64>,
}

/// Reads an XYZ-like trajectory carrying one scalar value per atom.
///
/// Per frame: an atom-count line, a comment line containing
/// `box: <lx> <ly> <lz>` (and optionally `step: <n>`), then one
/// `name x y z value` record per atom. Frames without an explicit step are
/// numbered consecutively.
pub fn read_frames(path: &Path) -> Result<Vec<Frame>> {
    let text = std::fs::read_to_string(path).map_err(|e| CliError::FileParsing {
        path: path.to_path_buf(),
        source: e.into(),
    })?;
    parse_frames(&text).map_err(|e| CliError::FileParsing {
        path: path.to_path_buf(),
        source: e,
    })
}

fn parse_frames(text: &str) -> std::result::Result<Vec<Frame>, anyhow::Error> {
    let mut lines = text.lines().enumerate().filter(|(_, l)| !l.trim().is_empty());
    let mut frames = Vec::new();

    while let Some((lineno, header)) = lines.next() {
        let natoms: usize = header
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("line {}: expected atom count, got '{}'", lineno + 1, header.trim()))?;

        let (comment_lineno, comment) = lines
            .next()
            .ok_or_else(|| anyhow::anyhow!("unexpected end of file: missing comment line"))?;
        let (cell, step) = parse_comment(comment)
            .map_err(|e| anyhow::anyhow!("line {}: {}", comment_lineno + 1, e))?;
        let step = step.unwrap_or(frames.len() as u64);

        let mut positions = Vec::with_capacity(natoms);
        let mut values = Vec::with_capacity(natoms);
        for _ in 0..natoms {
            let (record_lineno, record) = lines.next().ok_or_else(|| {
                anyhow::anyhow!("unexpected end of file: frame needs {} atom records", natoms)
            })?;
            let fields: Vec<&str> = record.split_whitespace().collect();
            if fields.len() != 5 {
                return Err(anyhow::anyhow!(
                    "line {}: expected 'name x y z value', got '{}'",
                    record_lineno + 1,
                    record.trim()
                ));
            }
            let mut numbers = [0.0; 4];
            for (slot, field) in numbers.iter_mut().zip(&fields[1..]) {
                *slot = field.parse().map_err(|_| {
                    anyhow::anyhow!("line {}: '{}' is not a number", record_lineno + 1, field)
                })?;
            }
            positions.push(Point3::new(numbers[0], numbers[1], numbers[2]));
            values.push(numbers[3]);
        }

        frames.push(Frame {
            step,
            cell,
            positions,
            values,
        });
    }

    debug!("Parsed {} trajectory frames", frames.len());
    Ok(frames)
}

fn parse_comment(comment: &str) -> std::result::Result<(SimulationCell, Option<u64>), anyhow::Error> {
    let tokens: Vec<&str> = comment.split_whitespace().collect();
    let mut lengths = None;
    let mut step = None;
    let mut i = 0;
    while i < tokens.len() {
        match tokens[i] {
            "box:" => {
                let rest = tokens.get(i + 1..i + 4).ok_or_else(|| {
                    anyhow::anyhow!("'box:' must be followed by three lengths")
                })?;
                let mut parsed = [0.0; 3];
                for (slot, token) in parsed.iter_mut().zip(rest) {
                    *slot = token
                        .parse()
                        .map_err(|_| anyhow::anyhow!("bad box length '{}'", token))?;
                }
                lengths = Some(parsed);
                i += 4;
            }
            "step:" => {
                let token = tokens
                    .get(i + 1)
                    .ok_or_else(|| anyhow::anyhow!("'step:' must be followed by a number"))?;
                step = Some(
                    token
                        .parse()
                        .map_err(|_| anyhow::anyhow!("bad step number '{}'", token))?,
                );
                i += 2;
            }
            _ => i += 1,
        }
    }
    let lengths = lengths.ok_or_else(|| anyhow::anyhow!("comment line carries no 'box:' entry"))?;
    Ok((SimulationCell::orthorhombic(lengths), step))
}

#[cfg(test)]
mod tests {
    use super::*;
    use phasegrid::core::models::cell::Axis;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const TRAJ: &str = "\
2
frame step: 10 box: 10.0 10.0 10.0
Ar 1.0 2.0 3.0 0.5
Ar 4.0 5.0 6.0 -0.5
2
box: 10.0 10.0 10.0
Ar 1.1 2.1 3.1 0.6
Ar 4.1 5.1 6.1 -0.6
";

    fn write_temp(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn two_frame_trajectory_parses_completely() {
        let file = write_temp(TRAJ);
        let frames = read_frames(file.path()).unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].step, 10);
        assert_eq!(frames[1].step, 1); // no step: falls back to the frame index
        assert_eq!(frames[0].positions.len(), 2);
        assert_eq!(frames[0].values, vec![0.5, -0.5]);
        assert_eq!(frames[0].cell.extent(Axis::X), 10.0);
    }

    #[test]
    fn missing_box_entry_is_an_error() {
        let file = write_temp("1\njust a comment\nAr 0.0 0.0 0.0 1.0\n");
        let err = read_frames(file.path()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse file"));
    }

    #[test]
    fn malformed_atom_record_reports_the_line() {
        let file = write_temp("1\nbox: 5 5 5\nAr 0.0 zero 0.0 1.0\n");
        let err = read_frames(file.path()).unwrap_err();
        assert!(err.to_string().contains("not a number"));
    }

    #[test]
    fn truncated_frame_is_an_error() {
        let file = write_temp("3\nbox: 5 5 5\nAr 0.0 0.0 0.0 1.0\n");
        assert!(read_frames(file.path()).is_err());
    }
}
