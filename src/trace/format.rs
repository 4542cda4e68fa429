//! Line-oriented trace file codec.
//!
//! ```text
//! line 1:          "row,col"    starting coordinate
//! lines 2..N+1:    U|D|L|R      one movement command per tick
//! lines N+2..2N+1: N|H|T        one terrain reading per tick
//! ```
//!
//! The length N is not self-described; it is fixed by the configured
//! round count at load time. Any unexpected token aborts the parse with
//! its line number; bad lines are never skipped.

use crate::core::{CellCoord, MoveCommand, TerrainReading};

use super::{Trace, TraceError, TraceStep};

pub(super) fn serialize(trace: &Trace) -> String {
    let mut out = String::with_capacity(8 + trace.len() * 4);
    out.push_str(&format!("{},{}\n", trace.start().row, trace.start().col));
    for step in trace.steps() {
        out.push(step.command.as_char());
        out.push('\n');
    }
    for step in trace.steps() {
        out.push(step.reading.as_char());
        out.push('\n');
    }
    out
}

pub(super) fn deserialize(text: &str, rounds: usize) -> Result<Trace, TraceError> {
    let lines: Vec<&str> = text.lines().collect();
    let expected = 1 + 2 * rounds;
    if lines.len() < expected {
        return Err(TraceError::TooShort {
            expected,
            actual: lines.len(),
        });
    }
    if lines.len() > expected && lines[expected..].iter().any(|l| !l.trim().is_empty()) {
        return Err(TraceError::TrailingContent {
            line: expected + 1,
        });
    }

    let start = parse_start(lines[0], 1)?;

    let mut commands = Vec::with_capacity(rounds);
    for (offset, line) in lines[1..1 + rounds].iter().enumerate() {
        let line_no = offset + 2;
        let command = single_char(line, line_no)
            .and_then(|c| MoveCommand::from_char(c).ok_or_else(|| malformed(line, line_no)))?;
        commands.push(command);
    }

    let mut steps = Vec::with_capacity(rounds);
    for (offset, line) in lines[1 + rounds..expected].iter().enumerate() {
        let line_no = offset + rounds + 2;
        let reading = single_char(line, line_no)
            .and_then(|c| TerrainReading::from_char(c).ok_or_else(|| malformed(line, line_no)))?;
        steps.push(TraceStep {
            command: commands[offset],
            reading,
        });
    }

    Ok(Trace::new(start, steps))
}

fn parse_start(line: &str, line_no: usize) -> Result<CellCoord, TraceError> {
    let mut parts = line.trim().split(',');
    let row = parts
        .next()
        .and_then(|p| p.trim().parse::<i32>().ok())
        .ok_or_else(|| malformed(line, line_no))?;
    let col = parts
        .next()
        .and_then(|p| p.trim().parse::<i32>().ok())
        .ok_or_else(|| malformed(line, line_no))?;
    if parts.next().is_some() {
        return Err(malformed(line, line_no));
    }
    Ok(CellCoord::new(row, col))
}

fn single_char(line: &str, line_no: usize) -> Result<char, TraceError> {
    let trimmed = line.trim();
    let mut chars = trimmed.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(malformed(line, line_no)),
    }
}

fn malformed(line: &str, line_no: usize) -> TraceError {
    TraceError::Malformed {
        line: line_no,
        found: line.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_trace() -> Trace {
        Trace::new(
            CellCoord::new(4, 7),
            vec![
                TraceStep {
                    command: MoveCommand::Right,
                    reading: TerrainReading::Normal,
                },
                TraceStep {
                    command: MoveCommand::Down,
                    reading: TerrainReading::Highway,
                },
                TraceStep {
                    command: MoveCommand::Up,
                    reading: TerrainReading::Difficult,
                },
            ],
        )
    }

    #[test]
    fn test_serialize_layout() {
        let text = sample_trace().serialize();
        assert_eq!(text, "4,7\nR\nD\nU\nN\nH\nT\n");
    }

    #[test]
    fn test_round_trip() {
        let trace = sample_trace();
        let redone = Trace::deserialize(&trace.serialize(), trace.len()).unwrap();
        assert_eq!(redone, trace);
    }

    #[test]
    fn test_malformed_command_line_reports_line_number() {
        let err = Trace::deserialize("0,0\nR\nQ\nN\nN\n", 2).unwrap_err();
        match err {
            TraceError::Malformed { line, found } => {
                assert_eq!(line, 3);
                assert_eq!(found, "Q");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_malformed_reading_line_reports_line_number() {
        let err = Trace::deserialize("0,0\nR\nR\nN\nB\n", 2).unwrap_err();
        match err {
            TraceError::Malformed { line, found } => {
                assert_eq!(line, 5);
                assert_eq!(found, "B");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_bad_start_coordinate() {
        assert!(matches!(
            Trace::deserialize("4;7\nR\nN\n", 1),
            Err(TraceError::Malformed { line: 1, .. })
        ));
        assert!(matches!(
            Trace::deserialize("4,7,9\nR\nN\n", 1),
            Err(TraceError::Malformed { line: 1, .. })
        ));
    }

    #[test]
    fn test_too_short() {
        assert!(matches!(
            Trace::deserialize("0,0\nR\n", 2),
            Err(TraceError::TooShort {
                expected: 5,
                actual: 2
            })
        ));
    }

    #[test]
    fn test_trailing_content_rejected() {
        let err = Trace::deserialize("0,0\nR\nN\nextra\n", 1).unwrap_err();
        assert!(matches!(err, TraceError::TrailingContent { line: 4 }));
        // Trailing blank lines are tolerated.
        assert!(Trace::deserialize("0,0\nR\nN\n\n", 1).is_ok());
    }

    #[test]
    fn test_multi_char_line_rejected() {
        assert!(matches!(
            Trace::deserialize("0,0\nRR\nN\n", 1),
            Err(TraceError::Malformed { line: 2, .. })
        ));
    }
}
