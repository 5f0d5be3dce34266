use crate::application::command::EscrowCommand;
use crate::error::{EscrowError, Result};
use std::io::{BufRead, BufReader, Read};

/// Reads escrow commands from a JSON Lines source.
///
/// Each non-empty line holds one command object. Lines starting with `#` are
/// comments. A malformed line yields an error for that line only, so the
/// caller can report it and keep going.
pub struct CommandReader<R: Read> {
    reader: BufReader<R>,
}

impl<R: Read> CommandReader<R> {
    pub fn new(source: R) -> Self {
        Self {
            reader: BufReader::new(source),
        }
    }

    /// Returns an iterator that lazily reads and deserializes commands,
    /// each paired with its 1-based line number in the source.
    pub fn commands(self) -> impl Iterator<Item = (usize, Result<EscrowCommand>)> {
        self.reader
            .lines()
            .enumerate()
            .filter_map(|(index, line)| {
                let line_number = index + 1;
                match line {
                    Ok(line) => {
                        let line = line.trim();
                        if line.is_empty() || line.starts_with('#') {
                            None
                        } else {
                            let command = serde_json::from_str(line).map_err(EscrowError::from);
                            Some((line_number, command))
                        }
                    }
                    Err(e) => Some((line_number, Err(EscrowError::from(e)))),
                }
            })
    }
}
