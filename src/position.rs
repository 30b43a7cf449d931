/// A position in CSV data.
///
/// A position is advanced once for every raw byte the decoder consumes. It
/// tracks the byte offset, the line and the column. Lines are counted by
/// occurrences of `\n` only, so a lone `\r` terminates a record without
/// starting a new line.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Position {
    byte: u64,
    line: u64,
    column: u64,
}

impl Default for Position {
    fn default() -> Position {
        Position::new()
    }
}

impl Position {
    /// Returns a new position at the start of the data.
    pub fn new() -> Position {
        Position { byte: 0, line: 1, column: 0 }
    }

    /// Account for one consumed byte.
    #[inline]
    pub fn advance(&mut self, b: u8) {
        self.byte += 1;
        if b == b'\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
    }

    /// The number of bytes consumed so far, which is also the zero-based
    /// offset of the next byte.
    pub fn byte(&self) -> u64 {
        self.byte
    }

    /// The line number, starting at `1`.
    pub fn line(&self) -> u64 {
        self.line
    }

    /// The number of bytes consumed on the current line.
    ///
    /// When reported in an error, this is the column of the offending byte
    /// counting from `1`, or `0` if the offending byte was a `\n`.
    pub fn column(&self) -> u64 {
        self.column
    }
}
