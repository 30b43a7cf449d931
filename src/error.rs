use std::ascii;
use std::borrow::Borrow;
use std::fmt;
use std::io;
use std::result;
use std::sync::Arc;

use thiserror::Error;

use crate::byte_record::ByteRecord;
use crate::position::Position;

/// A type alias for `Result<T, csv_stream::Error>`.
pub type Result<T> = result::Result<T, Error>;

/// An error that can occur when decoding CSV data.
///
/// Every error records where in the data it happened and the last byte the
/// decoder examined. It renders as `line L, column C: <cause>`.
///
/// Errors reported by the decoder itself (I/O failures and grammar
/// violations) are sticky: once one has been returned, every further read
/// returns a clone of it. This is why the error is cheap to clone.
#[derive(Clone, Debug, Error)]
#[error("line {}, column {}: {}", .pos.line(), .pos.column(), .kind)]
pub struct Error {
    pos: Position,
    byte: u8,
    #[source]
    kind: ErrorKind,
}

/// The specific type of an error.
#[derive(Clone, Debug, Error)]
pub enum ErrorKind {
    /// The byte source failed with something other than a clean end of
    /// stream.
    #[error(transparent)]
    Io(Arc<io::Error>),
    /// The byte source ended in the middle of a quoted cell.
    #[error("unexpected end of input")]
    UnexpectedEof,
    /// A byte that CSV grammar does not allow at this point, such as a quote
    /// inside an unquoted cell.
    #[error("unexpected byte {}", quoted(.0))]
    UnexpectedByte(u8),
    /// A record could not be converted to a `StringRecord`.
    #[error(transparent)]
    Utf8(Utf8Error),
}

impl Error {
    pub(crate) fn new(kind: ErrorKind, pos: Position, byte: u8) -> Error {
        Error { pos, byte, kind }
    }

    /// The position at which the error occurred.
    pub fn position(&self) -> &Position {
        &self.pos
    }

    /// The last byte the decoder consumed before the error was reported.
    ///
    /// For grammar errors this is the offending byte.
    pub fn byte(&self) -> u8 {
        self.byte
    }

    /// Return the specific type of this error.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Unwrap this error into its underlying type.
    pub fn into_kind(self) -> ErrorKind {
        self.kind
    }

    /// Returns true if this is an I/O error from the byte source.
    pub fn is_io_error(&self) -> bool {
        match self.kind {
            ErrorKind::Io(_) => true,
            _ => false,
        }
    }

    /// Returns true if this error was caused by malformed CSV, including
    /// input that ends inside a quoted cell.
    pub fn is_grammar_error(&self) -> bool {
        match self.kind {
            ErrorKind::UnexpectedEof | ErrorKind::UnexpectedByte(_) => true,
            _ => false,
        }
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> io::Error {
        let kind = match *err.kind() {
            ErrorKind::Io(ref ioerr) => ioerr.kind(),
            ErrorKind::UnexpectedEof => io::ErrorKind::UnexpectedEof,
            ErrorKind::UnexpectedByte(_) | ErrorKind::Utf8(_) => {
                io::ErrorKind::InvalidData
            }
        };
        io::Error::new(kind, err)
    }
}

/// Render a byte as a quoted character literal.
///
/// Printable ASCII is written as is, `\t`, `\r`, `\n`, `\'` and `\\` use
/// their usual escapes and every other byte is written as `\xNN`.
fn quoted<B: Borrow<u8>>(b: B) -> Quoted {
    Quoted(*b.borrow())
}

struct Quoted(u8);

impl fmt::Display for Quoted {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.0 {
            b'"' => f.write_str("'\"'"),
            b => write!(f, "'{}'", ascii::escape_default(b)),
        }
    }
}

/// A UTF-8 validation error that occurs when attempting to convert a
/// `ByteRecord` into a `StringRecord`.
///
/// The error includes the index of the field that failed validation, and the
/// last byte at which valid UTF-8 was verified.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("invalid UTF-8 in field {field} near byte index {valid_up_to}")]
pub struct Utf8Error {
    field: usize,
    valid_up_to: usize,
}

impl Utf8Error {
    pub(crate) fn new(field: usize, valid_up_to: usize) -> Utf8Error {
        Utf8Error { field, valid_up_to }
    }

    /// The field index of a byte record in which UTF-8 validation failed.
    pub fn field(&self) -> usize {
        self.field
    }

    /// The index into the given field up to which valid UTF-8 was verified.
    pub fn valid_up_to(&self) -> usize {
        self.valid_up_to
    }
}

/// A UTF-8 validation error that occurs when converting a `ByteRecord` into
/// a `StringRecord`.
///
/// The original record is kept so that its allocation can be reused.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("{err}")]
pub struct FromUtf8Error {
    record: ByteRecord,
    #[source]
    err: Utf8Error,
}

impl FromUtf8Error {
    pub(crate) fn new(record: ByteRecord, err: Utf8Error) -> FromUtf8Error {
        FromUtf8Error { record, err }
    }

    /// Access the underlying `ByteRecord` that failed UTF-8 validation.
    pub fn into_byte_record(self) -> ByteRecord {
        self.record
    }

    /// Access the underlying UTF-8 validation error.
    pub fn utf8_error(&self) -> &Utf8Error {
        &self.err
    }
}
