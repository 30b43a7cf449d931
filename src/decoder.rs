use std::io::{self, BufRead};
use std::sync::Arc;

use csv_stream_core::{Events, ParseState, Token, TransitionTable};
use log::{debug, trace};

use crate::byte_record::ByteRecord;
use crate::error::{Error, ErrorKind, Result};
use crate::position::Position;
use crate::string_record::{self, StringRecord};

static TABLE: TransitionTable = TransitionTable::CSV;

/// Builds a CSV decoder with various configuration knobs.
///
/// This builder can be used to tweak the field delimiter and the size of the
/// internal read buffer. Once a `Decoder` is built, its configuration cannot
/// be changed.
#[derive(Debug)]
pub struct DecoderBuilder {
    capacity: usize,
    delimiter: u8,
}

impl Default for DecoderBuilder {
    fn default() -> DecoderBuilder {
        DecoderBuilder { capacity: 8 * (1 << 10), delimiter: b',' }
    }
}

impl DecoderBuilder {
    /// Create a new builder for configuring CSV decoding.
    pub fn new() -> DecoderBuilder {
        DecoderBuilder::default()
    }

    /// Build a CSV decoder from this configuration that reads data from
    /// `rdr`.
    ///
    /// Note that the decoder is buffered automatically, so you should not
    /// wrap `rdr` in a buffered reader like `io::BufReader`.
    pub fn from_reader<R: io::Read>(&self, rdr: R) -> Decoder<R> {
        Decoder::new(self, rdr)
    }

    /// The field delimiter to use when parsing CSV.
    ///
    /// The default is `b','`. The delimiter must not be `"`, `\n` or `\r`.
    /// This is not checked; those bytes are always classified as quotes and
    /// newlines.
    pub fn delimiter(&mut self, delimiter: u8) -> &mut DecoderBuilder {
        self.delimiter = delimiter;
        self
    }

    /// Set the capacity (in bytes) of the buffer used in the CSV decoder.
    ///
    /// Buffering only changes how often the byte source is read. It never
    /// changes the events produced or the positions reported.
    ///
    /// A capacity of `0` is treated as `1`, since an empty buffer cannot be
    /// told apart from the end of the data.
    pub fn buffer_capacity(&mut self, capacity: usize) -> &mut DecoderBuilder {
        self.capacity = capacity.max(1);
        self
    }
}

/// A pull based streaming CSV decoder.
///
/// The decoder runs a CSV state machine over its byte source one byte at a
/// time and exposes the result at three granularities that share one cursor:
///
/// * [`next_record`](Decoder::next_record) moves to the start of the next
///   record,
/// * [`next_cell`](Decoder::next_cell) moves to the start of the next cell
///   in the current record,
/// * [`next_byte`](Decoder::next_byte) returns the next byte of the current
///   cell, with quotes already removed.
///
/// Each level reports exhaustion (`false` or `None`) when it reaches a
/// boundary of the level above it. Exhaustion is positional: after moving
/// the cursor with the level above, the lower level works again.
///
/// # Errors
///
/// I/O errors from the byte source and grammar errors (for example a quote
/// inside an unquoted cell, or input ending inside a quoted cell) are fatal.
/// They are reported in preference to any exhaustion signal, and every later
/// call returns the same error again. The decoder never tries to recover.
///
/// # Example
///
/// ```
/// use csv_stream::Decoder;
///
/// # fn example() -> csv_stream::Result<()> {
/// let data = "city,pop\n\"Boston, MA\",4628910\n";
/// let mut rdr = Decoder::from_reader(data.as_bytes());
///
/// let mut cells = vec![];
/// while rdr.next_record()? {
///     while rdr.next_cell()? {
///         let mut cell = vec![];
///         while let Some(b) = rdr.next_byte()? {
///             cell.push(b);
///         }
///         cells.push(String::from_utf8(cell).unwrap());
///     }
/// }
/// assert_eq!(cells, vec!["city", "pop", "Boston, MA", "4628910"]);
/// # Ok(()) }
/// # example().unwrap();
/// ```
#[derive(Debug)]
pub struct Decoder<R> {
    rdr: io::BufReader<R>,
    delimiter: u8,
    /// The current parser state.
    state: ParseState,
    /// Events emitted by the last transition that have not been handled.
    events: Events,
    /// The last byte consumed from `rdr`.
    last: u8,
    pos: Position,
    /// The first fatal error, returned again on every call once set.
    failed: Option<Error>,
}

impl<R: io::Read> Decoder<R> {
    /// Create a new CSV decoder with a default configuration for the given
    /// byte source.
    ///
    /// To customize CSV decoding, use a `DecoderBuilder`.
    pub fn from_reader(rdr: R) -> Decoder<R> {
        DecoderBuilder::new().from_reader(rdr)
    }

    fn new(builder: &DecoderBuilder, rdr: R) -> Decoder<R> {
        Decoder {
            rdr: io::BufReader::with_capacity(builder.capacity, rdr),
            delimiter: builder.delimiter,
            state: ParseState::Initial,
            // Pretend a record just ended so that the first call to
            // `next_record` starts reading.
            events: Events::END_RECORD,
            last: 0,
            pos: Position::new(),
            failed: None,
        }
    }

    /// Return the next byte of the current cell.
    ///
    /// `None` is returned when the current cell has no more bytes. This is
    /// also the case before `next_cell` has been called for a newly started
    /// cell.
    pub fn next_byte(&mut self) -> Result<Option<u8>> {
        self.fill()?;
        if self.events.next() != Events::BYTE {
            return Ok(None);
        }
        self.events.clear(Events::BYTE);
        Ok(Some(self.last))
    }

    /// Move to the start of the next cell in the current record.
    ///
    /// Any unread bytes of the current cell are skipped. `false` is returned
    /// when the current record has no more cells.
    pub fn next_cell(&mut self) -> Result<bool> {
        loop {
            self.fill()?;
            if self.events.contains(Events::NEW_CELL) {
                self.events.clear(Events::NEW_CELL);
                return Ok(true);
            }
            self.events.clear(Events::BYTE);
            if !self.events.is_empty() {
                return Ok(false);
            }
        }
    }

    /// Move to the start of the next record.
    ///
    /// Any unread cells of the current record are skipped. `false` is
    /// returned when there are no more records, and on every call after
    /// that.
    pub fn next_record(&mut self) -> Result<bool> {
        loop {
            self.fill()?;
            self.events.clear_until(Events::END_RECORD);
            if self.events.contains(Events::END_RECORD) {
                break;
            }
            // Only the end of the stream can be left.
            if !self.events.is_empty() {
                return Ok(false);
            }
        }
        self.events.clear(Events::END_RECORD);
        self.fill()?;
        if self.events.next() != Events::NEW_CELL {
            return Ok(false);
        }
        trace!("record starts at {:?}", self.pos);
        Ok(true)
    }

    /// Read the next record into `record`, returning `false` when there are
    /// no more records.
    ///
    /// The record's buffer is reused, so reading every record through one
    /// `ByteRecord` avoids allocating per record. If an error is returned,
    /// the contents of `record` are unspecified.
    pub fn read_byte_record(&mut self, record: &mut ByteRecord) -> Result<bool> {
        record.clear();
        if !self.next_record()? {
            return Ok(false);
        }
        while self.next_cell()? {
            while let Some(b) = self.next_byte()? {
                record.push_byte(b);
            }
            record.end_field();
        }
        Ok(true)
    }

    /// Read the next record into `record`, returning `false` when there are
    /// no more records.
    ///
    /// If the record is not valid UTF-8, then an error is returned and
    /// `record` is cleared. Unlike decoding errors, UTF-8 errors are not
    /// sticky: the next call reads the next record.
    pub fn read_record(&mut self, record: &mut StringRecord) -> Result<bool> {
        string_record::read(self, record)
    }

    /// Returns a borrowed iterator over all records as raw bytes.
    ///
    /// The iterator stops after yielding a decoding error.
    pub fn byte_records(&mut self) -> ByteRecordsIter<R> {
        ByteRecordsIter { rdr: self, done: false }
    }

    /// Returns a borrowed iterator over all records as strings.
    ///
    /// The iterator stops after yielding a decoding error, but continues
    /// past records that are not valid UTF-8.
    pub fn records(&mut self) -> StringRecordsIter<R> {
        StringRecordsIter { rdr: self, done: false }
    }

    /// Read the next record as a vector of owned strings.
    ///
    /// `None` is returned when there are no more records.
    pub fn strings_record(&mut self) -> Result<Option<Vec<String>>> {
        let mut record = StringRecord::new();
        if !self.read_record(&mut record)? {
            return Ok(None);
        }
        Ok(Some(record.to_strings()))
    }

    /// Read all remaining records as vectors of owned strings.
    pub fn strings_all(&mut self) -> Result<Vec<Vec<String>>> {
        let mut all = vec![];
        let mut record = StringRecord::new();
        while self.read_record(&mut record)? {
            all.push(record.to_strings());
        }
        Ok(all)
    }

    /// Make sure there are pending events, unless decoding has failed.
    fn fill(&mut self) -> Result<()> {
        if let Some(ref err) = self.failed {
            return Err(err.clone());
        }
        if self.events.is_empty() {
            self.events = self.decode()?;
        }
        Ok(())
    }

    /// Consume bytes until a transition emits at least one event.
    ///
    /// A clean end of the byte source is fed to the parser as `Token::End`.
    fn decode(&mut self) -> Result<Events> {
        loop {
            let next = self.rdr.fill_buf().map(|buf| buf.first().copied());
            let b = match next {
                Ok(Some(b)) => b,
                Err(err) => {
                    return Err(self.fail(ErrorKind::Io(Arc::new(err))));
                }
                Ok(None) => {
                    let (state, events) = TABLE.get(self.state, Token::End);
                    self.state = state;
                    if events.contains(Events::ERROR) {
                        return Err(self.fail(ErrorKind::UnexpectedEof));
                    }
                    debug!("end of CSV data at {:?}", self.pos);
                    return Ok(events);
                }
            };
            self.rdr.consume(1);
            self.pos.advance(b);
            self.last = b;

            let token = Token::classify(b, self.delimiter);
            let (state, events) = TABLE.get(self.state, token);
            self.state = state;
            if events.contains(Events::ERROR) {
                return Err(self.fail(ErrorKind::UnexpectedByte(b)));
            }
            if !events.is_empty() {
                return Ok(events);
            }
        }
    }

    /// Record a fatal error so that it is returned from now on.
    fn fail(&mut self, kind: ErrorKind) -> Error {
        let err = Error::new(kind, self.pos, self.last);
        debug!("CSV decoding failed: {}", err);
        self.failed = Some(err.clone());
        err
    }
}

impl<R> Decoder<R> {
    /// Returns the position of the decoder, which is just past the last
    /// consumed byte.
    pub fn position(&self) -> &Position {
        &self.pos
    }

    /// The field delimiter this decoder was built with.
    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }

    /// Returns true once the byte source has been read to its end without
    /// error.
    ///
    /// Events for the final record may still be pending, so `next_record`
    /// can still return `true` once after this starts returning `true`.
    pub fn is_done(&self) -> bool {
        self.state == ParseState::Done
    }

    /// Returns the error that stopped this decoder, if any.
    pub fn error(&self) -> Option<&Error> {
        self.failed.as_ref()
    }

    /// Returns a reference to the underlying byte source.
    pub fn get_ref(&self) -> &R {
        self.rdr.get_ref()
    }

    /// Returns a mutable reference to the underlying byte source.
    ///
    /// Reading from it directly skips past data the decoder has not seen.
    pub fn get_mut(&mut self) -> &mut R {
        self.rdr.get_mut()
    }

    /// Unwraps this decoder, returning the underlying byte source.
    ///
    /// Note that any leftover data in the internal buffer is lost.
    pub fn into_inner(self) -> R {
        self.rdr.into_inner()
    }

    pub(crate) fn last_byte(&self) -> u8 {
        self.last
    }
}

/// Reads the bytes of the current cell.
///
/// A read of zero bytes marks the end of the cell, not the end of the data.
/// Use `next_cell` and `next_record` to move on.
impl<R: io::Read> io::Read for Decoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut n = 0;
        while n < buf.len() {
            match self.next_byte() {
                Ok(Some(b)) => {
                    buf[n] = b;
                    n += 1;
                }
                Ok(None) => break,
                // The error is sticky, so the next read reports it.
                Err(_) if n > 0 => break,
                Err(err) => return Err(err.into()),
            }
        }
        Ok(n)
    }
}

/// A borrowed iterator over byte records.
///
/// The lifetime parameter `'r` refers to the lifetime of the decoder.
#[derive(Debug)]
pub struct ByteRecordsIter<'r, R: 'r> {
    rdr: &'r mut Decoder<R>,
    done: bool,
}

impl<'r, R: io::Read> ByteRecordsIter<'r, R> {
    /// Return a reference to the underlying decoder.
    pub fn decoder(&self) -> &Decoder<R> {
        &self.rdr
    }
}

impl<'r, R: io::Read> Iterator for ByteRecordsIter<'r, R> {
    type Item = Result<ByteRecord>;

    fn next(&mut self) -> Option<Result<ByteRecord>> {
        if self.done {
            return None;
        }
        let mut record = ByteRecord::new();
        match self.rdr.read_byte_record(&mut record) {
            Ok(true) => Some(Ok(record)),
            Ok(false) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

/// A borrowed iterator over string records.
///
/// The lifetime parameter `'r` refers to the lifetime of the decoder.
#[derive(Debug)]
pub struct StringRecordsIter<'r, R: 'r> {
    rdr: &'r mut Decoder<R>,
    done: bool,
}

impl<'r, R: io::Read> StringRecordsIter<'r, R> {
    /// Return a reference to the underlying decoder.
    pub fn decoder(&self) -> &Decoder<R> {
        &self.rdr
    }
}

impl<'r, R: io::Read> Iterator for StringRecordsIter<'r, R> {
    type Item = Result<StringRecord>;

    fn next(&mut self) -> Option<Result<StringRecord>> {
        if self.done {
            return None;
        }
        let mut record = StringRecord::new();
        match self.rdr.read_record(&mut record) {
            Ok(true) => Some(Ok(record)),
            Ok(false) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = match *err.kind() {
                    ErrorKind::Utf8(_) => false,
                    _ => true,
                };
                Some(Err(err))
            }
        }
    }
}
