/*!
The `csv-stream` crate provides a pull based, streaming CSV decoder.

Bytes are read from any `std::io::Read` and never buffered beyond a fixed
size read buffer. The decoder can be driven at three granularities that
share one cursor: records, cells and the raw (unquoted) bytes of a cell. On
top of that, records can be accumulated into reusable [`ByteRecord`]s and
[`StringRecord`]s.

The grammar is the usual RFC 4180 one:

* cells are separated by a configurable single byte delimiter (`,` by
  default),
* records are terminated by `\n`, `\r` or `\r\n`, and blank lines are
  skipped,
* a cell wrapped in `"` may contain delimiters and newlines, and a doubled
  `""` inside it stands for one literal quote.

Anything else, such as a quote in the middle of an unquoted cell or input
that ends inside a quoted cell, is an error that reports the line and column
of the offending byte.

The parsing primitives live in the `csv-stream-core` crate, which does no
I/O and no allocation.

# Example

```
use csv_stream::Decoder;

# fn example() -> csv_stream::Result<()> {
let data = "\"a\",s\n\"d\nf\",\"g\"\"\"";
let mut rdr = Decoder::from_reader(data.as_bytes());
let records = rdr.strings_all()?;
assert_eq!(records, vec![vec!["a", "s"], vec!["d\nf", "g\""]]);
# Ok(()) }
# example().unwrap();
```
*/

#![deny(missing_docs)]

pub use csv_stream_core::{Events, ParseState, Token};

pub use crate::byte_record::{ByteRecord, ByteRecordIter};
pub use crate::decoder::{
    ByteRecordsIter, Decoder, DecoderBuilder, StringRecordsIter,
};
pub use crate::error::{
    Error, ErrorKind, FromUtf8Error, Result, Utf8Error,
};
pub use crate::position::Position;
pub use crate::string_record::{StringRecord, StringRecordIter};

mod byte_record;
mod decoder;
mod error;
mod position;
mod string_record;
