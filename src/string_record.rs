use std::fmt;
use std::io;
use std::ops;
use std::result;
use std::str;

use crate::byte_record::{self, ByteRecord, ByteRecordIter};
use crate::decoder::Decoder;
use crate::error::{Error, ErrorKind, FromUtf8Error, Result};

/// A safe function for reading CSV data into a `StringRecord`.
///
/// This relies on the internal representation of `StringRecord`.
pub(crate) fn read<R: io::Read>(
    rdr: &mut Decoder<R>,
    record: &mut StringRecord,
) -> Result<bool> {
    // SAFETY: Note that despite the absence of `unsafe` in this function, this
    // code is critical to upholding the safety of other `unsafe` blocks in
    // this module. Namely, after calling `read_byte_record`, it is possible
    // for `record` to contain invalid UTF-8 (or half a record, if decoding
    // failed). Both cases wipe the record before returning.
    let pos = *rdr.position();
    let read_res = rdr.read_byte_record(&mut record.0);
    let utf8_res = match read_res {
        Err(_) => {
            record.0.clear();
            Ok(())
        }
        Ok(_) => byte_record::validate(&record.0).map_err(|err| {
            record.0.clear();
            err
        }),
    };
    match (read_res, utf8_res) {
        (Err(err), _) => Err(err),
        (Ok(_), Err(err)) => {
            Err(Error::new(ErrorKind::Utf8(err), pos, rdr.last_byte()))
        }
        (Ok(more), Ok(())) => Ok(more),
    }
}

/// A single CSV record stored as valid UTF-8 bytes.
#[derive(Clone, Eq, PartialEq)]
pub struct StringRecord(ByteRecord);

impl Default for StringRecord {
    fn default() -> StringRecord {
        StringRecord::new()
    }
}

impl StringRecord {
    /// Create a new empty `StringRecord`.
    pub fn new() -> StringRecord {
        StringRecord(ByteRecord::new())
    }

    /// Create a new empty `StringRecord` with room for `buffer` bytes of
    /// cell data spread over `fields` cells.
    pub fn with_capacity(buffer: usize, fields: usize) -> StringRecord {
        StringRecord(ByteRecord::with_capacity(buffer, fields))
    }

    /// Create a new `StringRecord` from a `ByteRecord`.
    ///
    /// Note that this does UTF-8 validation. If the given `ByteRecord` does
    /// not contain valid UTF-8, then this returns an error. The error includes
    /// the UTF-8 error and the original `ByteRecord`.
    pub fn from_byte_record(
        record: ByteRecord,
    ) -> result::Result<StringRecord, FromUtf8Error> {
        match byte_record::validate(&record) {
            Ok(()) => Ok(StringRecord(record)),
            Err(err) => Err(FromUtf8Error::new(record, err)),
        }
    }

    /// Return the field at index `i`.
    ///
    /// If no field at index `i` exists, then this returns `None`.
    pub fn get(&self, i: usize) -> Option<&str> {
        self.0.get(i).map(|bytes| {
            // This is safe because we guarantee that all string records
            // have a valid UTF-8 buffer. It's also safe because we
            // individually check each field for valid UTF-8.
            unsafe { str::from_utf8_unchecked(bytes) }
        })
    }

    /// Returns true if and only if this record is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of fields in this record.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Clear this record so that it has zero fields.
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Add a new field.
    pub fn push_field(&mut self, field: &str) {
        self.0.push_field(field.as_bytes());
    }

    /// Return a reference to this record's raw `ByteRecord`.
    pub fn as_byte_record(&self) -> &ByteRecord {
        &self.0
    }

    /// Convert this `StringRecord` into `ByteRecord`.
    pub fn into_byte_record(self) -> ByteRecord {
        self.0
    }

    /// Returns an iterator over all fields in this record.
    pub fn iter(&self) -> StringRecordIter {
        StringRecordIter(self.0.iter())
    }

    /// Copy every field out into an owned `String`.
    pub fn to_strings(&self) -> Vec<String> {
        self.iter().map(String::from).collect()
    }
}

impl fmt::Debug for StringRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "StringRecord(")?;
        f.debug_list().entries(self.iter()).finish()?;
        write!(f, ")")
    }
}

impl ops::Index<usize> for StringRecord {
    type Output = str;
    fn index(&self, i: usize) -> &str {
        match self.get(i) {
            Some(field) => field,
            None => panic!(
                "no field at index {} in record of length {}",
                i,
                self.len()
            ),
        }
    }
}

impl<T: AsRef<str>> From<Vec<T>> for StringRecord {
    fn from(xs: Vec<T>) -> StringRecord {
        let mut record = StringRecord::with_capacity(0, xs.len());
        for x in &xs {
            record.push_field(x.as_ref());
        }
        record
    }
}

impl<T: AsRef<[u8]>> PartialEq<Vec<T>> for StringRecord {
    fn eq(&self, other: &Vec<T>) -> bool {
        self.0 == *other
    }
}

impl<'a> IntoIterator for &'a StringRecord {
    type IntoIter = StringRecordIter<'a>;
    type Item = &'a str;
    fn into_iter(self) -> StringRecordIter<'a> {
        self.iter()
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for StringRecord {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> result::Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

/// An iterator over the fields in a string record.
pub struct StringRecordIter<'a>(ByteRecordIter<'a>);

impl<'a> Iterator for StringRecordIter<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        self.0.next().map(|bytes| {
            // See StringRecord::get for safety argument.
            unsafe { str::from_utf8_unchecked(bytes) }
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<'a> ExactSizeIterator for StringRecordIter<'a> {}

#[cfg(test)]
mod tests {
    use super::StringRecord;
    use crate::byte_record::ByteRecord;
    use crate::decoder::Decoder;
    use crate::error::ErrorKind;

    #[test]
    fn fields() {
        let rec = StringRecord::from(vec!["a", "", "ß"]);
        assert_eq!(rec.len(), 3);
        assert_eq!(rec.get(2), Some("ß"));
        assert_eq!(&rec[0], "a");
        assert_eq!(rec.to_strings(), vec!["a", "", "ß"]);
        assert_eq!(format!("{:?}", rec), r#"StringRecord(["a", "", "ß"])"#);
    }

    #[test]
    fn round_trips_through_bytes() {
        let bytes = ByteRecord::from(vec!["x", "yz"]);
        let rec = StringRecord::from_byte_record(bytes.clone()).unwrap();
        assert_eq!(rec.as_byte_record(), &bytes);
        assert_eq!(rec.into_byte_record(), bytes);
    }

    #[test]
    fn read_invalid_utf8_clears_record() {
        let mut rdr = Decoder::from_reader(&b"a,\xFF\nb,c\n"[..]);
        let mut rec = StringRecord::new();

        let err = rdr.read_record(&mut rec).unwrap_err();
        assert!(rec.is_empty());
        match *err.kind() {
            ErrorKind::Utf8(ref utf8) => {
                assert_eq!(utf8.field(), 1);
                assert_eq!(utf8.valid_up_to(), 0);
            }
            ref kind => panic!("unexpected error: {:?}", kind),
        }

        // UTF-8 errors do not poison the decoder.
        assert!(rdr.read_record(&mut rec).unwrap());
        assert_eq!(rec, vec!["b", "c"]);
        assert!(!rdr.read_record(&mut rec).unwrap());
    }

    #[test]
    fn read_grammar_error_clears_record() {
        let mut rdr = Decoder::from_reader(&b"ab,c\"d"[..]);
        let mut rec = StringRecord::from(vec!["stale"]);

        let err = rdr.read_record(&mut rec).unwrap_err();
        assert!(err.is_grammar_error());
        assert!(rec.is_empty());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serialize_as_strings() {
        let rec = StringRecord::from(vec!["a", "b\"c"]);
        let got = serde_json::to_string(&rec).unwrap();
        assert_eq!(got, r#"["a","b\"c"]"#);
    }
}
