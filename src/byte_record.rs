use std::fmt;
use std::ops::{self, Range};
use std::result;
use std::str;

use bstr::ByteSlice;

use crate::error::Utf8Error;

/// Validate the given record as UTF-8.
///
/// If it's not UTF-8, return an error naming the first invalid field.
///
/// This never modifies the contents of this record.
pub(crate) fn validate(record: &ByteRecord) -> result::Result<(), Utf8Error> {
    // If the entire buffer is ASCII, then we have nothing to fear.
    if record.fields.is_ascii() {
        return Ok(());
    }
    // Otherwise, we must check each field individually to ensure that
    // it's valid UTF-8.
    for (i, field) in record.iter().enumerate() {
        if let Err(err) = str::from_utf8(field) {
            return Err(Utf8Error::new(i, err.valid_up_to()));
        }
    }
    Ok(())
}

/// A single CSV record stored as raw bytes.
///
/// All cells are stored contiguously in one buffer, so reusing a record
/// across reads (see `Decoder::read_byte_record`) amortizes allocation.
#[derive(Clone, Eq, PartialEq)]
pub struct ByteRecord {
    /// All fields in this record, stored contiguously.
    fields: Vec<u8>,
    /// The end offset of each field in `fields`.
    ends: Vec<usize>,
}

impl Default for ByteRecord {
    fn default() -> ByteRecord {
        ByteRecord::new()
    }
}

impl ByteRecord {
    /// Create a new empty `ByteRecord`.
    pub fn new() -> ByteRecord {
        ByteRecord::with_capacity(0, 0)
    }

    /// Create a new empty `ByteRecord` with room for `buffer` bytes of cell
    /// data spread over `fields` cells.
    pub fn with_capacity(buffer: usize, fields: usize) -> ByteRecord {
        ByteRecord {
            fields: Vec::with_capacity(buffer),
            ends: Vec::with_capacity(fields),
        }
    }

    /// Return the field at index `i`.
    ///
    /// If no field at index `i` exists, then this returns `None`.
    pub fn get(&self, i: usize) -> Option<&[u8]> {
        self.range(i).map(|range| &self.fields[range])
    }

    /// Returns true if and only if this record is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of fields in this record.
    pub fn len(&self) -> usize {
        self.ends.len()
    }

    /// Clear this record so that it has zero fields.
    ///
    /// The allocation is kept.
    pub fn clear(&mut self) {
        self.fields.clear();
        self.ends.clear();
    }

    /// Returns an iterator over all fields in this record.
    pub fn iter(&self) -> ByteRecordIter {
        ByteRecordIter { r: self, start: 0, i: 0 }
    }

    /// Return all cells of this record concatenated together.
    pub fn as_slice(&self) -> &[u8] {
        &self.fields
    }

    /// Add a new field.
    pub fn push_field(&mut self, field: &[u8]) {
        self.fields.extend_from_slice(field);
        self.end_field();
    }

    /// Append one byte to the field currently being built.
    #[inline]
    pub(crate) fn push_byte(&mut self, b: u8) {
        self.fields.push(b);
    }

    /// Finish the field currently being built.
    pub(crate) fn end_field(&mut self) {
        self.ends.push(self.fields.len());
    }

    fn range(&self, i: usize) -> Option<Range<usize>> {
        let end = *self.ends.get(i)?;
        let start = match i.checked_sub(1) {
            None => 0,
            Some(prev) => self.ends[prev],
        };
        Some(start..end)
    }
}

impl fmt::Debug for ByteRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "ByteRecord(")?;
        f.debug_list()
            .entries(self.iter().map(|field| field.as_bstr()))
            .finish()?;
        write!(f, ")")
    }
}

impl ops::Index<usize> for ByteRecord {
    type Output = [u8];
    fn index(&self, i: usize) -> &[u8] {
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

impl<T: AsRef<[u8]>> From<Vec<T>> for ByteRecord {
    fn from(xs: Vec<T>) -> ByteRecord {
        let mut record = ByteRecord::with_capacity(0, xs.len());
        for x in &xs {
            record.push_field(x.as_ref());
        }
        record
    }
}

impl<T: AsRef<[u8]>> PartialEq<Vec<T>> for ByteRecord {
    fn eq(&self, other: &Vec<T>) -> bool {
        self.len() == other.len()
            && self.iter().zip(other).all(|(a, b)| a == b.as_ref())
    }
}

impl<'a> IntoIterator for &'a ByteRecord {
    type IntoIter = ByteRecordIter<'a>;
    type Item = &'a [u8];
    fn into_iter(self) -> ByteRecordIter<'a> {
        self.iter()
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for ByteRecord {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> result::Result<S::Ok, S::Error> {
        use serde::ser::SerializeSeq;

        struct Bytes<'a>(&'a [u8]);

        impl<'a> serde::Serialize for Bytes<'a> {
            fn serialize<S: serde::Serializer>(
                &self,
                serializer: S,
            ) -> result::Result<S::Ok, S::Error> {
                serializer.serialize_bytes(self.0)
            }
        }

        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for field in self {
            seq.serialize_element(&Bytes(field))?;
        }
        seq.end()
    }
}

/// An iterator over the fields in a byte record.
pub struct ByteRecordIter<'a> {
    r: &'a ByteRecord,
    start: usize,
    i: usize,
}

impl<'a> Iterator for ByteRecordIter<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<&'a [u8]> {
        let end = *self.r.ends.get(self.i)?;
        let field = &self.r.fields[self.start..end];
        self.start = end;
        self.i += 1;
        Some(field)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.r.len() - self.i;
        (n, Some(n))
    }
}

impl<'a> ExactSizeIterator for ByteRecordIter<'a> {}
