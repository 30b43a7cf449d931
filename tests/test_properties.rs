use csv_stream::{ByteRecord, Decoder, DecoderBuilder};
use proptest::prelude::*;

/// Cells as seen through `next_record`, `next_cell` and `next_byte`, or the
/// rendered error that stopped the walk.
fn walk(data: &[u8], capacity: usize) -> Result<Vec<Vec<Vec<u8>>>, String> {
    let mut rdr =
        DecoderBuilder::new().buffer_capacity(capacity).from_reader(data);
    let mut records = vec![];
    loop {
        match rdr.next_record() {
            Ok(true) => {}
            Ok(false) => return Ok(records),
            Err(err) => return Err(err.to_string()),
        }
        let mut record = vec![];
        loop {
            match rdr.next_cell() {
                Ok(true) => {}
                Ok(false) => break,
                Err(err) => return Err(err.to_string()),
            }
            let mut cell = vec![];
            loop {
                match rdr.next_byte() {
                    Ok(Some(b)) => cell.push(b),
                    Ok(None) => break,
                    Err(err) => return Err(err.to_string()),
                }
            }
            record.push(cell);
        }
        records.push(record);
    }
}

/// The same as `walk`, but through `read_byte_record`.
fn accumulate(data: &[u8]) -> Result<Vec<Vec<Vec<u8>>>, String> {
    let mut rdr = Decoder::from_reader(data);
    let mut rec = ByteRecord::new();
    let mut records = vec![];
    loop {
        match rdr.read_byte_record(&mut rec) {
            Ok(true) => records.push(rec.iter().map(|f| f.to_vec()).collect()),
            Ok(false) => return Ok(records),
            Err(err) => return Err(err.to_string()),
        }
    }
}

/// Quote every cell so that empty and single cell records survive.
fn encode(records: &[Vec<String>]) -> String {
    let mut out = String::new();
    for record in records {
        let cells: Vec<String> = record
            .iter()
            .map(|cell| format!("\"{}\"", cell.replace('"', "\"\"")))
            .collect();
        out.push_str(&cells.join(","));
        out.push('\n');
    }
    out
}

/// Decode quote free data by splitting on newlines and then on commas.
fn split(data: &str) -> Vec<Vec<String>> {
    data.split(|c: char| c == '\n' || c == '\r')
        .filter(|line| !line.is_empty())
        .map(|line| line.split(',').map(String::from).collect())
        .collect()
}

fn records() -> impl Strategy<Value = Vec<Vec<String>>> {
    let cell = "[a-c ,\"\n\r]{0,6}";
    prop::collection::vec(prop::collection::vec(cell, 1..5), 0..8)
}

proptest! {
    #[test]
    fn walk_matches_accumulate(data in "[ab,\"\n\r]{0,40}") {
        let data = data.as_bytes();
        prop_assert_eq!(walk(data, 8 * 1024), accumulate(data));
    }

    #[test]
    fn buffering_is_invisible(data in "[ab,\"\n\r]{0,40}", capacity in 0usize..6) {
        let data = data.as_bytes();
        prop_assert_eq!(walk(data, capacity), walk(data, 8 * 1024));
    }

    #[test]
    fn quoted_round_trip(records in records()) {
        let data = encode(&records);
        let got = Decoder::from_reader(data.as_bytes()).strings_all().unwrap();
        prop_assert_eq!(got, records);
    }

    #[test]
    fn arbitrary_bytes_never_panic(data in prop::collection::vec(any::<u8>(), 0..64)) {
        let mut rdr = Decoder::from_reader(&data[..]);
        let mut rec = ByteRecord::new();
        while let Ok(true) = rdr.read_byte_record(&mut rec) {}
        prop_assert!(rdr.position().byte() <= data.len() as u64);
    }

    #[test]
    fn unquoted_matches_split(data in "[ab,\n\r]{0,40}") {
        let got = Decoder::from_reader(data.as_bytes()).strings_all().unwrap();
        prop_assert_eq!(got, split(&data));
    }

    #[test]
    fn unquoted_round_trip(
        records in prop::collection::vec(
            prop::collection::vec("[a-c ]{1,4}", 1..5),
            0..8,
        )
    ) {
        let data: String = records
            .iter()
            .map(|record| record.join(",") + "\n")
            .collect();
        let got = Decoder::from_reader(data.as_bytes()).strings_all().unwrap();
        prop_assert_eq!(got, records);
    }
}
