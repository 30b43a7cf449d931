use std::io::{self, Read};

use csv_stream::{ByteRecord, Decoder, DecoderBuilder, ErrorKind, StringRecord};

fn decode(data: &str) -> csv_stream::Result<Vec<Vec<String>>> {
    Decoder::from_reader(data.as_bytes()).strings_all()
}

/// Hands out its input in fixed size pieces, like a socket would.
#[derive(Debug)]
struct ChunkReader<'a> {
    chunk: usize,
    data: &'a [u8],
}

impl<'a> Read for ChunkReader<'a> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.chunk.min(buf.len()).min(self.data.len());
        buf[..n].copy_from_slice(&self.data[..n]);
        self.data = &self.data[n..];
        Ok(n)
    }
}

#[test]
fn quoted_newlines_and_quotes() {
    let got = decode("\"a\",s\n\"d\nf\",\"g\"\"\"").unwrap();
    assert_eq!(got, vec![vec!["a", "s"], vec!["d\nf", "g\""]]);
}

#[test]
fn doubled_quote() {
    assert_eq!(decode("\"g\"\"\"").unwrap(), vec![vec!["g\""]]);
}

#[test]
fn empty_cells() {
    assert_eq!(decode("a,").unwrap(), vec![vec!["a", ""]]);
    assert_eq!(decode(",,").unwrap(), vec![vec!["", "", ""]]);
    assert_eq!(decode(",\n").unwrap(), vec![vec!["", ""]]);
}

#[test]
fn line_terminators() {
    let want = vec![vec!["a"], vec!["b"], vec!["c"], vec!["d"]];
    assert_eq!(decode("a\nb\rc\r\nd").unwrap(), want);
    assert_eq!(decode("a\n\n\nb\r\r\nc\n\r\nd\n\n").unwrap(), want);
}

#[test]
fn skips_blank_lines() {
    let data = "a\n\n\n,\n\ns,d,\n,f,g,h\n";
    let got = decode(data).unwrap();
    assert_eq!(
        got,
        vec![
            vec!["a"],
            vec!["", ""],
            vec!["s", "d", ""],
            vec!["", "f", "g", "h"],
        ]
    );

    let mut rdr = Decoder::from_reader(data.as_bytes());
    let mut count = 0;
    while rdr.next_record().unwrap() {
        count += 1;
    }
    assert_eq!(count, 4);
}

#[test]
fn quote_inside_unquoted_cell() {
    let err = decode("a,s\",d,f").unwrap_err();
    assert_eq!(err.to_string(), "line 1, column 4: unexpected byte '\"'");
    assert_eq!(err.byte(), b'"');
    assert!(err.is_grammar_error());
}

#[test]
fn garbage_after_closing_quote() {
    let err = decode("\"ab\"c").unwrap_err();
    assert_eq!(err.to_string(), "line 1, column 5: unexpected byte 'c'");
}

#[test]
fn unterminated_quoted_cell() {
    let err = decode("a,\"b\nc").unwrap_err();
    match *err.kind() {
        ErrorKind::UnexpectedEof => {}
        ref kind => panic!("unexpected error: {:?}", kind),
    }
    assert_eq!(err.position().line(), 2);
    assert_eq!(err.position().column(), 1);
}

#[test]
fn semicolon_delimiter() {
    let mut rdr = DecoderBuilder::new()
        .delimiter(b';')
        .from_reader(&b"a;\"b;c\";d,e\n"[..]);
    let got = rdr.strings_all().unwrap();
    assert_eq!(got, vec![vec!["a", "b;c", "d,e"]]);
}

#[test]
fn chunked_source() {
    let data = b"col_a,col_b\n\"0a\naa\",0bbbb\n1aaaa,\"1b\"\"b\"\n";
    for chunk in 1..8 {
        let src = ChunkReader { chunk, data: &data[..] };
        let mut rdr = DecoderBuilder::new().buffer_capacity(3).from_reader(src);
        let got: Vec<ByteRecord> =
            rdr.byte_records().collect::<Result<_, _>>().unwrap();
        assert_eq!(got.len(), 3, "chunk size {}", chunk);
        assert_eq!(got[0], vec!["col_a", "col_b"]);
        assert_eq!(got[1], vec!["0a\naa", "0bbbb"]);
        assert_eq!(got[2], vec!["1aaaa", "1b\"b"]);
        assert_eq!(rdr.position().byte(), data.len() as u64);
    }
}

#[test]
fn zero_capacity_buffer() {
    let got = DecoderBuilder::new()
        .buffer_capacity(0)
        .from_reader(&b"a,b\nc,d\n"[..])
        .strings_all()
        .unwrap();
    assert_eq!(got, vec![vec!["a", "b"], vec!["c", "d"]]);
}

#[test]
fn read_records_into_one_buffer() {
    let mut rdr = Decoder::from_reader(&b"a,b\nc\n"[..]);
    let mut rec = StringRecord::new();
    let mut lens = vec![];
    while rdr.read_record(&mut rec).unwrap() {
        lens.push(rec.len());
    }
    assert_eq!(lens, vec![2, 1]);
    assert!(rdr.is_done());
}

#[test]
fn cell_as_reader() {
    let mut rdr = Decoder::from_reader(&b"id,\"line one\nline two\"\n"[..]);
    assert!(rdr.next_record().unwrap());
    assert!(rdr.next_cell().unwrap());
    assert!(rdr.next_cell().unwrap());

    let mut text = String::new();
    rdr.read_to_string(&mut text).unwrap();
    assert_eq!(text, "line one\nline two");
    assert_eq!(rdr.read(&mut [0; 4]).unwrap(), 0);
    assert!(!rdr.next_cell().unwrap());
}

#[test]
fn error_is_repeated() {
    let mut rdr = Decoder::from_reader(&b"a\nb\"c\nd\n"[..]);
    assert_eq!(rdr.strings_record().unwrap(), Some(vec!["a".to_string()]));

    let first = rdr.strings_record().unwrap_err();
    for _ in 0..3 {
        let again = rdr.next_record().unwrap_err();
        assert_eq!(first.to_string(), again.to_string());
        assert_eq!(first.position(), again.position());
    }
    assert_eq!(rdr.error().map(|e| e.byte()), Some(b'"'));
}

#[cfg(feature = "serde")]
#[test]
fn serialize_records() {
    let mut rdr = Decoder::from_reader(&b"a,\"b\"\"\"\n"[..]);
    let rec = rdr.records().next().unwrap().unwrap();
    assert_eq!(serde_json::to_string(&rec).unwrap(), r#"["a","b\""]"#);
}
