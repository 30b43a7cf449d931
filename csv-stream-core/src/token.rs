/// The class of a single input byte with respect to CSV grammar.
///
/// Tokens are produced fresh for every byte and are never stored. Which
/// class a byte lands in depends only on the byte and the configured
/// delimiter.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Token {
    /// Either `\n` or `\r`.
    Newline = 0,
    /// The quote byte, `"`.
    Quote = 1,
    /// The configured field delimiter.
    Delimiter = 2,
    /// Any other byte.
    Byte = 3,
    /// Synthetic token marking the end of input.
    End = 4,
    /// A sentinel that the classifier never produces. Every parse state
    /// rejects it.
    Invalid = 5,
}

/// The number of distinct tokens, and therefore the number of columns in a
/// transition table.
pub(crate) const TOKENS: usize = 6;

/// All tokens in column order.
pub(crate) const ALL_TOKENS: [Token; TOKENS] = [
    Token::Newline,
    Token::Quote,
    Token::Delimiter,
    Token::Byte,
    Token::End,
    Token::Invalid,
];

impl Token {
    /// Classify `b` given the field `delimiter`.
    ///
    /// Newlines and quotes are recognized before the delimiter, so a
    /// delimiter equal to `"`, `\n` or `\r` is never reported as such.
    #[inline(always)]
    pub const fn classify(b: u8, delimiter: u8) -> Token {
        match b {
            b'\n' | b'\r' => Token::Newline,
            b'"' => Token::Quote,
            _ if b == delimiter => Token::Delimiter,
            _ => Token::Byte,
        }
    }
}
