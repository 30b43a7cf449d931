use crate::event::Events;
use crate::token::{Token, ALL_TOKENS, TOKENS};

/// The state of a CSV parser between two tokens.
///
/// Transitions are a pure function of the current state and the next token.
/// `Done` and `Error` are terminal: feeding them any further token yields
/// `Error`.
///
/// Cell boundaries are only known in hindsight. A cell ends when the token
/// after it is seen, which is why `Delimiter`, `Newline` and `End` never
/// carry a `BYTE` event but do carry `NEW_CELL` or `END_RECORD` for what
/// follows them.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ParseState {
    /// Start of the stream or of a record.
    Initial = 0,
    /// Inside a cell that did not start with a quote.
    UnquotedCell = 1,
    /// Inside a quoted cell.
    QuotedCell = 2,
    /// A quote was seen inside a quoted cell. It either closes the cell or
    /// is the first half of a doubled quote.
    QuotedCellQuote = 3,
    /// A delimiter was just consumed and the next cell has not started.
    Delimiter = 4,
    /// The stream ended cleanly.
    Done = 5,
    /// The input violated CSV grammar.
    Error = 6,
}

/// The number of parse states, and therefore rows in a transition table.
const STATES: usize = 7;

const ALL_STATES: [ParseState; STATES] = [
    ParseState::Initial,
    ParseState::UnquotedCell,
    ParseState::QuotedCell,
    ParseState::QuotedCellQuote,
    ParseState::Delimiter,
    ParseState::Done,
    ParseState::Error,
];

const NONE: Events = Events::empty();
const NEW_CELL: Events = Events::NEW_CELL;
const NEW_CELL_BYTE: Events = Events::NEW_CELL.union(Events::BYTE);
const BYTE: Events = Events::BYTE;
const END_RECORD: Events = Events::END_RECORD;
const END_RECORD_END: Events = Events::END_RECORD.union(Events::END);
const NEW_CELL_END_RECORD: Events =
    Events::NEW_CELL.union(Events::END_RECORD);
const NEW_CELL_END_RECORD_END: Events =
    NEW_CELL_END_RECORD.union(Events::END);
const END: Events = Events::END;
const ERROR: Events = Events::ERROR;

impl ParseState {
    /// Feed `token` to this state, returning the next state and the events
    /// emitted by the transition.
    ///
    /// Any pair that CSV grammar does not allow moves to `Error` and emits
    /// `Events::ERROR`. Nothing is ever silently ignored.
    #[inline]
    pub const fn transition(self, token: Token) -> (ParseState, Events) {
        use self::ParseState::*;

        match self {
            Initial => initial(token),
            UnquotedCell => unquoted_cell(token),
            QuotedCell => quoted_cell(token),
            QuotedCellQuote => quoted_cell_quote(token),
            Delimiter => delimiter(token),
            Done | Error => (Error, ERROR),
        }
    }

    /// Returns true if no token can move this state anywhere but `Error`.
    pub const fn is_terminal(self) -> bool {
        match self {
            ParseState::Done | ParseState::Error => true,
            _ => false,
        }
    }
}

#[inline(always)]
const fn initial(token: Token) -> (ParseState, Events) {
    use self::ParseState::*;

    match token {
        Token::Quote => (QuotedCell, NEW_CELL),
        Token::Byte => (UnquotedCell, NEW_CELL_BYTE),
        Token::Newline => (Initial, NONE),
        Token::End => (Done, END),
        Token::Delimiter => (Delimiter, NEW_CELL),
        Token::Invalid => (Error, ERROR),
    }
}

#[inline(always)]
const fn unquoted_cell(token: Token) -> (ParseState, Events) {
    match token {
        Token::Byte => (ParseState::UnquotedCell, BYTE),
        _ => end_cell(token),
    }
}

#[inline(always)]
const fn quoted_cell(token: Token) -> (ParseState, Events) {
    use self::ParseState::*;

    match token {
        Token::Quote => (QuotedCellQuote, NONE),
        Token::Byte | Token::Newline | Token::Delimiter => (QuotedCell, BYTE),
        Token::End | Token::Invalid => (Error, ERROR),
    }
}

#[inline(always)]
const fn quoted_cell_quote(token: Token) -> (ParseState, Events) {
    match token {
        Token::Quote => (ParseState::QuotedCell, BYTE),
        _ => end_cell(token),
    }
}

/// Shared by every state that may be sitting at the end of a cell.
#[inline(always)]
const fn end_cell(token: Token) -> (ParseState, Events) {
    use self::ParseState::*;

    match token {
        Token::Delimiter => (Delimiter, NONE),
        Token::Newline => (Initial, END_RECORD),
        Token::End => (Done, END_RECORD_END),
        Token::Quote | Token::Byte | Token::Invalid => (Error, ERROR),
    }
}

#[inline(always)]
const fn delimiter(token: Token) -> (ParseState, Events) {
    use self::ParseState::*;

    match token {
        Token::Quote => (QuotedCell, NEW_CELL),
        Token::Byte => (UnquotedCell, NEW_CELL_BYTE),
        Token::Newline => (Initial, NEW_CELL_END_RECORD),
        Token::End => (Done, NEW_CELL_END_RECORD_END),
        Token::Delimiter => (Delimiter, NEW_CELL),
        Token::Invalid => (Error, ERROR),
    }
}

/// A dense transition table indexed by `(ParseState, Token)`.
///
/// The table is computed at compile time from [`ParseState::transition`],
/// so the two always agree. Drivers that feed many bytes may prefer the
/// table lookup over the nested matches.
#[derive(Clone, Copy)]
pub struct TransitionTable {
    trans: [[(ParseState, Events); TOKENS]; STATES],
}

impl TransitionTable {
    /// The transition table for CSV grammar.
    pub const CSV: TransitionTable = TransitionTable::build();

    const fn build() -> TransitionTable {
        let mut trans = [[(ParseState::Error, ERROR); TOKENS]; STATES];
        let mut si = 0;
        while si < STATES {
            let mut ti = 0;
            while ti < TOKENS {
                trans[si][ti] = ALL_STATES[si].transition(ALL_TOKENS[ti]);
                ti += 1;
            }
            si += 1;
        }
        TransitionTable { trans }
    }

    /// Look up the next state and events for `state` given `token`.
    #[inline(always)]
    pub fn get(&self, state: ParseState, token: Token) -> (ParseState, Events) {
        self.trans[state as usize][token as usize]
    }
}

impl core::fmt::Debug for TransitionTable {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "TransitionTable({}x{})", STATES, TOKENS)
    }
}
