/*!
`csv-stream-core` provides the allocation free pieces of a streaming CSV
decoder: a byte classifier, a parse state machine and the prioritized event
set that the state machine emits.

Nothing in this crate performs I/O. A driver feeds one [`Token`] at a time
into [`ParseState::transition`] (or the equivalent precomputed
[`TransitionTable`]) and inspects the [`Events`] that come back. The
`csv-stream` crate is such a driver, built on top of `std::io::Read`.

# Example

This walks a small input through the state machine by hand and counts the
records that were ended.

```
use csv_stream_core::{Events, ParseState, Token};

let mut state = ParseState::Initial;
let mut records = 0;
for &b in b"a,b\nc,d\n" {
    let (next, events) = state.transition(Token::classify(b, b','));
    state = next;
    if events.contains(Events::END_RECORD) {
        records += 1;
    }
}
let (state, events) = state.transition(Token::End);
assert_eq!(state, ParseState::Done);
assert_eq!(events, Events::END);
assert_eq!(records, 2);
```
*/

#![deny(missing_docs)]
#![cfg_attr(not(test), no_std)]

pub use crate::event::Events;
pub use crate::state::{ParseState, TransitionTable};
pub use crate::token::Token;

mod event;
mod state;
mod token;
