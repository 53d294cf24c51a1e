//! Low-level grammar fragments for the slice of RFC 2812's Augmented BNF this
//! server actually speaks. Built with `nom` combinators, the same way the
//! protocol's `<nickname>`, `<channel>` and `<trailing>` productions are
//! parsed in every other server of this lineage.
//!
//! ```text
//! message    =  [ ":" prefix SPACE ] command [ params ] crlf
//! params     =  *14( SPACE middle ) [ SPACE ":" trailing ]
//! nospcrlfcl =  any octet except NUL, CR, LF, " " and ":"
//! middle     =  nospcrlfcl *( ":" / nospcrlfcl )
//! trailing   =  *( ":" / " " / nospcrlfcl )
//! ```

use nom::{
    IResult, Parser,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::satisfy,
    combinator::{recognize, verify},
    sequence::pair,
};

use crate::constants::NICKNAME_MAX_LENGTH;

fn is_nospcrlfcl(c: u8) -> bool {
    matches!(c, 0x01..=0x09 | 0x0B..=0x0C | 0x0E..=0x1F | 0x21..=0x39 | 0x3B..=0xFF)
}

/// `middle = nospcrlfcl *( ":" / nospcrlfcl )`
pub fn middle_parser(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii() && is_nospcrlfcl(c as u8)).parse(input)
}

/// `trailing = *( ":" / " " / nospcrlfcl )`. Greedy: consumes the rest of
/// the line once the leading `:` has already been stripped by the caller.
pub fn trailing_parser(input: &str) -> IResult<&str, &str> {
    take_while(|_: char| true).parse(input)
}

fn is_nickname_first_char(c: char) -> bool {
    c.is_ascii_alphabetic()
}

fn is_nickname_tail_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "_-[]\\`^{}".contains(c)
}

/// Validates a nickname against this server's rule: starts with a letter,
/// at most [`NICKNAME_MAX_LENGTH`] characters total, remaining characters
/// drawn from the usual IRC "special" set plus `_`.
pub fn nickname_parser(input: &str) -> IResult<&str, &str> {
    let first = satisfy(is_nickname_first_char);
    let tail = take_while(is_nickname_tail_char);
    let parser = recognize(pair(first, tail));
    verify(parser, |s: &str| s.len() <= NICKNAME_MAX_LENGTH).parse(input)
}

fn is_chan_char(c: char) -> bool {
    !matches!(c, '\u{0000}' | '\u{0007}' | '\r' | '\n' | ' ' | ',' | ':') && (c as u32) <= 0xFF
}

/// `channel = "#" chanstring`, restricted to this server's single accepted
/// prefix (`#`) per the Channel data model.
pub fn channel_parser(input: &str) -> IResult<&str, &str> {
    recognize(pair(tag("#"), take_while1(is_chan_char))).parse(input)
}
