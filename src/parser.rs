//! Handles parsing of free-form pitch-class set inputs.
//!
//! Input is split into tokens on any run of whitespace and/or commas. Each
//! token is then recognized independently as either an integer or a note
//! name, so a single bad token can be reported by name.

use combine::parser::char::digit;
use combine::{eof, many1, one_of, optional, satisfy_map, ParseError, Parser, Stream};
use tracing::debug;

use crate::error::{Error, Result};
use crate::pitch::{NoteClass, PitchClass, PitchClassSet};

/// Maps an (uppercased) accidental marker to its semitone offset.
fn accidental_offset(input: char) -> Option<i64> {
    match input {
        '#' | '♯' =>  Some(1),
        'B' | '♭' => Some(-1),
        _ => None
    }
}

/// Parses a signed integer, reducing it modulo 12.
///
/// Digits are folded into the residue as they are read, so arbitrarily long
/// inputs never overflow.
///
/// ```text
/// Integer : ('+' | '-')? [0-9]+
///         ;
/// ```
fn integer<Input>() -> impl Parser<Input, Output = PitchClass>
where
    Input: Stream<Token = char>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    let sign =
        optional(one_of("+-".chars()))
            .map(|s| if s == Some('-') { -1i64 } else { 1 });

    let residue =
        many1::<Vec<char>, _, _>(digit())
            .map(|digits| {
                digits
                    .iter()
                    .filter_map(|d| d.to_digit(10))
                    .fold(0i64, |acc, d| (acc * 10 + d as i64) % 12)
            })
            .expected("Integer: [0-9]+");

    (sign, residue).map(|(sign, residue)| PitchClass::new(sign * residue))
}

/// Parses an uppercased note name with at most one accidental.
///
/// Accidentals are applied modulo 12, which resolves enharmonic spellings
/// such as `B#` to `C` and `FB` to `E`.
///
/// ```text
/// Accidental : '#' | 'B' | '♯' | '♭'
///            ;
///
/// NoteName : [A-G] Accidental?
///          ;
/// ```
fn note_name<Input>() -> impl Parser<Input, Output = PitchClass>
where
    Input: Stream<Token = char>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    let letter =
        satisfy_map(NoteClass::from_char)
            .expected("Note: [A-G]");

    let offset =
        optional(satisfy_map(accidental_offset))
            .map(|offset| offset.unwrap_or(0))
            .expected("Accidental: [#b♯♭]");

    (letter, offset)
        .map(|(letter, offset): (NoteClass, i64)| letter.pitch_class().shifted(offset))
}

/// Recognizes a complete token as either an integer or a note name.
///
/// ```text
/// Token : Integer | NoteName
///       ;
/// ```
fn pitch_class<Input>() -> impl Parser<Input, Output = PitchClass>
where
    Input: Stream<Token = char>,
    Input::Error: ParseError<Input::Token, Input::Range, Input::Position>,
{
    integer().or(note_name()).skip(eof())
}

/// Splits input on whitespace and commas, discarding empty tokens.
fn tokens(input: &str) -> impl Iterator<Item = &str> {
    input
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty())
}

/// Parses a single token into a `PitchClass`.
///
/// Note names are case-insensitive. The token is echoed back unchanged in
/// the error if it is not recognized.
pub fn parse_token(token: &str) -> Result<PitchClass> {
    let upper = token.to_uppercase();

    let parsed = pitch_class()
        .parse(upper.as_str())
        .map(|(pc, _)| pc)
        .map_err(|_| Error::Parse { token: token.to_string() });
    parsed
}

/// Parses free-form text into a `PitchClassSet`.
///
/// Empty input (or input made only of separators) yields an empty set.
pub fn parse_set(input: &str) -> Result<PitchClassSet> {
    let set = tokens(input)
        .map(parse_token)
        .collect::<Result<PitchClassSet>>()?;

    debug!(%set, "parsed pitch-class set");
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(input: &str) -> Vec<u8> {
        parse_set(input).unwrap().values()
    }

    #[test]
    fn parse_naturals() {
        assert_eq!(values("C E G"), vec![0, 4, 7]);
        assert_eq!(values("A B"), vec![9, 11]);
    }

    #[test]
    fn parse_accidentals() {
        assert_eq!(values("C Eb G Bb"), vec![0, 3, 7, 10]);
        assert_eq!(values("F# C#"), vec![1, 6]);
        assert_eq!(values("G♭ A♯"), vec![6, 10]);
    }

    #[test]
    fn parse_enharmonic_equivalents() {
        assert_eq!(parse_token("B#").unwrap(), PitchClass::new(0));
        assert_eq!(parse_token("Fb").unwrap(), PitchClass::new(4));
        assert_eq!(parse_token("E#").unwrap(), PitchClass::new(5));
        assert_eq!(parse_token("Cb").unwrap(), PitchClass::new(11));
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(parse_token("bb").unwrap(), PitchClass::new(10));
        assert_eq!(parse_token("eB").unwrap(), PitchClass::new(3));
        assert_eq!(parse_token("c").unwrap(), PitchClass::new(0));
    }

    #[test]
    fn parse_integers_modulo_twelve() {
        assert_eq!(values("0 4 7"), vec![0, 4, 7]);
        assert_eq!(values("12 16 19"), vec![0, 4, 7]);
        assert_eq!(values("-1 +2"), vec![2, 11]);
        assert_eq!(parse_token("-13").unwrap(), PitchClass::new(11));
    }

    #[test]
    fn parse_long_integers() {
        let token = "123456789012345678901234567890";
        assert_eq!(parse_token(token).unwrap(), PitchClass::new(6));
        assert_eq!(parse_token(&format!("-{}", token)).unwrap(), PitchClass::new(6));
    }

    #[test]
    fn parse_mixed_separators() {
        assert_eq!(values(" C,E ,, G\t4\n"), vec![0, 4, 7]);
        assert_eq!(values("0,3,7"), vec![0, 3, 7]);
    }

    #[test]
    fn parse_deduplicates() {
        assert_eq!(values("C B# 0 12 -12"), vec![0]);
    }

    #[test]
    fn parse_empty_input() {
        assert!(parse_set("").unwrap().is_empty());
        assert!(parse_set("  , ,\n").unwrap().is_empty());
    }

    #[test]
    fn parse_unrecognized_token() {
        match parse_set("C xyz G") {
            Err(Error::Parse { token }) => assert_eq!(token, "xyz"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn parse_rejects_trailing_junk() {
        assert!(parse_token("C##").is_err());
        assert!(parse_token("Bbasd").is_err());
        assert!(parse_token("4a").is_err());
        assert!(parse_token("H").is_err());
        assert!(parse_token("+").is_err());
        assert!(parse_token("-").is_err());
    }
}
