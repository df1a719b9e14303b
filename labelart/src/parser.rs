use crate::object::{decode_hex_string, decode_literal_string, Name, Object, ObjectValueError};
use nom::{
    branch::alt,
    bytes::complete::{tag, take_till, take_while},
    character::is_hex_digit,
    combinator::{map, map_res, recognize, value},
    error::{ErrorKind, FromExternalError, ParseError as NomParseError},
    multi::{many0, many0_count},
    number::complete::recognize_float,
    sequence::{delimited, preceded, tuple},
    IResult, InputTakeAtPosition, Parser,
};
use std::{borrow::Cow, str::from_utf8};

// Set `nom::error:VerboseError<&'a[u8]>` for detail error
#[cfg(not(debug_assertions))]
pub type ParseError<'a> = nom::error::Error<&'a [u8]>;
#[cfg(debug_assertions)]
pub type ParseError<'a> = nom::error::VerboseError<&'a [u8]>;
pub type ParseResult<'a, O, E = ParseError<'a>> = IResult<&'a [u8], O, E>;

fn comment(buf: &[u8]) -> ParseResult<'_, ()> {
    let (buf, _) = tag(b"%")(buf)?;
    let (buf, _) = take_till(|c: u8| c == b'\n' || c == b'\r')(buf)?;
    Ok((buf, ()))
}

fn whitespace1<T, E: NomParseError<T>>(input: T) -> IResult<T, T, E>
where
    T: InputTakeAtPosition<Item = u8>,
{
    input.split_at_position1_complete(
        |c| !(c == b' ' || c == b'\t' || c == b'\r' || c == b'\n' || c == b'\x0C' || c == b'\0'),
        ErrorKind::MultiSpace,
    )
}

pub(crate) fn whitespace_or_comment(input: &[u8]) -> ParseResult<'_, ()> {
    value((), many0_count(alt((value((), whitespace1), comment))))(input)
}

pub(crate) fn ws_prefixed<'a, F, O>(inner: F) -> impl FnMut(&'a [u8]) -> ParseResult<'a, O>
where
    F: Parser<&'a [u8], O, ParseError<'a>>,
{
    preceded(whitespace_or_comment, inner)
}

/// A combinator that takes a parser `inner` and produces a parser that also consumes both leading and
/// trailing whitespace, returning the output of `inner`.
fn ws<'a, F, O>(inner: F) -> impl FnMut(&'a [u8]) -> ParseResult<'a, O>
where
    F: Parser<&'a [u8], O, ParseError<'a>>,
{
    delimited(whitespace_or_comment, inner, whitespace_or_comment)
}

/// Return true if `c` ends a regular token, such as number, name or operator.
pub(crate) fn is_delimiter(c: u8) -> bool {
    c.is_ascii_whitespace()
        || c == b'\0'
        || matches!(
            c,
            b'[' | b']' | b'<' | b'>' | b'(' | b')' | b'{' | b'}' | b'/' | b'%'
        )
}

/// Arrays and dictionaries nested deeper than this fail the parse.
pub const MAX_NESTING_DEPTH: usize = 32;

/// Recognize a literal string with balanced parentheses, `\` escapes the next byte.
fn parse_quoted_string(input: &[u8]) -> ParseResult<'_, &[u8]> {
    let err = || nom::Err::Error(ParseError::from_error_kind(input, ErrorKind::Char));
    if input.first() != Some(&b'(') {
        return Err(err());
    }

    let mut depth = 0_usize;
    let mut i = 0;
    while i < input.len() {
        match input[i] {
            b'\\' => i += 1,
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Ok((&input[i + 1..], &input[..=i]));
                }
            }
            _ => {}
        }
        i += 1;
    }
    Err(err())
}

pub fn parse_object(buf: &[u8]) -> ParseResult<'_, Object> {
    parse_nested_object(buf, 0)
}

fn parse_nested_object<'a>(buf: &'a [u8], depth: usize) -> ParseResult<'a, Object> {
    let null = value(Object::Null, tag(b"null"));
    let true_parser = value(Object::Bool(true), tag(b"true"));
    let false_parser = value(Object::Bool(false), tag(b"false"));

    let parse_quoted_string = map(parse_quoted_string, |s| {
        Object::String(decode_literal_string(s))
    });
    let parse_hex_string = map_res(
        recognize(delimited(
            tag(b"<"),
            take_while(|c: u8| is_hex_digit(c) || c.is_ascii_whitespace()),
            tag(b">"),
        )),
        |buf| decode_hex_string(buf).map(Object::String),
    );

    alt((
        map(parse_name, Object::Name),
        parse_quoted_string,
        map(move |i: &'a [u8]| parse_nested_dict(i, depth), Object::Dictionary),
        map(move |i: &'a [u8]| parse_nested_array(i, depth), Object::Array),
        parse_hex_string,
        null,
        true_parser,
        false_parser,
        parse_number,
    ))(buf)
}

fn check_depth(input: &[u8], depth: usize) -> ParseResult<'_, ()> {
    if depth >= MAX_NESTING_DEPTH {
        return Err(nom::Err::Failure(ParseError::from_error_kind(
            input,
            ErrorKind::TooLarge,
        )));
    }
    Ok((input, ()))
}

fn parse_number(input: &[u8]) -> ParseResult<'_, Object> {
    let (remains, s) = recognize_float(input)?;
    // `1.5.3` or `12abc` is not a number followed by an operator
    if remains.first().is_some_and(|c| !is_delimiter(*c)) {
        return Err(nom::Err::Error(ParseError::from_error_kind(
            input,
            ErrorKind::Float,
        )));
    }
    let v = from_utf8(s)
        .ok()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| nom::Err::Error(ParseError::from_error_kind(input, ErrorKind::Float)))?;
    Ok((remains, Object::Number(v)))
}

/// Return `Err(ObjectValueError::InvalidNameFormat)` if the name is not a valid PDF name encoding,
/// not two hex char after `#`.
fn normalize_name(buf: &[u8]) -> Result<Cow<'_, [u8]>, ObjectValueError> {
    fn next_hex_char(iter: &mut impl Iterator<Item = u8>) -> Option<u8> {
        let mut result = 0;
        for _ in 0..2 {
            let c = iter.next()?;
            result <<= 4;
            result |= match c {
                b'0'..=b'9' => c - b'0',
                b'a'..=b'f' => c - b'a' + 10,
                b'A'..=b'F' => c - b'A' + 10,
                _ => return None,
            };
        }
        Some(result)
    }

    let s = &buf[1..];
    if s.iter().copied().any(|b| b == b'#') {
        let mut result = Vec::with_capacity(s.len());
        let mut iter = s.iter().copied();
        while let Some(next) = iter.next() {
            if next == b'#' {
                let c = next_hex_char(&mut iter).ok_or(ObjectValueError::InvalidNameFormat)?;
                result.push(c);
            } else {
                result.push(next);
            }
        }
        Ok(Cow::Owned(result))
    } else {
        Ok(Cow::Borrowed(s))
    }
}

fn parse_name(input: &[u8]) -> ParseResult<'_, Name> {
    let (input, buf) = recognize(preceded(tag(b"/"), take_till(is_delimiter)))(input)?;
    let name = normalize_name(buf)
        .map_err(|e| nom::Err::Error(ParseError::from_external_error(input, ErrorKind::Fail, e)))
        .map(|s| Name(String::from_utf8_lossy(&s).into_owned()))?;
    Ok((input, name))
}

pub fn parse_array(input: &[u8]) -> ParseResult<'_, Vec<Object>> {
    parse_nested_array(input, 0)
}

fn parse_nested_array<'a>(input: &'a [u8], depth: usize) -> ParseResult<'a, Vec<Object>> {
    let (input, _) = ws(tag(b"["))(input)?;
    let (input, _) = check_depth(input, depth)?;
    let (input, r) = many0(ws(move |i: &'a [u8]| parse_nested_object(i, depth + 1)))(input)?;
    let (input, _) = tag(b"]")(input)?;
    Ok((input, r))
}

pub fn parse_dict(input: &[u8]) -> ParseResult<'_, Vec<(Name, Object)>> {
    parse_nested_dict(input, 0)
}

fn parse_nested_dict<'a>(
    input: &'a [u8],
    depth: usize,
) -> ParseResult<'a, Vec<(Name, Object)>> {
    let (input, _) = ws(tag(b"<<".as_slice()))(input)?;
    let (input, _) = check_depth(input, depth)?;
    let (input, r) = many0(tuple((
        parse_name,
        ws(move |i: &'a [u8]| parse_nested_object(i, depth + 1)),
    )))(input)?;
    let (input, _) = tag(b">>")(input)?;
    Ok((input, r))
}
