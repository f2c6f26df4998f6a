//! nom grammar for VRML 2.0 text
//!
//! The grammar produces an owned, boxed tree of [`RawNode`]s, which is then
//! flattened into a [`Document`](super::Document) arena.
use super::model::{FieldValue, NodeId, Vec2f, Vec3f, Vec4f};
use crate::error::ParseError;
use nom::{
    IResult,
    branch::alt,
    bytes::complete::{tag, take_while},
    character::complete::{
        char, digit0, digit1, hex_digit1, multispace1, not_line_ending,
        one_of, satisfy,
    },
    combinator::{all_consuming, cut, map, map_res, opt, recognize, value, verify},
    error::{ErrorKind, ParseError as NomParseError, VerboseError, context},
    multi::{many_m_n, many0, many0_count, many1},
    sequence::{pair, preceded, terminated, tuple},
};

type Res<'a, T> = IResult<&'a str, T, VerboseError<&'a str>>;

/// Literal which must open every file
pub const HEADER: &str = "#VRML V2.0 utf8";

/// Node as parsed, before being stored in an arena
#[derive(Debug)]
pub(crate) struct RawNode {
    pub alias: Option<String>,
    pub header: String,
    pub fields: Vec<(String, RawValue)>,
}

#[derive(Debug)]
pub(crate) enum RawValue {
    Plain(FieldValue),
    Node(Box<RawNode>),
    Use(String),
    NodeArray(Vec<RawEntry>),
}

#[derive(Debug)]
pub(crate) enum RawEntry {
    Node(RawNode),
    Use(String),
}

#[derive(Copy, Clone, Debug, PartialEq)]
enum Number {
    Int(i32),
    Float(f32),
}

impl Number {
    fn to_f32(self) -> f32 {
        match self {
            Number::Int(i) => i as f32,
            Number::Float(f) => f,
        }
    }
}

/// Parses a whole document, failing unless every byte is consumed
pub(crate) fn parse_document(input: &str) -> Result<Vec<RawNode>, ParseError> {
    match all_consuming(document)(input) {
        Ok((_, nodes)) => Ok(nodes),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            Err(ParseError::Syntax(nom::error::convert_error(input, e)))
        }
        Err(nom::Err::Incomplete(_)) => {
            Err(ParseError::Syntax("incomplete input".to_owned()))
        }
    }
}

////////////////////////////////////////////////////////////////////////////////

fn document(i: &str) -> Res<'_, Vec<RawNode>> {
    let (i, _) =
        context("file header", pair(tag(HEADER), not_line_ending))(i)?;
    terminated(many0(preceded(sep, node)), sep)(i)
}

fn comment(i: &str) -> Res<'_, &str> {
    recognize(pair(char('#'), not_line_ending))(i)
}

/// Skips whitespace, comments, and commas
fn sep(i: &str) -> Res<'_, ()> {
    value((), many0_count(alt((multispace1, comment, tag(",")))))(i)
}

/// Skips whitespace and comments, leaving commas in place
fn sp(i: &str) -> Res<'_, ()> {
    value((), many0_count(alt((multispace1, comment))))(i)
}

fn is_reserved(c: char) -> bool {
    c <= ' ' || c == '\x7f' || "\"'+,-.[]{}\\#".contains(c)
}

fn identifier(i: &str) -> Res<'_, &str> {
    recognize(pair(
        satisfy(|c| !is_reserved(c) && !c.is_ascii_digit()),
        take_while(|c| !is_reserved(c)),
    ))(i)
}

fn keyword<'a>(kw: &'static str) -> impl FnMut(&'a str) -> Res<'a, &'a str> {
    verify(identifier, move |s: &str| s == kw)
}

////////////////////////////////////////////////////////////////////////////////

fn node(i: &str) -> Res<'_, RawNode> {
    let (i, alias) =
        opt(terminated(preceded(pair(keyword("DEF"), sep), identifier), sep))(
            i,
        )?;
    let (i, header) = identifier(i)?;
    let (i, _) = preceded(sep, char('{'))(i)?;
    let (i, fields) = context("node body", many0(preceded(sep, field)))(i)?;
    let (i, _) = context("closing brace", cut(preceded(sep, char('}'))))(i)?;
    Ok((
        i,
        RawNode {
            alias: alias.map(str::to_owned),
            header: header.to_owned(),
            fields,
        },
    ))
}

fn field(i: &str) -> Res<'_, (String, RawValue)> {
    let (i, name) = identifier(i)?;
    let (i, value) = context("field value", preceded(sep, field_value))(i)?;
    Ok((i, (name.to_owned(), value)))
}

fn field_value(i: &str) -> Res<'_, RawValue> {
    alt((
        map(keyword("NULL"), |_| {
            RawValue::Plain(FieldValue::Node(NodeId::EMPTY))
        }),
        map(node, |n| RawValue::Node(Box::new(n))),
        map(use_ref, RawValue::Use),
        map(empty_array, RawValue::Plain),
        map(node_array, RawValue::NodeArray),
        map(string_array, |s| RawValue::Plain(FieldValue::StringArray(s))),
        map(numeric_array, RawValue::Plain),
        map(quoted, |s| RawValue::Plain(FieldValue::String(s))),
        map(boolean, |b| RawValue::Plain(FieldValue::Bool(b))),
        map(numbers, RawValue::Plain),
    ))(i)
}

fn use_ref(i: &str) -> Res<'_, String> {
    map(preceded(pair(keyword("USE"), sep), identifier), str::to_owned)(i)
}

fn empty_array(i: &str) -> Res<'_, FieldValue> {
    value(
        FieldValue::Vec3fArray(vec![]),
        tuple((char('['), sep, char(']'))),
    )(i)
}

fn node_array(i: &str) -> Res<'_, Vec<RawEntry>> {
    let entry = alt((
        map(use_ref, RawEntry::Use),
        map(node, RawEntry::Node),
    ));
    let (i, _) = char('[')(i)?;
    let (i, entries) = many1(preceded(sep, entry))(i)?;
    let (i, _) = preceded(sep, char(']'))(i)?;
    Ok((i, entries))
}

fn string_array(i: &str) -> Res<'_, Vec<String>> {
    let (i, _) = char('[')(i)?;
    let (i, out) = many1(preceded(sep, quoted))(i)?;
    let (i, _) = preceded(sep, char(']'))(i)?;
    Ok((i, out))
}

/// Parses a bracketed list of numbers, keeping track of comma grouping
fn numeric_array(i: &str) -> Res<'_, FieldValue> {
    let (i, _) = char('[')(i)?;
    let (i, items) = many0(preceded(
        sp,
        alt((map(number, Some), value(None, char(',')))),
    ))(i)?;
    let (i, _) = preceded(sp, char(']'))(i)?;
    Ok((i, classify(&items)))
}

/// Picks an array kind for a list of numbers (`None` marks a comma)
///
/// Integer-only lists become an [`FieldValue::Int32Array`]; otherwise,
/// consistent groups of three or two become vector arrays.  Everything else is
/// a flat [`FieldValue::FloatArray`].
fn classify(items: &[Option<Number>]) -> FieldValue {
    let numbers: Vec<Number> = items.iter().flatten().copied().collect();
    if numbers.iter().all(|n| matches!(n, Number::Int(..))) {
        return FieldValue::Int32Array(
            numbers
                .iter()
                .map(|n| match n {
                    Number::Int(i) => *i,
                    Number::Float(f) => *f as i32,
                })
                .collect(),
        );
    }
    let groups: Vec<&[Option<Number>]> = items
        .split(|n| n.is_none())
        .filter(|g| !g.is_empty())
        .collect();
    let f = |n: &Option<Number>| n.map(Number::to_f32).unwrap_or_default();
    if groups.len() > 1 && groups.iter().all(|g| g.len() == 3) {
        FieldValue::Vec3fArray(
            groups
                .iter()
                .map(|g| Vec3f::new(f(&g[0]), f(&g[1]), f(&g[2])))
                .collect(),
        )
    } else if groups.len() > 1 && groups.iter().all(|g| g.len() == 2) {
        FieldValue::Vec2fArray(
            groups
                .iter()
                .map(|g| Vec2f::new(f(&g[0]), f(&g[1])))
                .collect(),
        )
    } else {
        FieldValue::FloatArray(numbers.into_iter().map(Number::to_f32).collect())
    }
}

/// Parses one to four whitespace-separated numbers
fn numbers(i: &str) -> Res<'_, FieldValue> {
    let (i, first) = number(i)?;
    let (i, rest) = many_m_n(0, 3, preceded(sep, number))(i)?;
    let f = |n: Number| n.to_f32();
    let out = match rest.as_slice() {
        [] => match first {
            Number::Int(i) => FieldValue::Int(i),
            Number::Float(f) => FieldValue::Float(f),
        },
        [b] => FieldValue::Vec2f(Vec2f::new(f(first), f(*b))),
        [b, c] => FieldValue::Vec3f(Vec3f::new(f(first), f(*b), f(*c))),
        [b, c, d, ..] => {
            FieldValue::Vec4f(Vec4f::new(f(first), f(*b), f(*c), f(*d)))
        }
    };
    Ok((i, out))
}

fn number(i: &str) -> Res<'_, Number> {
    alt((map(hex_int, Number::Int), decimal))(i)
}

fn hex_int(i: &str) -> Res<'_, i32> {
    map_res(
        recognize(tuple((
            opt(char('-')),
            alt((tag("0x"), tag("0X"))),
            hex_digit1,
        ))),
        |s: &str| {
            let (neg, s) = match s.strip_prefix('-') {
                Some(s) => (true, s),
                None => (false, s),
            };
            // Values such as 0xFFFFFFFF (pixel data) wrap into the i32 range
            u32::from_str_radix(&s[2..], 16).map(|v| {
                let v = v as i32;
                if neg { v.wrapping_neg() } else { v }
            })
        },
    )(i)
}

fn decimal(i: &str) -> Res<'_, Number> {
    map_res(
        recognize(tuple((
            opt(one_of("+-")),
            alt((
                recognize(pair(digit1, opt(pair(char('.'), digit0)))),
                recognize(pair(char('.'), digit1)),
            )),
            opt(tuple((one_of("eE"), opt(one_of("+-")), digit1))),
        ))),
        |s: &str| {
            if !s.contains(['.', 'e', 'E']) {
                if let Ok(v) = s.parse::<i32>() {
                    return Ok(Number::Int(v));
                }
            }
            s.parse::<f32>().map(Number::Float)
        },
    )(i)
}

fn boolean(i: &str) -> Res<'_, bool> {
    alt((value(true, keyword("TRUE")), value(false, keyword("FALSE"))))(i)
}

/// Parses a double-quoted string, unescaping `\"` and `\\`
fn quoted(i: &str) -> Res<'_, String> {
    let (i, _) = char('"')(i)?;
    let mut out = String::new();
    let mut chars = i.char_indices();
    while let Some((pos, c)) = chars.next() {
        match c {
            '"' => return Ok((&i[pos + 1..], out)),
            '\\' => match chars.next() {
                Some((_, e)) => out.push(e),
                None => break,
            },
            c => out.push(c),
        }
    }
    Err(nom::Err::Failure(VerboseError::from_error_kind(
        i,
        ErrorKind::Char,
    )))
}
