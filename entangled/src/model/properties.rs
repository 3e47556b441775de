//! Property parsing for code fence attributes.
//!
//! An info string like `{.python #kernel.init file=boot.py}` (braces
//! optional) parses into class, id and key-value attribute items.

use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{escaped_transform, tag, take_while1},
    character::complete::{char, multispace0, multispace1, none_of},
    combinator::{map, opt, value},
    multi::many0,
    sequence::{delimited, preceded},
};

/// A single property from a code fence info string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Property {
    /// A class, e.g. `.python` (or the bare leading language word).
    Class(String),
    /// An identifier, e.g. `#kernel.init`.
    Id(String),
    /// A key-value attribute, e.g. `file=boot.py`.
    Attribute(String, String),
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '/' | '.')
}

fn ident(input: &str) -> IResult<&str, &str> {
    take_while1(is_ident_char).parse(input)
}

fn class(input: &str) -> IResult<&str, Property> {
    map(preceded(char('.'), ident), |s: &str| {
        Property::Class(s.to_string())
    })
    .parse(input)
}

fn id(input: &str) -> IResult<&str, Property> {
    map(preceded(char('#'), ident), |s: &str| {
        Property::Id(s.to_string())
    })
    .parse(input)
}

fn quoted_value(input: &str) -> IResult<&str, String> {
    delimited(
        char('"'),
        escaped_transform(
            none_of("\\\""),
            '\\',
            alt((
                value("\\", tag("\\")),
                value("\"", tag("\"")),
                value("\n", tag("n")),
                value("\t", tag("t")),
            )),
        ),
        char('"'),
    )
    .parse(input)
}

fn bare_value(input: &str) -> IResult<&str, String> {
    map(take_while1(is_ident_char), |s: &str| s.to_string()).parse(input)
}

fn attribute(input: &str) -> IResult<&str, Property> {
    map(
        (ident, char('='), alt((quoted_value, bare_value))),
        |(key, _, val)| Property::Attribute(key.to_string(), val),
    )
    .parse(input)
}

fn property(input: &str) -> IResult<&str, Property> {
    alt((class, id, attribute)).parse(input)
}

/// The first item may be a bare word, taken as the language class.
fn leading_property(input: &str) -> IResult<&str, Property> {
    alt((
        class,
        id,
        attribute,
        map(ident, |s: &str| Property::Class(s.to_string())),
    ))
    .parse(input)
}

fn properties(input: &str) -> IResult<&str, Vec<Property>> {
    let (input, _) = multispace0.parse(input)?;
    let (input, first) = opt(leading_property).parse(input)?;
    match first {
        None => Ok((input, vec![])),
        Some(prop) => {
            let (input, rest) = many0(preceded(multispace1, property)).parse(input)?;
            let (input, _) = multispace0.parse(input)?;
            let mut items = vec![prop];
            items.extend(rest);
            Ok((input, items))
        }
    }
}

/// Parses a fence info string, with or without surrounding braces.
pub fn parse_properties(info: &str) -> Result<Vec<Property>, String> {
    let inner = strip_braces(info.trim());
    match properties(inner) {
        Ok(("", props)) => Ok(props),
        Ok((remaining, _)) => Err(format!("unexpected input: `{}`", remaining)),
        Err(e) => Err(format!("malformed attributes: {}", e)),
    }
}

fn strip_braces(s: &str) -> &str {
    match s.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
        Some(inner) => inner,
        None => s,
    }
}

/// Parsed fence properties with accessors.
#[derive(Debug, Clone, Default)]
pub struct Properties {
    pub items: Vec<Property>,
}

impl Properties {
    /// Parses an info string.
    pub fn parse(info: &str) -> Result<Self, String> {
        Ok(Self {
            items: parse_properties(info)?,
        })
    }

    /// Returns all class names in order.
    pub fn classes(&self) -> Vec<&str> {
        self.items
            .iter()
            .filter_map(|p| match p {
                Property::Class(s) => Some(s.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Returns the first class, conventionally the language.
    pub fn language(&self) -> Option<&str> {
        self.classes().first().copied()
    }

    /// Returns the first id.
    pub fn id(&self) -> Option<&str> {
        self.items.iter().find_map(|p| match p {
            Property::Id(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// Gets an attribute value by key.
    pub fn get_attribute(&self, key: &str) -> Option<&str> {
        self.items.iter().find_map(|p| match p {
            Property::Attribute(k, v) if k == key => Some(v.as_str()),
            _ => None,
        })
    }

    /// Returns the `file=` target, if declared.
    pub fn file(&self) -> Option<&str> {
        self.get_attribute("file")
    }

    /// Returns all attributes except `file`.
    pub fn free_attributes(&self) -> Vec<(&str, &str)> {
        self.items
            .iter()
            .filter_map(|p| match p {
                Property::Attribute(k, v) if k != "file" => Some((k.as_str(), v.as_str())),
                _ => None,
            })
            .collect()
    }
}
