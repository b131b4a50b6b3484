use std::fmt;
use std::str::FromStr;

use nom::{Slice, bytes::complete::take_while1};

use crate::chars::{SHIFT_PREFIX, is_digit, is_id_char, is_label_char};
use crate::spec::Spec;
use crate::{Error, Result, Span};

/// The optional part of a specification that pins an exact revision.
#[derive(Debug, Default, Clone, PartialEq, Eq, Hash)]
pub enum AbsoluteSelector {
    /// The store's current revision.
    #[default]
    None,
    Number(u64),
    Identifier(String),
    Label(String),
}

impl AbsoluteSelector {
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    pub fn is_some(&self) -> bool {
        !self.is_none()
    }
}

impl fmt::Display for AbsoluteSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => Ok(()),
            Self::Number(n) => write!(f, "#{n}"),
            Self::Identifier(id) => write!(f, "#{id}"),
            Self::Label(label) => write!(f, ":{label}"),
        }
    }
}

/// One entry of a store's absolute specifier table.
///
/// Tables are static and iterated in registration order.
#[derive(Clone, Copy)]
pub struct SpecifierParser {
    pub prefix: char,
    pub is_value_char: fn(char) -> bool,
    // Reported when the prefix is not followed by a value character.  `None` makes the prefix an
    // ordinary name character in that position.
    pub missing_value: Option<&'static str>,
    pub is_duplicate: fn(&AbsoluteSelector) -> bool,
    pub apply: fn(&str, &AbsoluteSelector) -> Result<AbsoluteSelector>,
}

impl SpecifierParser {
    pub fn starts_value(&self, next: Option<char>) -> bool {
        next.is_some_and(self.is_value_char)
    }
}

impl fmt::Debug for SpecifierParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpecifierParser")
            .field("prefix", &self.prefix)
            .field("missing_value", &self.missing_value)
            .finish_non_exhaustive()
    }
}

fn apply_number(value: &str, _current: &AbsoluteSelector) -> Result<AbsoluteSelector> {
    Ok(AbsoluteSelector::Number(value.parse()?))
}

fn apply_identifier(value: &str, _current: &AbsoluteSelector) -> Result<AbsoluteSelector> {
    Ok(AbsoluteSelector::Identifier(value.to_string()))
}

fn apply_label(value: &str, _current: &AbsoluteSelector) -> Result<AbsoluteSelector> {
    Ok(AbsoluteSelector::Label(value.to_string()))
}

pub static PARAMETER_SPECIFIERS: [SpecifierParser; 1] = [SpecifierParser {
    prefix: '#',
    is_value_char: is_digit,
    missing_value: Some("`#` must be followed by a version number"),
    is_duplicate: AbsoluteSelector::is_some,
    apply: apply_number,
}];

// An identifier and a label both pin the revision, so either one rules out the other.
pub static SECRET_SPECIFIERS: [SpecifierParser; 2] = [
    SpecifierParser {
        prefix: '#',
        is_value_char: is_id_char,
        missing_value: Some("`#` must be followed by a version id"),
        is_duplicate: AbsoluteSelector::is_some,
        apply: apply_identifier,
    },
    SpecifierParser {
        prefix: ':',
        is_value_char: is_label_char,
        missing_value: Some("`:` must be followed by a label"),
        is_duplicate: AbsoluteSelector::is_some,
        apply: apply_label,
    },
];

/// Consumes absolute specifiers from the start of `input`.
///
/// Stops at the first `~` or at the first character that does not open a valid specifier and
/// returns the unconsumed rest for the shift parser.  A second specifier is an error.
pub(crate) fn parse_absolute<'a>(
    mut input: Span<'a>,
    table: &[SpecifierParser],
) -> Result<(AbsoluteSelector, Span<'a>)> {
    let mut absolute = AbsoluteSelector::None;
    while let Some(c) = input.fragment().chars().next() {
        if c == SHIFT_PREFIX {
            break;
        }
        let Some(parser) = table.iter().find(|p| p.prefix == c) else {
            break;
        };
        let after_prefix = input.slice(c.len_utf8()..);
        let Ok((rest, value)) =
            take_while1::<_, _, nom::error::Error<Span>>(parser.is_value_char)(after_prefix)
        else {
            break;
        };
        if (parser.is_duplicate)(&absolute) {
            return Err(Error::MultipleAbsoluteSpecifiers(input.location_offset()));
        }
        absolute = (parser.apply)(value.fragment(), &absolute).map_err(|e| {
            Error::InvalidSelectorValue {
                value: value.fragment().to_string(),
                offset: value.location_offset(),
                source: Box::new(e),
            }
        })?;
        input = rest;
    }
    Ok((absolute, input))
}

/// The kind of backing store, which decides the specifier grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKind {
    /// Numbered revisions: `name#3`.
    Parameter,
    /// Opaque version ids and staging labels: `name#abc-123`, `name:AWSPREVIOUS`.
    Secret,
}

impl StoreKind {
    pub fn specifiers(self) -> &'static [SpecifierParser] {
        match self {
            Self::Parameter => &PARAMETER_SPECIFIERS,
            Self::Secret => &SECRET_SPECIFIERS,
        }
    }

    /// Characters that can open a specifier, used to tell a bare specifier argument from a
    /// full one.
    pub fn prefix_chars(self) -> &'static str {
        match self {
            Self::Parameter => "#~",
            Self::Secret => "#:~",
        }
    }

    pub fn parse(self, input: &str) -> Result<Spec> {
        Spec::parse(input, self.specifiers())
    }
}

impl FromStr for StoreKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "param" | "parameter" => Ok(Self::Parameter),
            "secret" => Ok(Self::Secret),
            _ => Err(Error::UnknownStoreKind(s.to_string())),
        }
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parameter => f.write_str("param"),
            Self::Secret => f.write_str("secret"),
        }
    }
}
