//! Reading 1 to 3 command-line arguments as the two sides of a comparison.
//!
//! The pair is always read as "what changed from `from` to `to`":
//!
//! | Arguments            | Shape         | `from`           | `to`            |
//! |----------------------|---------------|------------------|-----------------|
//! | `/a#3`               | `Single`      | `/a#3`           | `/a`            |
//! | `/a#1 /b#2`          | `FullPair`    | `/a#1`           | `/b#2`          |
//! | `/a#1 #2`            | `Mixed`       | `/a#1`           | `/a#2`          |
//! | `/a #3`              | `PartialSwap` | `/a#3`           | `/a`            |
//! | `/a #1 #2`           | `NameWithTwo` | `/a#1`           | `/a#2`          |
//!
//! In `PartialSwap` the explicitly specified revision becomes `from`, so the side carrying a
//! selector is always compared against the current revision the same way regardless of order.

use crate::spec::Spec;
use crate::specifier::{SpecifierParser, StoreKind};
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffShape {
    Single,
    FullPair,
    Mixed,
    PartialSwap,
    NameWithTwo,
}

impl DiffShape {
    pub fn classify(
        count: usize,
        second_is_specifier: bool,
        first_has_selector: bool,
    ) -> Result<Self> {
        match (count, second_is_specifier, first_has_selector) {
            (1, _, _) => Ok(Self::Single),
            (2, false, _) => Ok(Self::FullPair),
            (2, true, true) => Ok(Self::Mixed),
            (2, true, false) => Ok(Self::PartialSwap),
            (3, _, _) => Ok(Self::NameWithTwo),
            (n, _, _) => Err(Error::DiffUsage(n)),
        }
    }
}

fn starts_with_specifier(token: &str, prefix_chars: &str) -> bool {
    token.chars().next().is_some_and(|c| prefix_chars.contains(c))
}

fn parse_joined(name: &str, suffix: &str, table: &[SpecifierParser]) -> Result<Spec> {
    Spec::parse(&format!("{name}{suffix}"), table)
}

pub fn parse_diff_args<S: AsRef<str>>(tokens: &[S], store: StoreKind) -> Result<(Spec, Spec)> {
    let table = store.specifiers();
    let tokens: Vec<&str> = tokens.iter().map(|t| t.as_ref()).collect();

    // With three arguments the first one is a bare name and is only ever used as a prefix.
    let first = match tokens.as_slice() {
        [first] | [first, _] => Some(Spec::parse(first, table)?),
        _ => None,
    };
    let second_is_specifier = tokens
        .get(1)
        .is_some_and(|t| starts_with_specifier(t, store.prefix_chars()));
    let first_has_selector = first.as_ref().is_some_and(Spec::has_selector);

    let shape = DiffShape::classify(tokens.len(), second_is_specifier, first_has_selector)?;
    log::debug!("Reading {tokens:?} as {shape:?}");

    match (shape, first) {
        (DiffShape::Single, Some(from)) => {
            let to = Spec::latest(&from.name);
            Ok((from, to))
        }
        (DiffShape::FullPair, Some(from)) => {
            let to = Spec::parse(tokens[1], table)?;
            Ok((from, to))
        }
        (DiffShape::Mixed, Some(from)) => {
            let to = parse_joined(&from.name, tokens[1], table)?;
            Ok((from, to))
        }
        (DiffShape::PartialSwap, Some(current)) => {
            let from = parse_joined(&current.name, tokens[1], table)?;
            Ok((from, Spec::latest(&current.name)))
        }
        (DiffShape::NameWithTwo, _) => {
            let name = tokens[0].trim();
            let from = parse_joined(name, tokens[1], table)
                .map_err(|e| Error::InvalidVersion1(Box::new(e)))?;
            let to = parse_joined(name, tokens[2], table)
                .map_err(|e| Error::InvalidVersion2(Box::new(e)))?;
            Ok((from, to))
        }
        (_, None) => Err(Error::DiffUsage(tokens.len())),
    }
}

/// The text `parse_diff_args` was parsing when it failed with `error`.
///
/// Offsets reported by `error` point into this text.
pub fn failing_input<S: AsRef<str>>(tokens: &[S], store: StoreKind, error: &Error) -> Option<String> {
    let tokens: Vec<&str> = tokens.iter().map(|t| t.as_ref()).collect();
    match (tokens.as_slice(), error) {
        ([name, first, _], Error::InvalidVersion1(_)) => Some(format!("{}{first}", name.trim())),
        ([name, _, second], Error::InvalidVersion2(_)) => Some(format!("{}{second}", name.trim())),
        ([only], _) => Some(only.to_string()),
        ([first, second], _) => match store.parse(first) {
            Err(_) => Some(first.to_string()),
            Ok(spec) if starts_with_specifier(second, store.prefix_chars()) => {
                Some(format!("{}{second}", spec.name))
            }
            Ok(_) => Some(second.to_string()),
        },
        _ => None,
    }
}
