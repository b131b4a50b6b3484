use std::fmt;

use nom::Slice;

use crate::chars::{SHIFT_PREFIX, is_digit, is_letter};
use crate::shift::parse_shift;
use crate::specifier::{AbsoluteSelector, SpecifierParser, parse_absolute};
use crate::{Error, Result, Span};

/// A parsed version specification: `name`, an optional absolute selector and a backwards shift.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Spec {
    pub name: String,
    pub absolute: AbsoluteSelector,
    pub shift: u32,
}

impl Spec {
    /// The current revision of `name`.
    pub fn latest(name: &str) -> Self {
        Self {
            name: name.to_string(),
            absolute: AbsoluteSelector::None,
            shift: 0,
        }
    }

    pub fn has_selector(&self) -> bool {
        self.absolute.is_some() || self.shift > 0
    }

    pub fn parse(input: &str, table: &[SpecifierParser]) -> Result<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Err(Error::EmptySpec);
        }

        let boundary = find_boundary(input, table)?;
        let name = &input[..boundary];
        log::trace!("{input:?}: name ends at {boundary}");
        if boundary == input.len() {
            return Ok(Self::latest(name));
        }
        if name.is_empty() {
            return Err(Error::EmptyName);
        }

        let mut rest = Span::new(input).slice(boundary..);
        let mut absolute = AbsoluteSelector::None;
        if !rest.fragment().starts_with(SHIFT_PREFIX) {
            (absolute, rest) = parse_absolute(rest, table)?;
        }

        let shift = if rest.fragment().is_empty() {
            0
        } else {
            parse_shift(rest)?
        };

        Ok(Self {
            name: name.to_string(),
            absolute,
            shift,
        })
    }
}

/// Canonical text, which parses back to the same `Spec`.
impl fmt::Display for Spec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, self.absolute)?;
        if self.shift > 0 {
            write!(f, "{SHIFT_PREFIX}{}", self.shift)?;
        }
        Ok(())
    }
}

/// Byte index where the name ends and the specifiers begin, or `input.len()` if there are none.
///
/// A `~` starts the shift when followed by the end, a digit or another `~`.  Followed by a
/// letter it is rejected as ambiguous, otherwise it belongs to the name.  A registered prefix
/// starts an absolute specifier when its value follows.
fn find_boundary(input: &str, table: &[SpecifierParser]) -> Result<usize> {
    let mut chars = input.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        let next = chars.peek().map(|&(_, n)| n);

        if c == SHIFT_PREFIX {
            match next {
                None => return Ok(i),
                Some(n) if is_digit(n) || n == SHIFT_PREFIX => return Ok(i),
                Some(n) if is_letter(n) => return Err(Error::AmbiguousTilde(i)),
                Some(_) => continue,
            }
        }

        for parser in table.iter().filter(|p| p.prefix == c) {
            if parser.starts_value(next) {
                return Ok(i);
            }
            if let Some(message) = parser.missing_value {
                return Err(Error::MissingSelectorValue { offset: i, message });
            }
        }
    }
    Ok(input.len())
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::specifier::{PARAMETER_SPECIFIERS, SECRET_SPECIFIERS};

    fn param(input: &str) -> Result<Spec> {
        Spec::parse(input, &PARAMETER_SPECIFIERS)
    }

    fn secret(input: &str) -> Result<Spec> {
        Spec::parse(input, &SECRET_SPECIFIERS)
    }

    fn spec(name: &str, absolute: AbsoluteSelector, shift: u32) -> Spec {
        Spec {
            name: name.to_string(),
            absolute,
            shift,
        }
    }

    #[test]
    fn parses_bare_name() {
        assert_eq!(param("/app/db/url").unwrap(), Spec::latest("/app/db/url"));
        assert_eq!(param("  x \t").unwrap(), Spec::latest("x"));
    }

    #[test]
    fn shifts_are_cumulative() {
        assert_eq!(param("x~1~2").unwrap().shift, 3);
        assert_eq!(param("x~~").unwrap().shift, 2);
        assert_eq!(param("x~").unwrap().shift, 1);
        assert_eq!(param("x").unwrap().shift, 0);
    }

    #[test]
    fn parses_number_with_shift() {
        assert_eq!(param("/a#3~2").unwrap(), spec("/a", AbsoluteSelector::Number(3), 2));
    }

    #[test]
    fn parses_secret_selectors() {
        assert_eq!(
            secret("db-creds#0f1e-22ab").unwrap(),
            spec("db-creds", AbsoluteSelector::Identifier("0f1e-22ab".into()), 0)
        );
        assert_eq!(
            secret("db-creds:AWSCURRENT~1").unwrap(),
            spec("db-creds", AbsoluteSelector::Label("AWSCURRENT".into()), 1)
        );
    }

    #[test]
    fn tilde_followed_by_letter_is_ambiguous() {
        assert!(matches!(param("x~abc"), Err(Error::AmbiguousTilde(1))));
        assert!(matches!(param("x~Z"), Err(Error::AmbiguousTilde(1))));
        assert!(matches!(secret("x:AWSCURRENT~b"), Err(Error::UnexpectedCharacters { .. })));
    }

    #[test]
    fn tilde_followed_by_symbol_is_part_of_name() {
        assert_eq!(param("a~-b").unwrap(), Spec::latest("a~-b"));
        assert_eq!(param("a~.b~2").unwrap(), spec("a~.b", AbsoluteSelector::None, 2));
    }

    #[test]
    fn rejects_duplicate_absolute_selector() {
        assert!(matches!(param("x#1#2"), Err(Error::MultipleAbsoluteSpecifiers(3))));
        assert!(matches!(secret("x#ab:L"), Err(Error::MultipleAbsoluteSpecifiers(4))));
    }

    #[test]
    fn rejects_empty_name() {
        assert!(matches!(param("#3"), Err(Error::EmptyName)));
        assert!(matches!(param("~1"), Err(Error::EmptyName)));
        assert!(matches!(secret(":AWSCURRENT"), Err(Error::EmptyName)));
    }

    #[test]
    fn rejects_empty_spec() {
        assert!(matches!(param(""), Err(Error::EmptySpec)));
        assert!(matches!(param("   "), Err(Error::EmptySpec)));
    }

    #[test]
    fn rejects_prefix_without_value() {
        let e = param("x#abc").unwrap_err();
        assert!(matches!(e, Error::MissingSelectorValue { offset: 1, .. }));
        assert_eq!(e.to_string(), "`#` must be followed by a version number");
        assert!(matches!(param("x#"), Err(Error::MissingSelectorValue { .. })));
        assert!(matches!(secret("x:"), Err(Error::MissingSelectorValue { .. })));
        assert!(matches!(secret("x#_"), Err(Error::MissingSelectorValue { .. })));
    }

    #[test]
    fn rejects_trailing_characters() {
        let e = param("x#3abc").unwrap_err();
        assert!(matches!(e, Error::UnexpectedCharacters { ref text, offset: 3 } if text == "abc"));
        assert!(matches!(param("x~1#2"), Err(Error::UnexpectedCharacters { .. })));
        assert!(matches!(param("x#3#"), Err(Error::UnexpectedCharacters { .. })));
    }

    #[test]
    fn colon_is_a_name_character_for_parameters() {
        assert_eq!(param("a:b~1").unwrap(), spec("a:b", AbsoluteSelector::None, 1));
    }

    #[test]
    fn canonical_text() {
        assert_eq!(param("x~1~1").unwrap().to_string(), "x~2");
        assert_eq!(param("x#007").unwrap().to_string(), "x#7");
        assert_eq!(secret("x:L~~").unwrap().to_string(), "x:L~2");
        assert_eq!(param("x~0").unwrap().to_string(), "x");
    }

    #[test]
    fn has_selector() {
        assert!(!param("x").unwrap().has_selector());
        assert!(!param("x~0").unwrap().has_selector());
        assert!(param("x~").unwrap().has_selector());
        assert!(param("x#1").unwrap().has_selector());
    }

    fn arb_name() -> impl Strategy<Value = String> {
        "[a-zA-Z0-9/_.-]{1,24}"
    }

    fn arb_parameter_spec() -> impl Strategy<Value = Spec> {
        let absolute = prop_oneof![
            Just(AbsoluteSelector::None),
            any::<u64>().prop_map(AbsoluteSelector::Number),
        ];
        (arb_name(), absolute, 0u32..500).prop_map(|(name, absolute, shift)| Spec {
            name,
            absolute,
            shift,
        })
    }

    fn arb_secret_spec() -> impl Strategy<Value = Spec> {
        let absolute = prop_oneof![
            Just(AbsoluteSelector::None),
            "[A-Za-z0-9-]{1,36}".prop_map(AbsoluteSelector::Identifier),
            "[A-Za-z0-9_-]{1,16}".prop_map(AbsoluteSelector::Label),
        ];
        (arb_name(), absolute, 0u32..500).prop_map(|(name, absolute, shift)| Spec {
            name,
            absolute,
            shift,
        })
    }

    proptest! {
        #[test]
        fn parameter_canonical_text_reparses(spec in arb_parameter_spec()) {
            prop_assert_eq!(param(&spec.to_string()).unwrap(), spec);
        }

        #[test]
        fn secret_canonical_text_reparses(spec in arb_secret_spec()) {
            prop_assert_eq!(secret(&spec.to_string()).unwrap(), spec);
        }

        #[test]
        fn parse_is_deterministic(input in "[a-z#:~0-9]{0,12}") {
            let first = param(&input).map_err(|e| e.to_string());
            let second = param(&input).map_err(|e| e.to_string());
            prop_assert_eq!(first, second);
        }
    }
}
