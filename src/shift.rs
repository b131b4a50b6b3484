use nom::{
    Finish, IResult,
    character::complete::{char, digit0},
    multi::many0,
    sequence::preceded,
};

use crate::chars::SHIFT_PREFIX;
use crate::{Error, Result, Span};

// `~` followed by an optional run of digits
fn shift_group(input: Span) -> IResult<Span, Span> {
    preceded(char(SHIFT_PREFIX), digit0)(input)
}

fn group_amount(digits: Span) -> Result<u32> {
    if digits.fragment().is_empty() {
        return Ok(1);
    }
    digits.fragment().parse::<u32>().map_err(|_| Error::ShiftOverflow {
        digits: digits.fragment().to_string(),
        offset: digits.location_offset(),
    })
}

/// Parses a suffix of `~` groups into a single cumulative shift.
///
/// `~` counts as 1 and `~N` as N, so `~~` is 2 and `~1~2` is 3.  The whole input has to be
/// consumed; an empty input is a shift of 0.
pub(crate) fn parse_shift(input: Span) -> Result<u32> {
    let unexpected = |rest: Span| Error::UnexpectedCharacters {
        text: rest.fragment().to_string(),
        offset: rest.location_offset(),
    };

    let (rest, groups) = many0(shift_group)(input).finish().map_err(|e| unexpected(e.input))?;
    if !rest.fragment().is_empty() {
        return Err(unexpected(rest));
    }

    let mut shift: u32 = 0;
    for digits in groups {
        let amount = group_amount(digits)?;
        shift = shift.checked_add(amount).ok_or_else(|| Error::ShiftOverflow {
            digits: digits.fragment().to_string(),
            offset: digits.location_offset(),
        })?;
    }
    Ok(shift)
}

/// Parses a standalone shift suffix such as `~2~`.
pub fn parse_shift_str(input: &str) -> Result<u32> {
    parse_shift(Span::new(input))
}
