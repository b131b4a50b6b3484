use std::cmp::Reverse;
use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::spec::Spec;
use crate::specifier::AbsoluteSelector;
use crate::{Error, Result};

/// Opaque failure reported by a [`RevisionReader`].
pub type ReadError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VersionKey {
    Number(u64),
    Id(String),
}

impl VersionKey {
    pub fn matches(&self, selector: &AbsoluteSelector) -> bool {
        match (self, selector) {
            (Self::Number(n), AbsoluteSelector::Number(m)) => n == m,
            (Self::Id(id), AbsoluteSelector::Identifier(other)) => id == other,
            _ => false,
        }
    }

    pub fn to_selector(&self) -> AbsoluteSelector {
        match self {
            Self::Number(n) => AbsoluteSelector::Number(*n),
            Self::Id(id) => AbsoluteSelector::Identifier(id.clone()),
        }
    }
}

impl fmt::Display for VersionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Id(id) => f.write_str(id),
        }
    }
}

/// One stored revision as reported by the backing store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revision {
    pub version: VersionKey,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub labels: BTreeSet<String>,
    // History listings are allowed to leave this out.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// Read access to a versioned store.
pub trait RevisionReader {
    /// The revision `selector` pins; `AbsoluteSelector::None` is the store's current revision.
    fn get_exact(
        &self,
        name: &str,
        selector: &AbsoluteSelector,
    ) -> std::result::Result<Revision, ReadError>;

    /// All known revisions of `name`, in no particular order.
    fn get_history(&self, name: &str) -> std::result::Result<Vec<Revision>, ReadError>;
}

impl<R: RevisionReader + ?Sized> RevisionReader for &R {
    fn get_exact(
        &self,
        name: &str,
        selector: &AbsoluteSelector,
    ) -> std::result::Result<Revision, ReadError> {
        (**self).get_exact(name, selector)
    }

    fn get_history(&self, name: &str) -> std::result::Result<Vec<Revision>, ReadError> {
        (**self).get_history(name)
    }
}

/// Sort key putting the newest revision first and undated revisions last.
///
/// Ties keep their listed order, so the first of several equally new revisions is the current one.
pub(crate) fn newest_first(revision: &Revision) -> Reverse<Option<DateTime<Utc>>> {
    Reverse(revision.created_at)
}

fn read_error(context: &'static str) -> impl FnOnce(ReadError) -> Error {
    move |source| Error::Read { context, source }
}

fn base_index(history: &[Revision], absolute: &AbsoluteSelector) -> Result<usize> {
    let by_version = || history.iter().position(|r| r.version.matches(absolute));
    match absolute {
        AbsoluteSelector::None => Ok(0),
        AbsoluteSelector::Number(n) => {
            by_version().ok_or_else(|| Error::VersionKeyNotFound(n.to_string()))
        }
        AbsoluteSelector::Identifier(id) => {
            by_version().ok_or_else(|| Error::VersionKeyNotFound(id.clone()))
        }
        AbsoluteSelector::Label(label) => history
            .iter()
            .position(|r| r.labels.contains(label))
            .ok_or_else(|| Error::LabelNotFound(label.clone())),
    }
}

/// Turns a parsed specification into the stored revision it denotes.
///
/// Without a shift this is a single `get_exact`.  With a shift the history is sorted newest
/// first, the absolute selector picks the base entry and the shift walks back from there.
pub fn resolve<R: RevisionReader + ?Sized>(spec: &Spec, reader: &R) -> Result<Revision> {
    if spec.shift == 0 {
        return reader
            .get_exact(&spec.name, &spec.absolute)
            .map_err(read_error("failed to get revision"));
    }

    let mut history = reader
        .get_history(&spec.name)
        .map_err(read_error("failed to get history"))?;
    if history.is_empty() {
        return Err(Error::NotFound(spec.name.clone()));
    }

    history.sort_by_key(newest_first);

    let base = base_index(&history, &spec.absolute)?;
    let target = base.saturating_add(spec.shift as usize);
    log::debug!(
        "{spec}: base index {base}, target index {target} of {}",
        history.len()
    );
    if target >= history.len() {
        return Err(Error::ShiftOutOfRange(spec.shift));
    }

    let revision = history.swap_remove(target);
    if revision.value.is_some() {
        return Ok(revision);
    }
    reader
        .get_exact(&spec.name, &revision.version.to_selector())
        .map_err(read_error("failed to get revision detail"))
}

/// Resolves both sides of a comparison, `from` first.
pub fn resolve_pair<R: RevisionReader + ?Sized>(
    from: &Spec,
    to: &Spec,
    reader: &R,
) -> Result<(Revision, Revision)> {
    let from = resolve(from, reader)?;
    let to = resolve(to, reader)?;
    Ok((from, to))
}
