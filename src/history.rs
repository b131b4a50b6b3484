//! A [`RevisionReader`] over a JSON document of revision histories.
//!
//! ```json
//! {
//!   "/app/db/url": [
//!     { "version": 1, "created_at": "2024-04-01T09:00:00Z", "value": "postgres://old" },
//!     { "version": 2, "created_at": "2024-04-20T09:00:00Z", "value": "postgres://new" }
//!   ]
//! }
//! ```

use std::io::Read;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::resolve::{ReadError, Revision, RevisionReader, newest_first};
use crate::specifier::AbsoluteSelector;

#[derive(thiserror::Error, Debug)]
pub enum HistoryError {
    #[error("{0:?} not found")]
    UnknownName(String),

    #[error("{name:?} has no revisions")]
    NoRevisions { name: String },

    #[error("{name}{selector} not found")]
    NoMatch { name: String, selector: AbsoluteSelector },

    #[error("Malformed history document")]
    Json(#[from] serde_json::Error),

    #[error("IO error")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoryFile {
    entries: IndexMap<String, Vec<Revision>>,
}

impl HistoryFile {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, HistoryError> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, HistoryError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    fn find(&self, name: &str, selector: &AbsoluteSelector) -> Result<&Revision, HistoryError> {
        let revisions = self
            .entries
            .get(name)
            .ok_or_else(|| HistoryError::UnknownName(name.to_string()))?;
        let found = match selector {
            // Same ordering the resolver walks, so `name` and `name~1` never land on one entry.
            AbsoluteSelector::None => {
                if revisions.is_empty() {
                    return Err(HistoryError::NoRevisions {
                        name: name.to_string(),
                    });
                }
                revisions.iter().min_by_key(|r| newest_first(r))
            }
            AbsoluteSelector::Number(_) | AbsoluteSelector::Identifier(_) => {
                revisions.iter().find(|r| r.version.matches(selector))
            }
            AbsoluteSelector::Label(label) => revisions.iter().find(|r| r.labels.contains(label)),
        };
        found.ok_or_else(|| HistoryError::NoMatch {
            name: name.to_string(),
            selector: selector.clone(),
        })
    }
}

impl std::str::FromStr for HistoryFile {
    type Err = HistoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(serde_json::from_str(s)?)
    }
}

impl RevisionReader for HistoryFile {
    fn get_exact(&self, name: &str, selector: &AbsoluteSelector) -> Result<Revision, ReadError> {
        Ok(self.find(name, selector)?.clone())
    }

    // Unknown names have an empty history rather than an error.
    fn get_history(&self, name: &str) -> Result<Vec<Revision>, ReadError> {
        Ok(self.entries.get(name).cloned().unwrap_or_default())
    }
}
