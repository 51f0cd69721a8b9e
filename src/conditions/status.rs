//! status managers: named sets of allowed status values

use serde::{Deserialize, Serialize};

use super::types::AttrMask;

/// a status manager and the status values it can assign
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusManager {
    pub name: String,
    pub statuses: Vec<String>,
}

impl StatusManager {
    pub fn new<I, S>(name: impl Into<String>, statuses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            statuses: statuses.into_iter().map(Into::into).collect(),
        }
    }

    /// empty means "no status set" and is always accepted
    pub fn is_valid_status(&self, value: &str) -> bool {
        value.is_empty() || self.statuses.iter().any(|s| s == value)
    }

    /// allowed values for diagnostics, e.g. `archived, modified, new`
    pub fn allowed_values(&self) -> String {
        self.statuses.join(", ")
    }
}

/// a status manager registered at a fixed index
///
/// the index selects the status attribute bit in an [`AttrMask`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmInstance {
    pub index: usize,
    pub manager: StatusManager,
}

impl SmInstance {
    pub fn new(index: usize, manager: StatusManager) -> Self {
        Self { index, manager }
    }

    pub fn name(&self) -> &str {
        &self.manager.name
    }

    pub fn attr_mask(&self) -> AttrMask {
        AttrMask::status(self.index)
    }
}
