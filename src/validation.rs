//! # Validation Errors
//!
//! Field-keyed error aggregation for structural validation. Validators collect
//! every failing field rather than stopping at the first, and nested
//! structures (such as items in a list) report under their index so the full
//! path to a problem is visible in a single message.
//!
//! Rendering is deterministic: fields are sorted by name, each issue is shown
//! as `field: message`, nested groups are parenthesized, and the whole group
//! ends with a full stop. For example:
//!
//! ```text
//! id: unable to split did into method, namespace and id; verification_method: (0: (id: must have prefix: did:example:123.).).
//! ```

use std::collections::{BTreeMap, HashSet};
use std::fmt::{self, Display, Formatter};
use std::hash::Hash;

/// True when the slice contains no equal items.
pub fn is_unique<T: Eq + Hash>(items: &[T]) -> bool {
    let mut seen = HashSet::with_capacity(items.len());
    items.iter().all(|item| seen.insert(item))
}

/// One problem reported against a field.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Issue {
    /// A leaf message, e.g. "cannot be blank".
    Message(String),

    /// A nested group of errors, e.g. per-index errors for a list field.
    Nested(ValidationError),
}

impl Display for Issue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Message(msg) => write!(f, "{msg}"),
            Self::Nested(group) => write!(f, "({group})"),
        }
    }
}

/// A group of validation errors keyed by field name.
///
/// An empty group means validation passed; use [`ValidationError::finish`] to
/// convert the accumulated state into a `Result`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationError {
    general: Vec<String>,
    fields: BTreeMap<String, Vec<Issue>>,
}

impl ValidationError {
    /// Creates an empty error group to accumulate into.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a group containing a single field message.
    #[must_use]
    pub fn for_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut err = Self::new();
        err.add(field, message);
        err
    }

    /// Creates a group containing a single message not tied to any field.
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        let mut err = Self::new();
        err.general.push(message.into());
        err
    }

    /// True when no errors have been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.general.is_empty() && self.fields.is_empty()
    }

    /// Records a message against a field.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields.entry(field.into()).or_default().push(Issue::Message(message.into()));
    }

    /// Records a nested error group against a field. Empty groups are
    /// ignored, and a group holding a single bare message collapses to a leaf
    /// so list items with simple errors render without extra parentheses.
    pub fn add_nested(&mut self, field: impl Into<String>, nested: Self) {
        if nested.is_empty() {
            return;
        }
        let issue = if nested.fields.is_empty() && nested.general.len() == 1 {
            Issue::Message(nested.general[0].clone())
        } else {
            Issue::Nested(nested)
        };
        self.fields.entry(field.into()).or_default().push(issue);
    }

    /// Records the outcome of validating one item of a list field, keyed by
    /// the item's index within the field's nested group.
    pub fn add_indexed(&mut self, field: &str, index: usize, item: Result<(), Self>) {
        let Err(nested) = item else { return };
        let issues = self.fields.entry(field.to_string()).or_default();
        match issues.iter().position(|issue| matches!(issue, Issue::Nested(_))) {
            Some(pos) => {
                if let Issue::Nested(group) = &mut issues[pos] {
                    group.add_nested(index.to_string(), nested);
                }
            }
            None => {
                let mut group = Self::new();
                group.add_nested(index.to_string(), nested);
                issues.push(Issue::Nested(group));
            }
        }
    }

    /// Converts the accumulated state into a `Result`: `Ok` when empty.
    ///
    /// # Errors
    ///
    /// Returns `self` when at least one error has been recorded.
    pub fn finish(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut parts = self.general.clone();
        for (field, issues) in &self.fields {
            for issue in issues {
                parts.push(format!("{field}: {issue}"));
            }
        }
        write!(f, "{}.", parts.join("; "))
    }
}

impl std::error::Error for ValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_sorted_and_terminated() {
        let mut err = ValidationError::new();
        err.add("id", "cannot be blank");
        err.add("controller", "there should be no duplicates");

        assert_eq!(
            err.to_string(),
            "controller: there should be no duplicates; id: cannot be blank."
        );
    }

    #[test]
    fn nested_groups_parenthesized() {
        let mut inner = ValidationError::new();
        inner.add("id", "must have prefix: did:example:123");

        let mut err = ValidationError::new();
        err.add_indexed("verification_method", 0, Err(inner));

        assert_eq!(
            err.to_string(),
            "verification_method: (0: (id: must have prefix: did:example:123.).)."
        );
    }

    #[test]
    fn indexed_items_share_a_group() {
        let mut err = ValidationError::new();
        err.add_indexed("controller", 0, Ok(()));
        err.add_indexed(
            "controller",
            1,
            Err(ValidationError::message("unable to split did into method, namespace and id")),
        );
        err.add_indexed(
            "controller",
            3,
            Err(ValidationError::message("unable to split did into method, namespace and id")),
        );

        assert_eq!(
            err.to_string(),
            "controller: (1: unable to split did into method, namespace and id; 3: unable to \
             split did into method, namespace and id.)."
        );
    }

    #[test]
    fn empty_group_is_ok() {
        assert!(ValidationError::new().finish().is_ok());
        let mut err = ValidationError::new();
        err.add_nested("service", ValidationError::new());
        assert!(err.finish().is_ok());
    }
}
