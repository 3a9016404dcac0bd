//! Automaton descriptions as exchanged with the minimization service.
//!
//! DESIGN
//! ======
//! The service emits Portuguese field names (`estados`, `finais`, `inicial`,
//! `transicoes`); both spellings are accepted. Every field defaults to empty so
//! a partially filled payload still renders: `null` collections read as empty,
//! and labels or destinations that are not strings are dropped. Only a wrong
//! container shape (a string where a list belongs) fails the description.
//! References to unknown states are not rejected here; the compiler drops them.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[cfg(test)]
#[path = "description_test.rs"]
mod tests;

/// Error returned when a JSON value is not an automaton description.
#[derive(Debug, thiserror::Error)]
pub enum DescriptionError {
    /// No description was supplied at all.
    #[error("automaton description is missing")]
    Missing,
    /// The text is not a JSON automaton description.
    #[error("invalid automaton description: {0}")]
    Json(#[from] serde_json::Error),
}

/// One automaton: states, accepting set, start state and transition function.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct AutomatonDescription {
    /// State labels in declaration order.
    #[serde(default, alias = "estados", deserialize_with = "lenient_labels")]
    pub states: Vec<String>,
    /// Labels of accepting states.
    #[serde(default, alias = "finais", deserialize_with = "lenient_labels")]
    pub accepting: IndexSet<String>,
    /// Label of the start state, if any.
    #[serde(default, alias = "inicial", deserialize_with = "lenient_start")]
    pub start: Option<String>,
    /// `"source,symbol"` keys mapped to destination labels, in document order.
    #[serde(default, alias = "transicoes", deserialize_with = "lenient_transitions")]
    pub transitions: IndexMap<String, String>,
}

/// A single transition resolved from its composite key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition<'a> {
    pub source: &'a str,
    pub symbol: &'a str,
    pub target: &'a str,
}

impl AutomatonDescription {
    /// Convert an already parsed JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`DescriptionError::Missing`] for `null` and
    /// [`DescriptionError::Json`] when the value is not an object or a field
    /// has the wrong container shape.
    pub fn from_value(value: Value) -> Result<Self, DescriptionError> {
        if value.is_null() {
            return Err(DescriptionError::Missing);
        }
        Ok(serde_json::from_value(value)?)
    }

    /// The start label, treating an empty string as absent.
    #[must_use]
    pub fn start_state(&self) -> Option<&str> {
        self.start.as_deref().filter(|label| !label.is_empty())
    }

    #[must_use]
    pub fn is_accepting(&self, label: &str) -> bool {
        self.accepting.contains(label)
    }

    /// Iterate transitions in document order, skipping keys without a comma.
    ///
    /// Keys are split with [`resolve_key`] against the declared states.
    pub fn iter_transitions(&self) -> impl Iterator<Item = Transition<'_>> {
        let known: IndexSet<&str> = self.states.iter().map(String::as_str).collect();
        self.transitions.iter().filter_map(move |(key, target)| {
            let Some((source, symbol)) = resolve_key(key, |label| known.contains(label)) else {
                tracing::debug!(%key, "dropping transition with malformed key");
                return None;
            };
            Some(Transition { source, symbol, target })
        })
    }
}

/// Split a `"source,symbol"` key at its last comma.
///
/// State labels may themselves contain commas (`{q0,q1}`); the symbol is
/// whatever follows the last one.
#[must_use]
pub fn split_key(key: &str) -> Option<(&str, &str)> {
    key.rsplit_once(',')
}

/// Split a key, preferring a split whose source is a known state.
///
/// The last comma wins when its source resolves. Otherwise the first comma is
/// tried, which covers a `,` symbol (`"q0,,"`). When neither resolves the
/// last-comma split is returned and the caller drops it as dangling.
#[must_use]
pub fn resolve_key(key: &str, is_state: impl Fn(&str) -> bool) -> Option<(&str, &str)> {
    let last = split_key(key)?;
    if is_state(last.0) {
        return Some(last);
    }
    key.split_once(',').filter(|(source, _)| is_state(source)).or(Some(last))
}

// =============================================================================
// LENIENT FIELDS
// =============================================================================

fn string_label(value: Value) -> Option<String> {
    match value {
        Value::String(label) => Some(label),
        other => {
            tracing::debug!(%other, "dropping non-string label");
            None
        }
    }
}

fn lenient_labels<'de, D, C>(deserializer: D) -> Result<C, D::Error>
where
    D: Deserializer<'de>,
    C: FromIterator<String>,
{
    let items: Option<Vec<Value>> = Option::deserialize(deserializer)?;
    Ok(items.into_iter().flatten().filter_map(string_label).collect())
}

fn lenient_start<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<Value> = Option::deserialize(deserializer)?;
    Ok(value.and_then(string_label))
}

fn lenient_transitions<'de, D>(deserializer: D) -> Result<IndexMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries: Option<IndexMap<String, Value>> = Option::deserialize(deserializer)?;
    Ok(entries
        .into_iter()
        .flatten()
        .filter_map(|(key, target)| string_label(target).map(|target| (key, target)))
        .collect())
}
