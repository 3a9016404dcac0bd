//! Mermaid flowchart compiler.
//!
//! DESIGN
//! ======
//! State labels are never embedded as node identifiers. Each state gets a
//! synthetic `s<i>` id in declaration order and its label only appears inside
//! a quoted display string, where `"` is the one character that needs
//! escaping. Transitions sharing both endpoints collapse into one edge whose
//! label lists the symbols in first-seen order.
//!
//! Both tables are local to a single [`compile`] call.

use std::borrow::Cow;
use std::fmt;

use indexmap::{IndexMap, IndexSet};

use crate::description::AutomatonDescription;

#[cfg(test)]
#[path = "flowchart_test.rs"]
mod tests;

const HEADER: &str = "graph LR\n";
const INDENT: &str = "    ";
const START_NODE: &str = "__start__";
const QUOTE_ESCAPE: &str = "#quot;";

// =============================================================================
// STATE IDENTIFIERS
// =============================================================================

/// Synthetic node identifier, rendered as `s<index>`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId(usize);

impl StateId {
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// Label to [`StateId`] assignment for one description.
#[derive(Debug)]
pub struct StateIds<'a> {
    labels: IndexSet<&'a str>,
}

impl<'a> StateIds<'a> {
    /// Assign ids in `states` order. A repeated label keeps its first id and
    /// does not consume a new one.
    #[must_use]
    pub fn assign(states: &'a [String]) -> Self {
        Self { labels: states.iter().map(String::as_str).collect() }
    }

    #[must_use]
    pub fn get(&self, label: &str) -> Option<StateId> {
        self.labels.get_index_of(label).map(StateId)
    }

    /// Iterate `(id, label)` pairs in assignment order.
    pub fn iter(&self) -> impl Iterator<Item = (StateId, &'a str)> + '_ {
        self.labels.iter().enumerate().map(|(index, label)| (StateId(index), *label))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

// =============================================================================
// TRANSITION GROUPING
// =============================================================================

/// Symbols grouped by `(source, target)` pair, keyed in first-seen order.
#[derive(Debug, Default)]
pub struct GroupedTransitions<'a> {
    groups: IndexMap<(StateId, StateId), Vec<&'a str>>,
}

impl<'a> GroupedTransitions<'a> {
    /// Group every transition whose endpoints both resolve in `ids`.
    #[must_use]
    pub fn build(afd: &'a AutomatonDescription, ids: &StateIds<'_>) -> Self {
        let mut groups: IndexMap<(StateId, StateId), Vec<&'a str>> = IndexMap::new();
        for transition in afd.iter_transitions() {
            let (Some(source), Some(target)) = (ids.get(transition.source), ids.get(transition.target)) else {
                tracing::debug!(
                    source = transition.source,
                    symbol = transition.symbol,
                    target = transition.target,
                    "dropping transition with unknown endpoint"
                );
                continue;
            };
            groups.entry((source, target)).or_default().push(transition.symbol);
        }
        Self { groups }
    }

    /// Iterate `(source, target, symbols)` in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (StateId, StateId, &[&'a str])> + '_ {
        self.groups
            .iter()
            .map(|(&(source, target), symbols)| (source, target, symbols.as_slice()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

// =============================================================================
// COMPILER
// =============================================================================

/// Replace every `"` with Mermaid's `#quot;` entity. Nothing else is touched.
#[must_use]
pub fn escape_label(label: &str) -> Cow<'_, str> {
    if label.contains('"') {
        Cow::Owned(label.replace('"', QUOTE_ESCAPE))
    } else {
        Cow::Borrowed(label)
    }
}

/// Compile one automaton description into Mermaid flowchart text.
///
/// Output is a `graph LR` header, one node per state (accepting states use the
/// double circle), an invisible start node pointing at the start state when it
/// resolves, then one labeled edge per grouped transition. Unknown references
/// are omitted rather than reported.
#[must_use]
pub fn compile(afd: &AutomatonDescription) -> String {
    let ids = StateIds::assign(&afd.states);
    let mut out = String::from(HEADER);

    for (id, label) in ids.iter() {
        let text = escape_label(label);
        if afd.is_accepting(label) {
            out.push_str(&format!("{INDENT}{id}((\"{text}\"))\n"));
        } else {
            out.push_str(&format!("{INDENT}{id}(\"{text}\")\n"));
        }
    }

    if let Some(start) = afd.start_state().and_then(|label| ids.get(label)) {
        out.push_str(&format!("\n{INDENT}style {START_NODE} fill:none,stroke:none\n"));
        out.push_str(&format!("{INDENT}{START_NODE}(( )) --> {start}\n\n"));
    } else if let Some(label) = afd.start_state() {
        tracing::debug!(start = label, "start state not declared; omitting start marker");
    }

    let grouped = GroupedTransitions::build(afd, &ids);
    for (source, target, symbols) in grouped.iter() {
        let label = symbols.join(",");
        let text = escape_label(&label);
        out.push_str(&format!("{INDENT}{source} -- \"{text}\" --> {target}\n"));
    }

    out
}
