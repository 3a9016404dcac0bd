//! Automaton description model and Mermaid flowchart compiler.
//!
//! This crate owns the data shape the minimization service returns for each
//! automaton and the deterministic translation of that shape into Mermaid
//! `graph LR` text. It performs no I/O so both the binary and its tests can
//! call [`compile`] freely, including concurrently on independent inputs.

pub mod description;
pub mod flowchart;

pub use description::{AutomatonDescription, DescriptionError, Transition};
pub use flowchart::{GroupedTransitions, StateId, StateIds, compile, escape_label};
