// src/graph/record.rs

use std::sync::Arc;

use crate::graph::target::{Config, Target};
use crate::label::Label;

/// Lifecycle of a resolver record. Transitions are monotone; a record never
/// regresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RecordState {
    /// Discovered by label in some dependency or config list; its file may
    /// not even be loaded yet.
    Referenced,
    /// Its declaration has been parsed and the item populated, but
    /// dependencies may still be referenced-only.
    Defined,
    /// The item and all transitive dependencies are defined; outputs are
    /// computed and the item is semantically complete.
    Resolved,
    /// Resolved, and the resolved-and-generated callback has fired.
    ResolvedAndGenerated,
}

/// The thing a record wraps once defined.
#[derive(Debug)]
pub enum Item {
    Target(Arc<Target>),
    Config(Arc<Config>),
}

impl Item {
    pub fn as_target(&self) -> Option<&Arc<Target>> {
        match self {
            Self::Target(t) => Some(t),
            Self::Config(_) => None,
        }
    }
}

/// One node in the resolution graph.
#[derive(Debug)]
pub struct BuilderRecord {
    pub label: Label,
    pub state: RecordState,
    pub item: Option<Item>,
    /// Label of the first record whose dependency list mentioned this one;
    /// used for missing-target diagnostics.
    pub referenced_from: Option<Label>,
    /// Record-graph edges: every label this record's item references
    /// (dependencies of all kinds plus configs).
    pub dep_labels: Vec<Label>,
}

impl BuilderRecord {
    pub fn referenced(label: Label, referenced_from: Option<Label>) -> Self {
        Self {
            label,
            state: RecordState::Referenced,
            item: None,
            referenced_from,
            dep_labels: Vec::new(),
        }
    }

    pub fn target(&self) -> Option<&Arc<Target>> {
        self.item.as_ref().and_then(Item::as_target)
    }

    /// Advance the lifecycle; backwards transitions are a logic error.
    pub fn advance(&mut self, state: RecordState) {
        debug_assert!(self.state <= state, "record state regressed");
        self.state = state;
    }
}
