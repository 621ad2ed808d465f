// src/graph/mod.rs

//! The dependency graph: item types, resolver records, and the Builder that
//! loads description files and drives records to the resolved state.

pub mod builder;
pub mod record;
pub mod target;

pub use builder::Builder;
pub use record::{BuilderRecord, Item, RecordState};
pub use target::{Config, DepEdge, DepKind, Target, TargetType, Toolchain};
