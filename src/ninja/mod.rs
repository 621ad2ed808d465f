// src/ninja/mod.rs

//! Build-file emission for the downstream ninja-style executor: per-target
//! rule text, the aggregate root/toolchain files, and runtime-deps files.

pub mod runtime_deps;
pub mod target_writer;
pub mod writer;

pub use writer::{TargetRulePair, TargetWriteInfo};
