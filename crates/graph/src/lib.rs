#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Module graph for the varia mutator engine
//!
//! This crate owns the module arena, dependency edges, the capability
//! model modules opt into, the typed provider side table and the
//! bottom-up execution plan used to schedule mutator phases.

mod capability;
mod diagnostics;
mod execution;
mod graph;
mod module;
mod provider;
mod registry;

pub use capability::{
    Capabilities, ImageContext, ImageInterface, OverridableState, OverrideState, PrebuiltState,
};
pub use diagnostics::Diagnostics;
pub use execution::{ExecutionPlan, ExecutionStats, NodeMeta};
pub use graph::ModuleGraph;
pub use module::{AppliedTransition, DepTag, Dependency, Module, ModuleBase, ModuleId};
pub use provider::{Provider, ProviderTable};
pub use registry::{FieldRef, ModuleTypeDescriptor, ModuleTypeRegistry};
