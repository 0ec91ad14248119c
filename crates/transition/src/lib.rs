#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Mutator engine
//!
//! A [`Pipeline`] is an ordered list of mutator phases run by an
//! [`Engine`] over a [`varia_graph::ModuleGraph`]:
//!
//! - local mutators edit one module at a time,
//! - bottom-up mutators visit modules after their dependencies and queue
//!   graph edits that are applied once every module has been visited,
//! - transition mutators split modules into variants and rewire every
//!   dependency edge to the variant its transition rules select.

mod bottom_up;
mod context;
mod erased;
mod local;
mod mutator;
mod parallel;
mod pipeline;
mod resolve;
mod transition;

pub use bottom_up::BottomUpContext;
pub use context::{IncomingContext, MutateContext, OutgoingContext, SplitContext};
pub use mutator::{BottomUpMutator, LocalMutator, TransitionInfo, TransitionMutator};
pub use pipeline::{Engine, Pipeline};
