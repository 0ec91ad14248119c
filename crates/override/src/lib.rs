#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Override modules
//!
//! An override module names a `base` module and carries properties that
//! replace the base module's own. Every override module gets a variant of
//! its base, named after the override module, with the overriding
//! properties merged in. Dependencies on the override module are then
//! redirected to that variant.

mod deps;
mod info;
mod transition;

pub use deps::{
    OverridableDepsMutator, OverrideDepsMutator, ReplaceDepsOnOverrideMutator, OVERRIDABLE_DEPS,
    OVERRIDE_DEPS, REPLACE_DEPS_ON_OVERRIDE,
};
pub use info::{OverrideInfo, OVERRIDE_INFO};
pub use transition::{OverrideTransitionMutator, OVERRIDE};

use varia_transition::Pipeline;

/// Register the override mutators. They must run in this order with
/// nothing in between.
pub fn register_override_mutators(pipeline: &mut Pipeline) {
    pipeline
        .bottom_up(OverrideDepsMutator)
        .transition(OverrideTransitionMutator)
        .bottom_up(OverridableDepsMutator)
        .bottom_up(ReplaceDepsOnOverrideMutator);
}
