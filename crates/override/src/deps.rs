//! Bottom-up phases around the override transition

use tracing::{debug, trace};
use varia_graph::DepTag;
use varia_transition::{BottomUpContext, BottomUpMutator};

use crate::info::{OverrideInfo, OVERRIDE_INFO};

pub const OVERRIDE_DEPS: &str = "override_deps";
pub const OVERRIDABLE_DEPS: &str = "overridable_deps";
pub const REPLACE_DEPS_ON_OVERRIDE: &str = "replace_deps_on_override";

/// Links each override module to its base and publishes its override info
#[derive(Debug, Clone, Copy, Default)]
pub struct OverrideDepsMutator;

impl BottomUpMutator for OverrideDepsMutator {
    fn name(&self) -> &str {
        OVERRIDE_DEPS
    }

    fn visit(&self, ctx: &mut BottomUpContext<'_>) {
        let module = ctx.module();
        let Some(state) = module.override_state() else {
            return;
        };
        let base = state.base();
        if !ctx.other_module_exists(base) {
            ctx.property_error("base", format!("{base:?} is not a valid module name"));
            return;
        }

        ctx.add_dependency(DepTag::OverrideBase, base);

        let mut info = OverrideInfo::new(module.name(), module.properties().to_vec());
        let prebuilts: Vec<_> = ctx.direct_deps_with_tag(&DepTag::Prebuilt).collect();
        for (_, prebuilt) in prebuilts {
            let Some(state) = prebuilt.prebuilt() else {
                ctx.internal_error(format!(
                    "prebuilt dependency of {} leads to a non-prebuilt module {}",
                    module.name(),
                    prebuilt.name()
                ));
                return;
            };
            info.add_prebuilt(prebuilt.name(), prebuilt.partition_tag(), state.use_prebuilt);
        }

        trace!(module = module.name(), base, prebuilts = info.prebuilt_names.len(), "override info");
        ctx.set_provider(&OVERRIDE_INFO, info);
    }
}

/// Adds the dependencies named by overridable properties, using the values
/// left after overriding
#[derive(Debug, Clone, Copy, Default)]
pub struct OverridableDepsMutator;

impl BottomUpMutator for OverridableDepsMutator {
    fn name(&self) -> &str {
        OVERRIDABLE_DEPS
    }

    fn visit(&self, ctx: &mut BottomUpContext<'_>) {
        let module = ctx.module();
        if !module.is_overridable() || !module.enabled() {
            return;
        }

        for field in module.descriptor().dependency_properties() {
            let Some(names) = module
                .property(&field.schema)
                .and_then(|props| props.get_list(&field.field))
            else {
                continue;
            };
            for name in names {
                ctx.add_dependency(DepTag::Named(field.field.clone()), name.as_str());
            }
        }
    }
}

/// Redirects dependencies on an override module to the variant of its base
/// it produced
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplaceDepsOnOverrideMutator;

impl BottomUpMutator for ReplaceDepsOnOverrideMutator {
    fn name(&self) -> &str {
        REPLACE_DEPS_ON_OVERRIDE
    }

    fn visit(&self, ctx: &mut BottomUpContext<'_>) {
        let Some(state) = ctx.module().overridable_state() else {
            return;
        };
        let overridden_by = state.overridden_by();
        if overridden_by.is_empty() {
            return;
        }
        debug!(
            module = %ctx.module().qualified_name(),
            overridden_by,
            "redirecting dependencies"
        );
        ctx.replace_dependencies(overridden_by);
    }
}
