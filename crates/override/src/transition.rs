//! The override transition mutator

use tracing::debug;
use varia_events::{EventEmitter, MutatorEvent};
use varia_graph::DepTag;
use varia_transition::{
    IncomingContext, MutateContext, OutgoingContext, SplitContext, TransitionMutator,
};
use varia_types::extend_properties;

use crate::info::{OverrideInfo, OVERRIDE_INFO};

pub const OVERRIDE: &str = "override";

/// Creates one variant of each overridable module per override module that
/// names it as base, and applies the overriding properties to it
#[derive(Debug, Clone, Copy, Default)]
pub struct OverrideTransitionMutator;

impl TransitionMutator for OverrideTransitionMutator {
    type Info = OverrideInfo;

    fn name(&self) -> &str {
        OVERRIDE
    }

    fn split(&self, ctx: &SplitContext<'_>) -> Vec<OverrideInfo> {
        if ctx.module().is_override() {
            // Variant named after the override module itself, so that
            // dependencies on it can later be matched with the variant of
            // the base it produced
            let info = ctx.provider(&OVERRIDE_INFO).map(|info| (*info).clone());
            return vec![info.unwrap_or_default()];
        }
        vec![OverrideInfo::default()]
    }

    fn outgoing_transition(&self, ctx: &OutgoingContext<'_>, source: &OverrideInfo) -> OverrideInfo {
        if ctx.module().is_override() && *ctx.tag() == DepTag::OverrideBase {
            return source.clone();
        }
        // Override variants are local to a module and never select the
        // variant of a dependency
        OverrideInfo::default()
    }

    fn incoming_transition(&self, ctx: &IncomingContext<'_>, incoming: OverrideInfo) -> OverrideInfo {
        let module = ctx.module();
        if module.is_overridable() {
            incoming
        } else if module.is_override() {
            ctx.provider(&OVERRIDE_INFO)
                .map(|info| (*info).clone())
                .unwrap_or_default()
        } else {
            OverrideInfo::default()
        }
    }

    fn accepts_new_variant(&self, ctx: &IncomingContext<'_>, _info: &OverrideInfo) -> bool {
        ctx.module().is_overridable()
    }

    fn mutate(&self, ctx: &mut MutateContext<'_>, info: &OverrideInfo) {
        if info.name.is_empty() || !ctx.module().is_overridable() {
            return;
        }

        apply_override(ctx, info);
        check_prebuilt_replaces_override(ctx, info);

        let module = ctx.module();
        let event = MutatorEvent::OverrideApplied {
            module: module.qualified_name(),
            overridden_by: info.name.clone(),
            replaced_by_prebuilt: module.base().replaced_by_prebuilt(),
        };
        ctx.emit_mutator(event);
    }
}

/// Merge the overriding properties onto this variant, record the base in
/// the overrides list and remember who overrode it
fn apply_override(ctx: &mut MutateContext<'_>, info: &OverrideInfo) {
    let mut errors = Vec::new();
    let module = ctx.module_mut();
    for overriding in &info.overriding_properties {
        // Every schema of the module type exists on the module, even when
        // the module never set one of its fields
        if module.property(overriding.schema()).is_none()
            && module.descriptor().find_schema(overriding.schema()).is_none()
        {
            continue;
        }
        let props = module.property_entry(overriding.schema());
        if let Err(err) = extend_properties(props, overriding) {
            let path = match err.property() {
                "" => overriding.schema().to_string(),
                field => format!("{}.{field}", overriding.schema()),
            };
            errors.push((path, err));
        }
    }
    for (path, err) in errors {
        ctx.other_module_property_error(&info.name, path, err.to_string());
    }

    let module = ctx.module_mut();
    let base_name = module.name().to_string();
    if let Some(field) = module.descriptor().get_overrides_property().cloned() {
        let recorded = match module.property_entry(&field.schema).list_mut(&field.field) {
            Some(overrides) => {
                overrides.push(base_name);
                true
            }
            None => false,
        };
        if !recorded {
            ctx.property_error(field.field.as_str(), "overrides property is not a list");
        }
    }

    if let Some(state) = ctx.module_mut().overridable_state_mut() {
        state.set_overridden_by(info.name.as_str());
    }
    debug!(module = %ctx.module().qualified_name(), overridden_by = %info.name, "override applied");
}

/// When a prebuilt is preferred over the override module, this variant is
/// replaced by it: the two must install to the same partition
fn check_prebuilt_replaces_override(ctx: &mut MutateContext<'_>, info: &OverrideInfo) {
    if !info.use_prebuilt {
        return;
    }

    let source_partition = ctx.module().partition_tag();
    let source_name = ctx.module().name().to_string();
    for (prebuilt, partition) in info.prebuilts() {
        if partition != source_partition {
            ctx.module_error(format!(
                "partition is different: {source_partition}({source_name}) != {partition}({prebuilt})"
            ));
        }
    }
    ctx.module_mut().base_mut().set_replaced_by_prebuilt();
}
