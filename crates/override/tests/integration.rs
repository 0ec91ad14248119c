//! Integration tests for override modules

#[cfg(test)]
mod tests {
    use varia_config::Config;
    use varia_errors::Error;
    use varia_events::{channel, AppEvent, MutatorEvent};
    use varia_graph::{
        DepTag, FieldRef, Module, ModuleGraph, ModuleId, ModuleTypeDescriptor, ModuleTypeRegistry,
    };
    use varia_override::*;
    use varia_transition::{Engine, Pipeline};
    use varia_types::{ModuleKind, PropertyKind, PropertySchema, PropertyStruct, PropertyValue, SchemaId};

    const APP: SchemaId = SchemaId::new("app");

    fn app_schema() -> PropertySchema {
        PropertySchema::new(APP)
            .field("foo", PropertyKind::String)
            .field("overrides", PropertyKind::List)
            .field("required", PropertyKind::List)
    }

    fn registry() -> ModuleTypeRegistry {
        let mut registry = ModuleTypeRegistry::new();
        registry
            .register(
                ModuleTypeDescriptor::new("android_app")
                    .schema(app_schema())
                    .overrides_property(FieldRef::new(APP, "overrides"))
                    .dependency_property(FieldRef::new(APP, "required")),
            )
            .unwrap();
        registry
            .register(ModuleTypeDescriptor::new("override_android_app").schema(app_schema()))
            .unwrap();
        registry
            .register(ModuleTypeDescriptor::new("android_app_import").schema(app_schema()))
            .unwrap();
        registry
            .register(
                ModuleTypeDescriptor::new("override_flag_app")
                    .schema(PropertySchema::new(APP).field("foo", PropertyKind::Bool)),
            )
            .unwrap();
        registry
            .register(ModuleTypeDescriptor::new("phony"))
            .unwrap();
        registry
    }

    fn app_with(name: &str, props: PropertyStruct) -> Module {
        registry()
            .create("android_app", name)
            .unwrap()
            .as_overridable()
            .with_properties(props)
    }

    fn app(name: &str, foo: &str) -> Module {
        app_with(name, PropertyStruct::new(APP).with("foo", foo))
    }

    fn override_app_with(name: &str, base: &str, props: PropertyStruct) -> Module {
        registry()
            .create("override_android_app", name)
            .unwrap()
            .as_override(base)
            .with_properties(props)
    }

    fn override_app(name: &str, base: &str, foo: &str) -> Module {
        override_app_with(name, base, PropertyStruct::new(APP).with("foo", foo))
    }

    fn phony(name: &str) -> Module {
        registry().create("phony", name).unwrap()
    }

    fn pipeline() -> Pipeline {
        let mut pipeline = Pipeline::new();
        register_override_mutators(&mut pipeline);
        pipeline
    }

    fn run(graph: ModuleGraph) -> Result<ModuleGraph, Error> {
        Engine::new(Config::default()).run(&pipeline(), graph)
    }

    fn foo(graph: &ModuleGraph, id: ModuleId) -> &str {
        graph
            .module(id)
            .property(&APP)
            .and_then(|props| props.get_str("foo"))
            .unwrap()
    }

    fn deps_named(graph: &ModuleGraph, id: ModuleId, tag: &str) -> Vec<String> {
        graph
            .module(id)
            .deps_with_tag(&DepTag::Named(tag.into()))
            .map(|dep| graph.module(dep).qualified_name())
            .collect()
    }

    #[test]
    fn test_pipeline_order() {
        assert_eq!(
            pipeline().names(),
            vec![OVERRIDE_DEPS, OVERRIDE, OVERRIDABLE_DEPS, REPLACE_DEPS_ON_OVERRIDE]
        );
    }

    #[test]
    fn test_override_replaces_properties_on_named_variant() {
        let mut graph = ModuleGraph::new();
        graph.add_module(app("bar", "original")).unwrap();
        graph
            .add_module(override_app("foo_override", "bar", "changed"))
            .unwrap();

        let graph = run(graph).unwrap();

        assert_eq!(graph.variants("bar").len(), 2);
        let original = graph.find_variant("bar", "").unwrap();
        let overridden = graph.find_variant("bar", "foo_override").unwrap();
        assert_eq!(foo(&graph, original), "original");
        assert_eq!(foo(&graph, overridden), "changed");

        let state = graph.module(overridden).overridable_state().unwrap();
        assert_eq!(state.overridden_by(), "foo_override");
        let state = graph.module(original).overridable_state().unwrap();
        assert_eq!(state.overridden_by(), "");

        let overrides = graph
            .module(overridden)
            .property(&APP)
            .and_then(|props| props.get_list("overrides"))
            .unwrap();
        assert_eq!(overrides, ["bar"]);
        assert!(graph
            .module(original)
            .property(&APP)
            .and_then(|props| props.get_list("overrides"))
            .is_none());
    }

    #[test]
    fn test_override_applies_to_schema_the_base_never_set() {
        let mut graph = ModuleGraph::new();
        graph
            .add_module(registry().create("android_app", "bar").unwrap().as_overridable())
            .unwrap();
        graph
            .add_module(override_app("foo_override", "bar", "changed"))
            .unwrap();

        let graph = run(graph).unwrap();

        let original = graph.find_variant("bar", "").unwrap();
        let overridden = graph.find_variant("bar", "foo_override").unwrap();
        assert!(graph.module(original).property(&APP).is_none());
        assert_eq!(foo(&graph, overridden), "changed");
        let overrides = graph
            .module(overridden)
            .property(&APP)
            .and_then(|props| props.get_list("overrides"))
            .unwrap();
        assert_eq!(overrides, ["bar"]);
    }

    #[test]
    fn test_mismatched_property_is_reported_on_override_module() {
        let mut graph = ModuleGraph::new();
        graph.add_module(app("bar", "original")).unwrap();
        graph
            .add_module(
                registry()
                    .create("override_flag_app", "foo_override")
                    .unwrap()
                    .as_override("bar")
                    .with_properties(PropertyStruct::new(APP).with("foo", true)),
            )
            .unwrap();

        let err = run(graph).unwrap_err();
        let diagnostics = err.diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].module, "foo_override");
        assert_eq!(diagnostics[0].variant, "foo_override");
        assert_eq!(diagnostics[0].property.as_deref(), Some("app.foo"));
        assert_eq!(diagnostics[0].message, "mismatched types string and bool");
    }

    #[test]
    fn test_unset_fields_are_kept() {
        let mut graph = ModuleGraph::new();
        graph
            .add_module(app_with(
                "bar",
                PropertyStruct::new(APP)
                    .with("foo", "original")
                    .with("overrides", PropertyValue::list(["old_app"])),
            ))
            .unwrap();
        graph
            .add_module(
                registry()
                    .create("override_android_app", "foo_override")
                    .unwrap()
                    .as_override("bar"),
            )
            .unwrap();

        let graph = run(graph).unwrap();
        let overridden = graph.find_variant("bar", "foo_override").unwrap();
        assert_eq!(foo(&graph, overridden), "original");
        let overrides = graph
            .module(overridden)
            .property(&APP)
            .and_then(|props| props.get_list("overrides"))
            .unwrap();
        assert_eq!(overrides, ["old_app", "bar"]);
    }

    #[test]
    fn test_missing_base_is_property_error() {
        let mut graph = ModuleGraph::new();
        graph
            .add_module(override_app("foo_override", "nonexistent", "changed"))
            .unwrap();

        let err = run(graph).unwrap_err();
        let diagnostics = err.diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].module, "foo_override");
        assert_eq!(diagnostics[0].property.as_deref(), Some("base"));
        assert!(diagnostics[0].message.contains("\"nonexistent\""));
    }

    #[test]
    fn test_two_overrides_of_one_base() {
        let mut graph = ModuleGraph::new();
        graph.add_module(app("bar", "original")).unwrap();
        graph
            .add_module(override_app("foo_override", "bar", "foo"))
            .unwrap();
        graph
            .add_module(override_app("baz_override", "bar", "baz"))
            .unwrap();

        let graph = run(graph).unwrap();

        let names: Vec<String> = graph
            .variants("bar")
            .iter()
            .map(|id| graph.module(*id).qualified_name())
            .collect();
        assert_eq!(names, vec!["bar", "bar{foo_override}", "bar{baz_override}"]);

        let foo_variant = graph.find_variant("bar", "foo_override").unwrap();
        let baz_variant = graph.find_variant("bar", "baz_override").unwrap();
        assert_eq!(foo(&graph, foo_variant), "foo");
        assert_eq!(foo(&graph, baz_variant), "baz");
        assert_eq!(foo(&graph, graph.find_variant("bar", "").unwrap()), "original");
    }

    #[test]
    fn test_dependencies_on_override_are_redirected() {
        let mut graph = ModuleGraph::new();
        graph.add_module(app("bar", "original")).unwrap();
        graph
            .add_module(override_app("foo_override", "bar", "changed"))
            .unwrap();
        let user = graph.add_module(phony("user")).unwrap();
        graph
            .add_dependency(user, DepTag::Named("apps".into()), "foo_override")
            .unwrap();

        let graph = run(graph).unwrap();

        let user = graph.find_variant("user", "").unwrap();
        assert_eq!(deps_named(&graph, user, "apps"), vec!["bar{foo_override}"]);

        // The override module still points at its base variant
        let override_module = graph.find_variant("foo_override", "foo_override").unwrap();
        let base: Vec<String> = graph
            .module(override_module)
            .deps_with_tag(&DepTag::OverrideBase)
            .map(|id| graph.module(id).qualified_name())
            .collect();
        assert_eq!(base, vec!["bar{foo_override}"]);
    }

    #[test]
    fn test_redirection_is_idempotent() {
        let build = || {
            let mut graph = ModuleGraph::new();
            graph.add_module(app("bar", "original")).unwrap();
            graph
                .add_module(override_app("foo_override", "bar", "changed"))
                .unwrap();
            let user = graph.add_module(phony("user")).unwrap();
            graph
                .add_dependency(user, DepTag::Named("apps".into()), "foo_override")
                .unwrap();
            graph
        };

        let once = run(build()).unwrap();
        let mut twice_pipeline = pipeline();
        twice_pipeline.bottom_up(ReplaceDepsOnOverrideMutator);
        let twice = Engine::new(Config::default())
            .run(&twice_pipeline, build())
            .unwrap();

        let edges = |graph: &ModuleGraph| -> Vec<Vec<String>> {
            graph
                .modules()
                .map(|(_, module)| {
                    module
                        .deps()
                        .iter()
                        .map(|dep| graph.module(dep.target).qualified_name())
                        .collect()
                })
                .collect()
        };
        assert_eq!(edges(&once), edges(&twice));
    }

    #[test]
    fn test_overridable_dependencies_use_overridden_values() {
        let mut graph = ModuleGraph::new();
        graph.add_module(phony("libfoo")).unwrap();
        graph.add_module(phony("libbaz")).unwrap();
        graph
            .add_module(app_with(
                "bar",
                PropertyStruct::new(APP)
                    .with("foo", "original")
                    .with("required", PropertyValue::list(["libfoo"])),
            ))
            .unwrap();
        graph
            .add_module(override_app_with(
                "baz_override",
                "bar",
                PropertyStruct::new(APP)
                    .with("foo", "baz")
                    .with("required", PropertyValue::list(["libbaz"])),
            ))
            .unwrap();

        let graph = run(graph).unwrap();

        let original = graph.find_variant("bar", "").unwrap();
        let overridden = graph.find_variant("bar", "baz_override").unwrap();
        assert_eq!(deps_named(&graph, original, "required"), vec!["libfoo"]);
        assert_eq!(deps_named(&graph, overridden, "required"), vec!["libbaz"]);
    }

    #[test]
    fn test_disabled_overridable_adds_no_dependencies() {
        let mut graph = ModuleGraph::new();
        graph.add_module(phony("libfoo")).unwrap();
        graph
            .add_module(
                app_with(
                    "bar",
                    PropertyStruct::new(APP).with("required", PropertyValue::list(["libfoo"])),
                )
                .with_enabled(false),
            )
            .unwrap();

        let graph = run(graph).unwrap();
        let bar = graph.find_variant("bar", "").unwrap();
        assert!(deps_named(&graph, bar, "required").is_empty());
    }

    fn prebuilt(name: &str, preferred: bool) -> Module {
        registry()
            .create("android_app_import", name)
            .unwrap()
            .as_prebuilt(preferred)
    }

    #[test]
    fn test_preferred_prebuilt_hides_override_variant() {
        let mut graph = ModuleGraph::new();
        graph.add_module(app("bar", "original")).unwrap();
        graph.add_module(prebuilt("prebuilt_foo_override", true)).unwrap();
        let over = graph
            .add_module(override_app("foo_override", "bar", "changed"))
            .unwrap();
        graph
            .add_dependency(over, DepTag::Prebuilt, "prebuilt_foo_override")
            .unwrap();

        let graph = run(graph).unwrap();

        let overridden = graph.find_variant("bar", "foo_override").unwrap();
        let base = graph.module(overridden).base();
        assert!(base.replaced_by_prebuilt());
        assert!(base.hide_from_make());

        let original = graph.find_variant("bar", "").unwrap();
        assert!(!graph.module(original).base().replaced_by_prebuilt());
    }

    #[test]
    fn test_prebuilt_on_other_partition_is_rejected() {
        let mut graph = ModuleGraph::new();
        graph.add_module(app("bar", "original")).unwrap();
        graph
            .add_module(
                prebuilt("prebuilt_foo_override", true)
                    .with_kind(ModuleKind::ProductSpecific),
            )
            .unwrap();
        let over = graph
            .add_module(override_app("foo_override", "bar", "changed"))
            .unwrap();
        graph
            .add_dependency(over, DepTag::Prebuilt, "prebuilt_foo_override")
            .unwrap();

        let err = run(graph).unwrap_err();
        let diagnostics = err.diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].module, "bar");
        assert_eq!(diagnostics[0].variant, "foo_override");
        assert_eq!(
            diagnostics[0].message,
            "partition is different: system(bar) != product(prebuilt_foo_override)"
        );
    }

    #[test]
    fn test_unpreferred_prebuilt_is_ignored() {
        let mut graph = ModuleGraph::new();
        graph.add_module(app("bar", "original")).unwrap();
        graph
            .add_module(
                prebuilt("prebuilt_foo_override", false)
                    .with_kind(ModuleKind::ProductSpecific),
            )
            .unwrap();
        let over = graph
            .add_module(override_app("foo_override", "bar", "changed"))
            .unwrap();
        graph
            .add_dependency(over, DepTag::Prebuilt, "prebuilt_foo_override")
            .unwrap();

        let graph = run(graph).unwrap();
        let overridden = graph.find_variant("bar", "foo_override").unwrap();
        assert!(!graph.module(overridden).base().replaced_by_prebuilt());
    }

    #[test]
    fn test_prebuilt_edge_to_source_module_is_internal_error() {
        let mut graph = ModuleGraph::new();
        graph.add_module(app("bar", "original")).unwrap();
        graph.add_module(phony("not_a_prebuilt")).unwrap();
        let over = graph
            .add_module(override_app("foo_override", "bar", "changed"))
            .unwrap();
        graph
            .add_dependency(over, DepTag::Prebuilt, "not_a_prebuilt")
            .unwrap();

        let err = run(graph).unwrap_err();
        assert!(matches!(err, Error::Internal(ref msg) if msg.contains("not_a_prebuilt")));
    }

    #[test]
    fn test_override_events() {
        let (tx, mut rx) = channel();
        let mut graph = ModuleGraph::new();
        graph.add_module(app("bar", "original")).unwrap();
        graph
            .add_module(override_app("foo_override", "bar", "changed"))
            .unwrap();
        let user = graph.add_module(phony("user")).unwrap();
        graph
            .add_dependency(user, DepTag::Named("apps".into()), "foo_override")
            .unwrap();

        Engine::new(Config::default())
            .with_events(tx)
            .run(&pipeline(), graph)
            .unwrap();

        let mut applied = Vec::new();
        let mut redirected = Vec::new();
        while let Ok(message) = rx.try_recv() {
            match message.event {
                AppEvent::Mutator(MutatorEvent::OverrideApplied {
                    module,
                    overridden_by,
                    ..
                }) => applied.push((module, overridden_by)),
                AppEvent::Mutator(MutatorEvent::DependenciesRedirected { from, to, edges, .. }) => {
                    redirected.push((from, to, edges));
                }
                _ => {}
            }
        }
        assert_eq!(
            applied,
            vec![("bar{foo_override}".to_string(), "foo_override".to_string())]
        );
        assert_eq!(
            redirected,
            vec![("foo_override".to_string(), "bar".to_string(), 1)]
        );
    }
}
