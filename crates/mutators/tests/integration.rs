//! End-to-end tests of the default mutators

#[cfg(test)]
mod tests {
    use std::io::Write;

    use varia_config::{Config, FIX_IMAGE_VARIANT_FALLBACK};
    use varia_errors::{Error, TransitionError};
    use varia_events::{channel, AppEvent, MutatorEvent};
    use varia_graph::{
        DepTag, FieldRef, Module, ModuleGraph, ModuleId, ModuleTypeDescriptor, ModuleTypeRegistry,
    };
    use varia_image::{DeclaredImageVariants, ImageFlags};
    use varia_mutators::*;
    use varia_types::{Os, PropertyKind, PropertySchema, PropertyStruct, SchemaId};

    const APP: SchemaId = SchemaId::new("app");

    fn registry() -> ModuleTypeRegistry {
        let schema = || {
            PropertySchema::new(APP)
                .field("foo", PropertyKind::String)
                .field("overrides", PropertyKind::List)
        };
        let mut registry = ModuleTypeRegistry::new();
        registry
            .register(
                ModuleTypeDescriptor::new("android_app")
                    .schema(schema())
                    .overrides_property(FieldRef::new(APP, "overrides")),
            )
            .unwrap();
        registry
            .register(ModuleTypeDescriptor::new("override_android_app").schema(schema()))
            .unwrap();
        registry
            .register(ModuleTypeDescriptor::new("cc_library"))
            .unwrap();
        registry
    }

    fn image(vendor_available: bool) -> DeclaredImageVariants {
        DeclaredImageVariants::from(ImageFlags {
            vendor_available,
            ..ImageFlags::default()
        })
    }

    fn bar(vendor_available: bool) -> Module {
        registry()
            .create("android_app", "bar")
            .unwrap()
            .with_os(Os::Android)
            .with_image(image(vendor_available))
            .as_overridable()
            .with_properties(PropertyStruct::new(APP).with("foo", "original"))
    }

    fn override_of(name: &str, base: &str, foo: &str, vendor_available: bool) -> Module {
        registry()
            .create("override_android_app", name)
            .unwrap()
            .with_os(Os::Android)
            .with_image(image(vendor_available))
            .as_override(base)
            .with_properties(PropertyStruct::new(APP).with("foo", foo))
    }

    fn library(name: &str, declared: DeclaredImageVariants) -> Module {
        registry()
            .create("cc_library", name)
            .unwrap()
            .with_os(Os::Android)
            .with_image(declared)
    }

    fn foo(graph: &ModuleGraph, id: ModuleId) -> &str {
        graph
            .module(id)
            .property(&APP)
            .and_then(|props| props.get_str("foo"))
            .unwrap()
    }

    fn run(graph: ModuleGraph) -> Result<ModuleGraph, Error> {
        MutatorsContextBuilder::new()
            .build()
            .run(graph)
            .map(|(graph, _)| graph)
    }

    fn qualified(graph: &ModuleGraph, name: &str) -> Vec<String> {
        graph
            .variants(name)
            .iter()
            .map(|id| graph.module(*id).qualified_name())
            .collect()
    }

    #[test]
    fn test_override_changes_only_named_variant() {
        let mut graph = ModuleGraph::new();
        graph.add_module(bar(false)).unwrap();
        graph
            .add_module(override_of("foo_override", "bar", "changed", false))
            .unwrap();

        let graph = run(graph).unwrap();

        let overridden = graph.find_variant("bar", "foo_override").unwrap();
        let original = graph.find_variant("bar", "").unwrap();
        assert_eq!(foo(&graph, overridden), "changed");
        assert_eq!(foo(&graph, original), "original");
    }

    #[test]
    fn test_override_variants_per_image() {
        let mut graph = ModuleGraph::new();
        graph.add_module(bar(true)).unwrap();
        graph
            .add_module(override_of("foo_override", "bar", "changed", true))
            .unwrap();

        let graph = run(graph).unwrap();

        assert_eq!(
            qualified(&graph, "bar"),
            vec![
                "bar",
                "bar{foo_override}",
                "bar{vendor}",
                "bar{vendor,foo_override}",
            ]
        );
        let vendor_override = graph.find_variant("bar", "vendor_foo_override").unwrap();
        assert_eq!(foo(&graph, vendor_override), "changed");
        assert_eq!(
            graph.module(vendor_override).base().image_variation(),
            "vendor"
        );
        let vendor = graph.find_variant("bar", "vendor").unwrap();
        assert_eq!(foo(&graph, vendor), "original");
    }

    #[test]
    fn test_missing_base_names_the_module() {
        let mut graph = ModuleGraph::new();
        graph
            .add_module(override_of("foo_override", "nonexistent", "changed", false))
            .unwrap();

        let err = run(graph).unwrap_err();
        let diagnostic = &err.diagnostics()[0];
        assert_eq!(diagnostic.property.as_deref(), Some("base"));
        assert!(diagnostic.message.contains("\"nonexistent\""));
        assert!(err.to_string().contains("nonexistent"));
    }

    #[test]
    fn test_vendor_only_dependency() {
        let mut graph = ModuleGraph::new();
        let app = graph
            .add_module(library("app", DeclaredImageVariants::new()))
            .unwrap();
        graph
            .add_module(library("libvendor", DeclaredImageVariants::vendor_only()))
            .unwrap();
        graph
            .add_dependency(app, DepTag::Named("shared_libs".into()), "libvendor")
            .unwrap();

        let graph = run(graph).unwrap();

        assert_eq!(qualified(&graph, "libvendor"), vec!["libvendor{vendor}"]);
        let app = graph.find_variant("app", "").unwrap();
        let dep = graph.module(app).deps()[0].target;
        assert_eq!(graph.module(dep).qualified_name(), "libvendor{vendor}");
    }

    #[test]
    fn test_two_overrides_stay_independent() {
        let mut graph = ModuleGraph::new();
        graph.add_module(bar(false)).unwrap();
        graph
            .add_module(override_of("foo_override", "bar", "foo", false))
            .unwrap();
        graph
            .add_module(override_of("baz_override", "bar", "baz", false))
            .unwrap();
        let user = graph
            .add_module(library("user", DeclaredImageVariants::new()))
            .unwrap();
        graph
            .add_dependency(user, DepTag::Named("apps".into()), "foo_override")
            .unwrap();
        graph
            .add_dependency(user, DepTag::Named("apps".into()), "baz_override")
            .unwrap();

        let graph = run(graph).unwrap();

        let foo_variant = graph.find_variant("bar", "foo_override").unwrap();
        let baz_variant = graph.find_variant("bar", "baz_override").unwrap();
        assert_ne!(foo_variant, baz_variant);
        assert_eq!(foo(&graph, foo_variant), "foo");
        assert_eq!(foo(&graph, baz_variant), "baz");

        let user = graph.find_variant("user", "").unwrap();
        let targets: Vec<ModuleId> = graph.module(user).deps().iter().map(|d| d.target).collect();
        assert_eq!(targets, vec![foo_variant, baz_variant]);
    }

    #[test]
    fn test_redirection_keeps_image_variant() {
        let mut graph = ModuleGraph::new();
        graph.add_module(bar(true)).unwrap();
        graph
            .add_module(override_of("foo_override", "bar", "changed", true))
            .unwrap();
        let hal = graph
            .add_module(library("hal", DeclaredImageVariants::vendor_only()))
            .unwrap();
        graph
            .add_dependency(hal, DepTag::Named("apps".into()), "foo_override")
            .unwrap();

        let graph = run(graph).unwrap();

        let hal = graph.find_variant("hal", "vendor").unwrap();
        let dep = graph.module(hal).deps()[0].target;
        assert_eq!(graph.module(dep).qualified_name(), "bar{vendor,foo_override}");
    }

    #[test]
    fn test_fallback_fix_flag() {
        let mut graph = ModuleGraph::new();
        let hal = graph
            .add_module(library("hal", DeclaredImageVariants::vendor_only()))
            .unwrap();
        graph
            .add_module(library("libcore", DeclaredImageVariants::new()))
            .unwrap();
        graph
            .add_dependency(hal, DepTag::Named("shared_libs".into()), "libcore")
            .unwrap();

        let mut config = Config::default();
        config.flags.set(FIX_IMAGE_VARIANT_FALLBACK, true);
        let err = MutatorsContextBuilder::new()
            .with_config(config)
            .build()
            .run(graph)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Transition(TransitionError::MissingVariant { .. })
        ));
    }

    #[test]
    fn test_report_and_events() {
        let (tx, mut rx) = channel();
        let mut graph = ModuleGraph::new();
        graph.add_module(bar(true)).unwrap();
        graph
            .add_module(override_of("foo_override", "bar", "changed", false))
            .unwrap();

        let ctx = MutatorsContextBuilder::new().with_event_sender(tx).build();
        let (graph, report) = ctx.run(graph).unwrap();

        assert_eq!(report.modules_in, 2);
        assert_eq!(report.modules_out, graph.len());
        assert_eq!(report.phases.len(), ctx.pipeline().len());
        assert!(report.to_json().unwrap().contains("\"modules_out\""));

        let mut completed = Vec::new();
        while let Ok(message) = rx.try_recv() {
            if let AppEvent::Mutator(MutatorEvent::PhaseCompleted { mutator, .. }) = message.event {
                completed.push(mutator);
            }
        }
        assert_eq!(completed, report.phases);
    }

    #[tokio::test]
    async fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[engine]\njobs = 2\n\n[flags]\n{FIX_IMAGE_VARIANT_FALLBACK} = true"
        )
        .unwrap();

        let config = load_config(Some(&file.path().to_path_buf())).await.unwrap();
        assert!(config.get_build_flag_bool(FIX_IMAGE_VARIANT_FALLBACK));
    }

    #[tokio::test]
    async fn test_load_config_missing_file() {
        let path = std::path::PathBuf::from("/nonexistent/varia.toml");
        assert!(matches!(
            load_config(Some(&path)).await,
            Err(Error::Config(_))
        ));
    }
}
