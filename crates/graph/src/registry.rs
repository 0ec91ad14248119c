//! Module type descriptors
//!
//! Each module type declares, once, the property schemas its modules carry
//! and which list fields play a role in overriding. Matching between an
//! override module and its base is by schema identifier, never by name.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use varia_errors::{GraphError, PropertyError};
use varia_types::{PropertyKind, PropertySchema, PropertyStruct, SchemaId};

/// A field inside one of a module type's property schemas
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRef {
    pub schema: SchemaId,
    pub field: String,
}

impl FieldRef {
    pub fn new(schema: SchemaId, field: impl Into<String>) -> Self {
        Self {
            schema,
            field: field.into(),
        }
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.field)
    }
}

/// Static description of a module type
#[derive(Debug, Clone)]
pub struct ModuleTypeDescriptor {
    name: String,
    schemas: Vec<PropertySchema>,
    overrides_property: Option<FieldRef>,
    dependency_properties: Vec<FieldRef>,
}

impl ModuleTypeDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schemas: Vec::new(),
            overrides_property: None,
            dependency_properties: Vec::new(),
        }
    }

    /// Declare a property schema carried by modules of this type
    #[must_use]
    pub fn schema(mut self, schema: PropertySchema) -> Self {
        self.schemas.push(schema);
        self
    }

    /// List property that collects the names of the modules an overridden
    /// variant stands in for
    #[must_use]
    pub fn overrides_property(mut self, field: FieldRef) -> Self {
        self.overrides_property = Some(field);
        self
    }

    /// List property naming modules to depend on once overrides are applied
    #[must_use]
    pub fn dependency_property(mut self, field: FieldRef) -> Self {
        self.dependency_properties.push(field);
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn schemas(&self) -> &[PropertySchema] {
        &self.schemas
    }

    #[must_use]
    pub fn find_schema(&self, id: &SchemaId) -> Option<&PropertySchema> {
        self.schemas.iter().find(|s| &s.id == id)
    }

    #[must_use]
    pub fn get_overrides_property(&self) -> Option<&FieldRef> {
        self.overrides_property.as_ref()
    }

    #[must_use]
    pub fn dependency_properties(&self) -> &[FieldRef] {
        &self.dependency_properties
    }

    /// Check that every property struct is an instance of a declared schema
    ///
    /// # Errors
    ///
    /// Returns `PropertyError::MismatchedTypes` for an undeclared schema or a
    /// field whose kind differs from its declaration.
    pub fn validate(&self, properties: &[PropertyStruct]) -> Result<(), PropertyError> {
        for props in properties {
            let Some(schema) = self.find_schema(props.schema()) else {
                return Err(PropertyError::MismatchedTypes {
                    property: String::new(),
                    expected: format!("a property struct of {}", self.name),
                    found: props.schema().to_string(),
                });
            };
            schema.validate(props)?;
        }
        Ok(())
    }

    fn check_list_field(&self, field: &FieldRef) -> Result<(), PropertyError> {
        let spec = self
            .find_schema(&field.schema)
            .and_then(|schema| schema.field_spec(&field.field));
        match spec {
            Some(spec) if spec.kind == PropertyKind::List => Ok(()),
            Some(spec) => Err(PropertyError::MismatchedTypes {
                property: field.field.clone(),
                expected: PropertyKind::List.to_string(),
                found: spec.kind.to_string(),
            }),
            None => Err(PropertyError::MismatchedTypes {
                property: field.field.clone(),
                expected: PropertyKind::List.to_string(),
                found: "undeclared field".to_string(),
            }),
        }
    }
}

/// Registry of module types, built once before modules are created
#[derive(Debug, Clone, Default)]
pub struct ModuleTypeRegistry {
    types: HashMap<String, Arc<ModuleTypeDescriptor>>,
}

impl ModuleTypeRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module type
    ///
    /// # Errors
    ///
    /// Returns an error if the type name is already registered or if a role
    /// field does not name a declared list field.
    pub fn register(
        &mut self,
        descriptor: ModuleTypeDescriptor,
    ) -> Result<Arc<ModuleTypeDescriptor>, varia_errors::Error> {
        if self.types.contains_key(descriptor.name()) {
            return Err(GraphError::DuplicateModuleType {
                name: descriptor.name().to_string(),
            }
            .into());
        }
        if let Some(field) = descriptor.get_overrides_property() {
            descriptor.check_list_field(field)?;
        }
        for field in descriptor.dependency_properties() {
            descriptor.check_list_field(field)?;
        }

        tracing::debug!(module_type = %descriptor.name(), "registered module type");
        let descriptor = Arc::new(descriptor);
        self.types
            .insert(descriptor.name().to_string(), Arc::clone(&descriptor));
        Ok(descriptor)
    }

    /// Look up a registered module type
    ///
    /// # Errors
    ///
    /// Returns `GraphError::UnknownModuleType` if the type was never registered.
    pub fn get(&self, name: &str) -> Result<Arc<ModuleTypeDescriptor>, GraphError> {
        self.types
            .get(name)
            .cloned()
            .ok_or_else(|| GraphError::UnknownModuleType {
                name: name.to_string(),
            })
    }

    /// Create a module of a registered type
    ///
    /// # Errors
    ///
    /// Returns `GraphError::UnknownModuleType` if the type was never registered.
    pub fn create(&self, type_name: &str, name: &str) -> Result<crate::Module, GraphError> {
        Ok(crate::Module::new(&self.get(type_name)?, name))
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
