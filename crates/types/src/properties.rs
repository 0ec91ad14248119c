//! Property structs and the override merge
//!
//! A property struct is a schema-tagged bag of optional fields. Matching
//! between an overriding struct and an overridable struct is by schema
//! identifier, never by field or module name.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use varia_errors::PropertyError;

/// Identifies the shape of a property struct
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SchemaId(Cow<'static, str>);

impl SchemaId {
    /// Schema identifier backed by a static string
    #[must_use]
    pub const fn new(value: &'static str) -> Self {
        Self(Cow::Borrowed(value))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SchemaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kind of a property field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyKind {
    Bool,
    Int,
    String,
    List,
    Map,
    Struct,
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bool => "bool",
            Self::Int => "int64",
            Self::String => "string",
            Self::List => "[]string",
            Self::Map => "map[string]string",
            Self::Struct => "struct",
        };
        f.write_str(name)
    }
}

/// Value of a property field that has been set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    String(String),
    List(Vec<String>),
    Map(BTreeMap<String, String>),
    Struct(PropertyStruct),
}

impl PropertyValue {
    #[must_use]
    pub fn kind(&self) -> PropertyKind {
        match self {
            Self::Bool(_) => PropertyKind::Bool,
            Self::Int(_) => PropertyKind::Int,
            Self::String(_) => PropertyKind::String,
            Self::List(_) => PropertyKind::List,
            Self::Map(_) => PropertyKind::Map,
            Self::Struct(_) => PropertyKind::Struct,
        }
    }

    /// Shorthand for a list of strings
    pub fn list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<PropertyStruct> for PropertyValue {
    fn from(value: PropertyStruct) -> Self {
        Self::Struct(value)
    }
}

/// Instance of a property schema. Fields that were never set are absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyStruct {
    schema: SchemaId,
    #[serde(default)]
    fields: BTreeMap<String, PropertyValue>,
}

impl PropertyStruct {
    #[must_use]
    pub fn new(schema: SchemaId) -> Self {
        Self {
            schema,
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style setter
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.set(field, value);
        self
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<PropertyValue>) {
        self.fields.insert(field.into(), value.into());
    }

    #[must_use]
    pub fn schema(&self) -> &SchemaId {
        &self.schema
    }

    /// Whether both structs have the same shape
    #[must_use]
    pub fn type_equal(&self, other: &Self) -> bool {
        self.schema == other.schema
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&PropertyValue> {
        self.fields.get(field)
    }

    #[must_use]
    pub fn get_str(&self, field: &str) -> Option<&str> {
        match self.fields.get(field) {
            Some(PropertyValue::String(s)) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn get_bool(&self, field: &str) -> Option<bool> {
        match self.fields.get(field) {
            Some(PropertyValue::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn get_list(&self, field: &str) -> Option<&[String]> {
        match self.fields.get(field) {
            Some(PropertyValue::List(items)) => Some(items),
            _ => None,
        }
    }

    /// Mutable access to a list field, creating it when unset. Returns
    /// `None` if the field holds a value of another kind.
    pub fn list_mut(&mut self, field: &str) -> Option<&mut Vec<String>> {
        let value = self
            .fields
            .entry(field.to_string())
            .or_insert_with(|| PropertyValue::List(Vec::new()));
        match value {
            PropertyValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Declared field of a schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub kind: PropertyKind,
    /// Schema of a nested struct field
    pub schema: Option<SchemaId>,
}

/// Shape of a property struct, declared once per module type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertySchema {
    pub id: SchemaId,
    pub fields: Vec<FieldSpec>,
}

impl PropertySchema {
    #[must_use]
    pub fn new(id: SchemaId) -> Self {
        Self {
            id,
            fields: Vec::new(),
        }
    }

    #[must_use]
    pub fn field(mut self, name: impl Into<String>, kind: PropertyKind) -> Self {
        self.fields.push(FieldSpec {
            name: name.into(),
            kind,
            schema: None,
        });
        self
    }

    #[must_use]
    pub fn nested(mut self, name: impl Into<String>, schema: SchemaId) -> Self {
        self.fields.push(FieldSpec {
            name: name.into(),
            kind: PropertyKind::Struct,
            schema: Some(schema),
        });
        self
    }

    #[must_use]
    pub fn field_spec(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Empty instance of this schema
    #[must_use]
    pub fn instantiate(&self) -> PropertyStruct {
        PropertyStruct::new(self.id.clone())
    }

    /// Check that every set field of `props` is declared with a matching kind
    ///
    /// # Errors
    ///
    /// Returns `PropertyError::MismatchedTypes` naming the first offending field.
    pub fn validate(&self, props: &PropertyStruct) -> Result<(), PropertyError> {
        if props.schema != self.id {
            return Err(PropertyError::MismatchedTypes {
                property: String::new(),
                expected: self.id.to_string(),
                found: props.schema.to_string(),
            });
        }
        for (name, value) in props.fields() {
            match self.field_spec(name) {
                Some(spec) if spec.kind == value.kind() => {}
                Some(spec) => {
                    return Err(PropertyError::MismatchedTypes {
                        property: name.to_string(),
                        expected: spec.kind.to_string(),
                        found: value.kind().to_string(),
                    })
                }
                None => {
                    return Err(PropertyError::MismatchedTypes {
                        property: name.to_string(),
                        expected: "undeclared field".to_string(),
                        found: value.kind().to_string(),
                    })
                }
            }
        }
        Ok(())
    }
}

/// Extend `dst` with the fields set in `src`, in replace order.
///
/// Every field set in `src` replaces the one in `dst`, lists included.
/// Nested structs are merged field by field, and fields unset in `src` leave
/// `dst` unchanged.
///
/// The merge is checked before anything is written, so on error `dst` is
/// left untouched.
///
/// # Errors
///
/// Returns `PropertyError::MismatchedTypes` carrying the dotted path of the
/// first field whose kinds (or nested schemas) differ between the two sides.
pub fn extend_properties(
    dst: &mut PropertyStruct,
    src: &PropertyStruct,
) -> Result<(), PropertyError> {
    if !dst.type_equal(src) {
        return Err(PropertyError::MismatchedTypes {
            property: String::new(),
            expected: dst.schema.to_string(),
            found: src.schema.to_string(),
        });
    }
    check_extend(dst, src, "")?;
    apply_extend(dst, src);
    Ok(())
}

fn field_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

fn check_extend(dst: &PropertyStruct, src: &PropertyStruct, prefix: &str) -> Result<(), PropertyError> {
    for (name, src_value) in &src.fields {
        let Some(dst_value) = dst.fields.get(name) else {
            continue;
        };
        let path = field_path(prefix, name);
        match (dst_value, src_value) {
            (PropertyValue::Struct(d), PropertyValue::Struct(s)) => {
                if !d.type_equal(s) {
                    return Err(PropertyError::MismatchedTypes {
                        property: path,
                        expected: d.schema.to_string(),
                        found: s.schema.to_string(),
                    });
                }
                check_extend(d, s, &path)?;
            }
            (d, s) if d.kind() != s.kind() => {
                return Err(PropertyError::MismatchedTypes {
                    property: path,
                    expected: d.kind().to_string(),
                    found: s.kind().to_string(),
                });
            }
            _ => {}
        }
    }
    Ok(())
}

fn apply_extend(dst: &mut PropertyStruct, src: &PropertyStruct) {
    for (name, src_value) in &src.fields {
        match (dst.fields.get_mut(name), src_value) {
            (Some(PropertyValue::Struct(d)), PropertyValue::Struct(s)) => apply_extend(d, s),
            (Some(d), s) => *d = s.clone(),
            (None, s) => {
                dst.fields.insert(name.clone(), s.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const APP: SchemaId = SchemaId::new("app_properties");
    const DEX: SchemaId = SchemaId::new("dex_properties");

    #[test]
    fn test_replace_set_fields_only() {
        let mut dst = PropertyStruct::new(APP)
            .with("package_name", "com.android.bar")
            .with("certificate", "platform")
            .with("overrides", PropertyValue::list(["old"]));
        let src = PropertyStruct::new(APP).with("package_name", "com.android.foo");

        extend_properties(&mut dst, &src).unwrap();

        assert_eq!(dst.get_str("package_name"), Some("com.android.foo"));
        assert_eq!(dst.get_str("certificate"), Some("platform"));
        assert_eq!(dst.get_list("overrides"), Some(&["old".to_string()][..]));
    }

    #[test]
    fn test_replace_list_is_not_appended() {
        let mut dst = PropertyStruct::new(APP).with("srcs", PropertyValue::list(["a.java"]));
        let src = PropertyStruct::new(APP).with("srcs", PropertyValue::list(["b.java"]));

        extend_properties(&mut dst, &src).unwrap();
        assert_eq!(dst.get_list("srcs"), Some(&["b.java".to_string()][..]));
    }

    #[test]
    fn test_nested_struct_merge() {
        let mut dst = PropertyStruct::new(APP).with(
            "dex_preopt",
            PropertyStruct::new(DEX)
                .with("enabled", true)
                .with("profile", "bar.prof"),
        );
        let src = PropertyStruct::new(APP)
            .with("dex_preopt", PropertyStruct::new(DEX).with("enabled", false));

        extend_properties(&mut dst, &src).unwrap();
        let Some(PropertyValue::Struct(dex)) = dst.get("dex_preopt") else {
            panic!("dex_preopt should stay a struct");
        };
        assert_eq!(dex.get_bool("enabled"), Some(false));
        assert_eq!(dex.get_str("profile"), Some("bar.prof"));
    }

    #[test]
    fn test_mismatch_reports_path_and_leaves_dst() {
        let original = PropertyStruct::new(APP)
            .with("name_suffix", "x")
            .with("dex_preopt", PropertyStruct::new(DEX).with("enabled", true));
        let mut dst = original.clone();
        let src = PropertyStruct::new(APP)
            .with("name_suffix", "y")
            .with("dex_preopt", PropertyStruct::new(DEX).with("enabled", "yes"));

        let err = extend_properties(&mut dst, &src).unwrap_err();
        assert_eq!(err.property(), "dex_preopt.enabled");
        assert_eq!(err.to_string(), "mismatched types bool and string");
        assert_eq!(dst, original);
    }

    #[test]
    fn test_schema_validation() {
        let schema = PropertySchema::new(APP)
            .field("package_name", PropertyKind::String)
            .nested("dex_preopt", DEX);

        assert!(schema
            .validate(&schema.instantiate().with("package_name", "x"))
            .is_ok());
        let err = schema
            .validate(&schema.instantiate().with("package_name", true))
            .unwrap_err();
        assert_eq!(err.property(), "package_name");
        assert!(schema
            .validate(&schema.instantiate().with("unknown", "x"))
            .is_err());
    }
}
