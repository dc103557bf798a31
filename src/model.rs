//! Input vocabulary: type identities, declared type shapes and annotation
//! attribute values as a metadata source hands them to the describer.
//! No output concerns live here.

use std::fmt;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

// ------------------------------- Identity --------------------------------- //

/// Canonical type identity: a fully qualified dotted name (`com.acme.Person`,
/// `java.util.List`, `int`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeId(String);

impl TypeId {
    pub fn new(name: impl Into<String>) -> Self { Self(name.into()) }

    pub fn as_str(&self) -> &str { &self.0 }

    /// Everything before the last `.`, empty for unqualified names.
    pub fn namespace(&self) -> &str {
        match self.0.rfind('.') {
            Some(ix) => &self.0[..ix],
            None => "",
        }
    }

    /// Last segment of the name. Nested classes (`o.Order$Line`) yield the
    /// member name.
    pub fn simple_name(&self) -> &str {
        match self.0.rfind(['.', '$']) {
            Some(ix) => &self.0[ix + 1..],
            None => &self.0,
        }
    }

    pub fn starts_with_namespace(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl From<&str> for TypeId {
    fn from(value: &str) -> Self { Self::new(value) }
}

impl From<String> for TypeId {
    fn from(value: String) -> Self { Self(value) }
}

// ------------------------------- Shapes ----------------------------------- //

/// Declared type shape of a member (or of a root handed to the describer).
///
/// JSON forms, in the order they are tried:
/// - `"com.acme.Address"`
/// - `{"array": <shape>}`
/// - `{"raw": "java.util.Map", "args": [<shape>, ...]}`
/// - `{"var": "T"}`
/// - `{"wildcard": true}`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeRef {
    Class(TypeId),
    Array { array: Box<TypeRef> },
    Parameterized {
        raw: TypeId,
        #[serde(default)]
        args: Vec<TypeRef>,
    },
    Var { var: String },
    Wildcard {
        #[serde(deserialize_with = "wildcard_marker")]
        wildcard: bool,
    },
}

/// Only `{"wildcard": true}` names a wildcard.
fn wildcard_marker<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match bool::deserialize(deserializer)? {
        true => Ok(true),
        false => Err(serde::de::Error::custom("`wildcard` must be true")),
    }
}

impl TypeRef {
    pub fn class(name: impl Into<TypeId>) -> Self { Self::Class(name.into()) }

    pub fn array_of(component: TypeRef) -> Self { Self::Array { array: Box::new(component) } }

    pub fn parameterized(raw: impl Into<TypeId>, args: Vec<TypeRef>) -> Self {
        Self::Parameterized { raw: raw.into(), args }
    }

    pub fn var(name: impl Into<String>) -> Self { Self::Var { var: name.into() } }

    /// Innermost non-array component (`int[][]` → `int`).
    pub fn element(&self) -> &TypeRef {
        match self {
            Self::Array { array } => array.element(),
            other => other,
        }
    }
}

impl From<TypeId> for TypeRef {
    fn from(value: TypeId) -> Self { Self::Class(value) }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Class(id) => write!(f, "{id}"),
            Self::Array { array } => write!(f, "{array}[]"),
            Self::Parameterized { raw, args } => {
                write!(f, "{raw}<")?;
                for (ix, arg) in args.iter().enumerate() {
                    if ix > 0 { f.write_str(", ")?; }
                    write!(f, "{arg}")?;
                }
                f.write_str(">")
            }
            Self::Var { var } => f.write_str(var),
            Self::Wildcard { .. } => f.write_str("?"),
        }
    }
}

// ------------------------------ Attributes -------------------------------- //

/// One annotation attribute value. Equality is structural, lists compare
/// element by element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Int(i64),
    Float(OrderedFloat<f64>),
    Str(String),
    List(Vec<AttributeValue>),
    Class { class: TypeId },
}

impl AttributeValue {
    pub fn class(name: impl Into<TypeId>) -> Self { Self::Class { class: name.into() } }

    pub fn as_class(&self) -> Option<&TypeId> {
        match self {
            Self::Class { class } => Some(class),
            _ => None,
        }
    }

    /// Literal JSON rendering. Class references render as their qualified name.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;
        match self {
            Self::Bool(b) => Value::Bool(*b),
            Self::Int(i) => Value::from(*i),
            Self::Float(x) => serde_json::Number::from_f64(x.0)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Self::Str(s) => Value::String(s.clone()),
            Self::List(xs) => Value::Array(xs.iter().map(Self::to_json).collect()),
            Self::Class { class } => Value::String(class.to_string()),
        }
    }
}

// -------------------------------- Kinds ----------------------------------- //

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    #[default]
    Class,
    Enum,
    Primitive,
}

/// Primitive type names; never described.
pub const PRIMITIVE_NAMES: &[&str] = &[
    "boolean", "byte", "char", "double", "float", "int", "long", "short",
];

pub fn is_primitive(id: &TypeId) -> bool {
    PRIMITIVE_NAMES.contains(&id.as_str())
}

/// A declared member as the introspection surface reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInfo {
    pub name: String,
    pub ty: TypeRef,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn type_id_splits_namespace_and_simple_name() {
        let id = TypeId::from("java.sql.Date");
        assert_eq!(id.namespace(), "java.sql");
        assert_eq!(id.simple_name(), "Date");
        let prim = TypeId::from("int");
        assert_eq!(prim.namespace(), "");
        assert_eq!(prim.simple_name(), "int");
    }

    #[test]
    fn nested_class_simple_name_is_the_member_name() {
        let nested = TypeId::from("o.Order$Line");
        assert_eq!(nested.simple_name(), "Line");
        assert_eq!(nested.namespace(), "o");
        assert_eq!(TypeId::from("o.Outer$Mid$Leaf").simple_name(), "Leaf");
        assert_eq!(TypeId::from("Top$Inner").simple_name(), "Inner");
    }

    #[test]
    fn wildcard_flag_must_be_true() {
        assert!(serde_json::from_value::<TypeRef>(json!({"wildcard": false})).is_err());
        assert!(serde_json::from_value::<TypeRef>(json!({"wildcard": true})).is_ok());
    }

    #[test]
    fn type_ref_json_forms() {
        let v = json!({"raw": "java.util.Map", "args": ["java.lang.String", {"array": "com.acme.Item"}, {"var": "T"}]});
        let ty: TypeRef = serde_json::from_value(v).unwrap();
        assert_eq!(ty, TypeRef::parameterized("java.util.Map", vec![
            TypeRef::class("java.lang.String"),
            TypeRef::array_of(TypeRef::class("com.acme.Item")),
            TypeRef::var("T"),
        ]));
        assert_eq!(ty.to_string(), "java.util.Map<java.lang.String, com.acme.Item[], T>");

        let w: TypeRef = serde_json::from_value(json!({"wildcard": true})).unwrap();
        assert!(matches!(w, TypeRef::Wildcard { .. }));
    }

    #[test]
    fn element_unwraps_nested_arrays() {
        let ty = TypeRef::array_of(TypeRef::array_of(TypeRef::class("int")));
        assert_eq!(ty.element(), &TypeRef::class("int"));
    }

    #[test]
    fn attribute_values_parse_and_compare_by_value() {
        let a: AttributeValue = serde_json::from_value(json!([1, "x", {"class": "a.B"}, 2.5, true])).unwrap();
        let b = AttributeValue::List(vec![
            AttributeValue::Int(1),
            AttributeValue::Str("x".into()),
            AttributeValue::class("a.B"),
            AttributeValue::Float(OrderedFloat(2.5)),
            AttributeValue::Bool(true),
        ]);
        assert_eq!(a, b);
        assert_eq!(a.to_json(), json!([1, "x", "a.B", 2.5, true]));
    }
}
