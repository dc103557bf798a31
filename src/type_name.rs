//! Canonical type naming.
//!
//! A [`TypeNameDescriptor`] is what consumers see instead of a qualified
//! type: a bare simple name, `["Array", element]`, or `[base, args...]`.
//! The [`TypeNameResolver`] produces them and, for member and root shapes,
//! records every referenced class in the caller's discovery set. It never
//! looks inside the referenced types itself.
use std::fmt;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize, Serializer, ser::SerializeSeq};

use crate::error::DescribeError;
use crate::model::{TypeId, TypeRef};
use crate::options::DescribeOptions;

pub const ARRAY_MARKER: &str = "Array";

// -------------------------------- Names ----------------------------------- //

#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "RawTypeName")]
pub enum TypeNameDescriptor {
    Scalar(String),
    Array(Box<TypeNameDescriptor>),
    Parameterized {
        base: Box<TypeNameDescriptor>,
        args: Vec<TypeNameDescriptor>,
    },
}

impl TypeNameDescriptor {
    pub fn scalar(name: impl Into<String>) -> Self { Self::Scalar(name.into()) }

    pub fn array(element: TypeNameDescriptor) -> Self { Self::Array(Box::new(element)) }

    pub fn parameterized(base: TypeNameDescriptor, args: Vec<TypeNameDescriptor>) -> Self {
        Self::Parameterized { base: Box::new(base), args }
    }

    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value;
        match self {
            Self::Scalar(name) => Value::String(name.clone()),
            Self::Array(element) => Value::Array(vec![Value::from(ARRAY_MARKER), element.to_json()]),
            Self::Parameterized { base, args } => {
                let mut out = Vec::with_capacity(args.len() + 1);
                out.push(base.to_json());
                out.extend(args.iter().map(Self::to_json));
                Value::Array(out)
            }
        }
    }
}

/// Comma-joined flattening (`List,Array,Item`); the lookup key used by
/// [`crate::index::DescriptorIndex`].
impl fmt::Display for TypeNameDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(name) => f.write_str(name),
            Self::Array(element) => write!(f, "{ARRAY_MARKER},{element}"),
            Self::Parameterized { base, args } => {
                write!(f, "{base}")?;
                for arg in args { write!(f, ",{arg}")?; }
                Ok(())
            }
        }
    }
}

impl Serialize for TypeNameDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Scalar(name) => serializer.serialize_str(name),
            Self::Array(element) => {
                let mut seq = serializer.serialize_seq(Some(2))?;
                seq.serialize_element(ARRAY_MARKER)?;
                seq.serialize_element(element)?;
                seq.end()
            }
            Self::Parameterized { base, args } => {
                let mut seq = serializer.serialize_seq(Some(args.len() + 1))?;
                seq.serialize_element(base)?;
                for arg in args { seq.serialize_element(arg)?; }
                seq.end()
            }
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTypeName {
    Name(String),
    Seq(Vec<TypeNameDescriptor>),
}

impl TryFrom<RawTypeName> for TypeNameDescriptor {
    type Error = String;

    fn try_from(raw: RawTypeName) -> Result<Self, Self::Error> {
        let mut parts = match raw {
            RawTypeName::Name(name) => return Ok(Self::Scalar(name)),
            RawTypeName::Seq(parts) => parts,
        };
        if parts.is_empty() {
            return Err("type name sequence must not be empty".to_owned());
        }
        let base = parts.remove(0);
        if parts.len() == 1 && matches!(&base, Self::Scalar(s) if s == ARRAY_MARKER) {
            return Ok(Self::Array(Box::new(parts.remove(0))));
        }
        Ok(Self::Parameterized { base: Box::new(base), args: parts })
    }
}

// ------------------------------- Resolver --------------------------------- //

#[derive(Debug, Clone, Copy)]
pub struct TypeNameResolver<'o> {
    options: &'o DescribeOptions,
}

impl<'o> TypeNameResolver<'o> {
    pub fn new(options: &'o DescribeOptions) -> Self { Self { options } }

    /// Name of a bare class, without registering it. Used for annotation
    /// types and class-valued attributes, which are never described.
    pub fn name_of(&self, id: &TypeId) -> TypeNameDescriptor {
        match self.options.rename_for(id) {
            Some(rename) => TypeNameDescriptor::Scalar(format!("{}{}", rename.name_prefix, id.simple_name())),
            None => TypeNameDescriptor::Scalar(id.simple_name().to_owned()),
        }
    }

    /// Name of a declared shape. Every class it references lands in
    /// `discovered`; for arrays that is the innermost element type.
    pub fn resolve(
        &self,
        ty: &TypeRef,
        context: &str,
        discovered: &mut IndexSet<TypeId>,
    ) -> Result<TypeNameDescriptor, DescribeError> {
        match ty {
            TypeRef::Class(id) => {
                discovered.insert(id.clone());
                Ok(self.name_of(id))
            }
            TypeRef::Array { array } => {
                let element = self.resolve(array, context, discovered)?;
                Ok(TypeNameDescriptor::array(element))
            }
            TypeRef::Parameterized { raw, args } => {
                discovered.insert(raw.clone());
                let mut resolved = Vec::with_capacity(args.len());
                for arg in args {
                    // unbound type variables carry no information
                    if matches!(arg, TypeRef::Var { .. }) { continue; }
                    resolved.push(self.resolve(arg, context, discovered)?);
                }
                Ok(TypeNameDescriptor::parameterized(self.name_of(raw), resolved))
            }
            TypeRef::Var { .. } | TypeRef::Wildcard { .. } => Err(DescribeError::UnsupportedTypeShape {
                context: context.to_owned(),
                shape: ty.to_string(),
            }),
        }
    }
}
