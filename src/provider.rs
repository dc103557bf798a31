//! The two collaborators the describer reads from. Implementations must be
//! pure with respect to one run: the same identity always yields the same
//! answer.
use indexmap::IndexMap;

use crate::error::DescribeError;
use crate::model::{AttributeValue, FieldInfo, TypeId, TypeKind};

/// Structural view of the type universe.
pub trait TypeIntrospector {
    fn kind(&self, ty: &TypeId) -> Result<TypeKind, DescribeError>;

    /// Member names of an enumeration, in declaration order.
    fn enum_constants(&self, ty: &TypeId) -> Result<Vec<String>, DescribeError>;

    /// Declared members including inherited ones. A subclass member shadows a
    /// superclass member of the same name; own members come first.
    fn fields(&self, ty: &TypeId) -> Result<Vec<FieldInfo>, DescribeError>;

    /// Statically declared default of an annotation attribute. `Ok(None)`
    /// means the attribute has no default.
    fn attribute_default(
        &self,
        annotation: &TypeId,
        attribute: &str,
    ) -> Result<Option<AttributeValue>, DescribeError>;
}

/// Validation metadata of a type.
pub trait MetadataProvider {
    fn bean_metadata(&self, ty: &TypeId) -> Result<BeanMetadata, DescribeError>;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BeanMetadata {
    /// Class-level rules.
    pub constraints: Vec<ConstraintMetadata>,
    /// Members the validation runtime knows about.
    pub properties: Vec<PropertyMetadata>,
}

/// One applied rule. `attributes` is the full attribute map of the
/// annotation instance, defaults included.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintMetadata {
    pub annotation: TypeId,
    pub attributes: IndexMap<String, AttributeValue>,
    pub composing: Vec<ConstraintMetadata>,
    pub report_as_single: bool,
    pub validator_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyMetadata {
    pub name: String,
    pub constraints: Vec<ConstraintMetadata>,
    pub cascaded: bool,
    pub group_conversions: Vec<GroupConversion>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupConversion {
    pub from: TypeId,
    pub to: TypeId,
}
