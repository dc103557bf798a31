//! Describe the validation-constraint metadata of a type graph as plain,
//! serializable descriptors.
//!
//! Hand [`describe()`] a source implementing [`TypeIntrospector`] and
//! [`MetadataProvider`] (a [`Catalog`] does both) plus the root types. It
//! walks every type reachable through member types and generic arguments,
//! describes each exactly once, and returns the descriptors ready for
//! [`to_json`].
pub mod builtin;
pub mod catalog;
pub mod cli;
pub mod describe;
pub mod descriptor;
pub mod error;
pub mod index;
pub mod jq_exec;
pub mod model;
pub mod options;
pub mod path_de;
pub mod provider;
pub mod type_name;

pub use catalog::Catalog;
pub use describe::{describe, describe_one, to_json};
pub use descriptor::{ConstraintDescriptor, PropertyDescriptor, TypeDescriptor};
pub use error::{CatalogError, DescribeError};
pub use index::DescriptorIndex;
pub use model::{AttributeValue, TypeId, TypeKind, TypeRef};
pub use options::DescribeOptions;
pub use provider::{MetadataProvider, TypeIntrospector};
pub use type_name::TypeNameDescriptor;
