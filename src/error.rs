use thiserror::Error;

use crate::model::TypeId;

/// Fatal failures of a describe run. There is no partial output.
#[derive(Error, Debug)]
pub enum DescribeError {
    #[error("unknown type `{0}`")]
    UnknownType(TypeId),

    #[error("unknown constraint annotation `{0}`")]
    UnknownConstraint(TypeId),

    #[error("unsupported type shape `{shape}` in {context}")]
    UnsupportedTypeShape { context: String, shape: String },

    #[error("`{owner}` has validation metadata for `{member}` but declares no such member")]
    MissingMember { owner: TypeId, member: String },

    #[error("`{annotation}` requires attribute `{attribute}` but it has no default and no value")]
    MissingAttribute { annotation: TypeId, attribute: String },

    #[error("constraint `{0}` is composed of itself")]
    CyclicComposition(TypeId),

    #[error("superclass chain of `{0}` is cyclic")]
    CyclicSuperclass(TypeId),

    #[error("`{0}` is not an enumeration")]
    NotAnEnum(TypeId),
}

/// Failures while loading or merging catalog documents.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("at JSON path {path} → {message}")]
    Parse { path: String, message: String },

    #[error("invalid {what} name `{name}`")]
    InvalidName { what: &'static str, name: String },

    #[error("duplicate {what} `{name}`")]
    Duplicate { what: &'static str, name: TypeId },

    #[error("`{owner}` uses type variable `{var}` it does not declare")]
    UnknownTypeVariable { owner: TypeId, var: String },
}
