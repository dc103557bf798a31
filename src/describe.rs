//! Closure driver.
//!
//! Starting from the root shapes, describe each type, collect every class its
//! members reference, and keep describing until a round discovers nothing
//! new. Each identity is described at most once; the visited set only grows
//! and the reachable universe is finite, so cyclic graphs terminate.
//!
//! Output order: roots in the order given, then each expansion round in
//! discovery order.
mod constraint;
mod property;

use std::collections::HashSet;

use indexmap::{IndexMap, IndexSet};
use tracing::{debug, trace};

use crate::descriptor::{ConstraintDescriptor, TypeDescriptor};
use crate::error::DescribeError;
use crate::model::{PRIMITIVE_NAMES, TypeId, TypeKind, TypeRef};
use crate::options::DescribeOptions;
use crate::provider::{MetadataProvider, PropertyMetadata, TypeIntrospector};
use crate::type_name::{TypeNameDescriptor, TypeNameResolver};

/// Name of the synthetic constraint carried by enumerations.
pub const ENUM_CONSTRAINT: &str = "Enum";

// ------------------------------- Front API -------------------------------- //

pub fn describe<S>(
    source: &S,
    roots: &[TypeRef],
    options: &DescribeOptions,
) -> Result<Vec<TypeDescriptor>, DescribeError>
where
    S: TypeIntrospector + MetadataProvider + ?Sized,
{
    Describer::new(source, options).run(roots)
}

pub fn describe_one<S>(
    source: &S,
    root: impl Into<TypeRef>,
    options: &DescribeOptions,
) -> Result<Vec<TypeDescriptor>, DescribeError>
where
    S: TypeIntrospector + MetadataProvider + ?Sized,
{
    describe(source, &[root.into()], options)
}

/// Serialize a described graph.
pub fn to_json(descriptors: &[TypeDescriptor], pretty: bool) -> serde_json::Result<String> {
    if pretty {
        serde_json::to_string_pretty(descriptors)
    } else {
        serde_json::to_string(descriptors)
    }
}

// -------------------------------- State ----------------------------------- //

/// One run's bookkeeping. Not reused across runs.
pub(crate) struct Describer<'s, S: ?Sized> {
    source: &'s S,
    options: &'s DescribeOptions,
    resolver: TypeNameResolver<'s>,
    /// Canonical identities already emitted or deliberately skipped.
    visited: HashSet<String>,
    /// Classes discovered during the current round; the next round's input.
    pending: IndexSet<TypeId>,
    out: Vec<TypeDescriptor>,
}

impl<'s, S> Describer<'s, S>
where
    S: TypeIntrospector + MetadataProvider + ?Sized,
{
    fn new(source: &'s S, options: &'s DescribeOptions) -> Self {
        Self {
            source,
            options,
            resolver: TypeNameResolver::new(options),
            visited: PRIMITIVE_NAMES.iter().map(|p| (*p).to_owned()).collect(),
            pending: IndexSet::new(),
            out: Vec::new(),
        }
    }

    fn run(mut self, roots: &[TypeRef]) -> Result<Vec<TypeDescriptor>, DescribeError> {
        let mut unique_roots = Vec::with_capacity(roots.len());
        let mut root_keys = HashSet::new();
        for root in roots {
            let key = root.to_string();
            if root_keys.insert(key.clone()) {
                self.visited.insert(key);
                // the root already carries the raw type's members
                if let TypeRef::Parameterized { raw, .. } = root {
                    self.visited.insert(raw.to_string());
                }
                unique_roots.push(root);
            } else {
                trace!(root = %root, "duplicate root");
            }
        }
        for root in unique_roots {
            let descriptor = self.describe_root(root)?;
            self.out.push(descriptor);
        }

        let mut round = 0usize;
        while !self.pending.is_empty() {
            round += 1;
            let batch = std::mem::take(&mut self.pending);
            debug!(round, candidates = batch.len(), "expanding closure");
            for id in batch {
                if self.visited.contains(id.as_str()) {
                    continue;
                }
                self.visited.insert(id.to_string());
                if self.options.is_opaque(&id) {
                    trace!(ty = %id, "opaque namespace");
                    continue;
                }
                let kind = self.source.kind(&id)?;
                if kind == TypeKind::Primitive {
                    continue;
                }
                let descriptor = self.describe_class(&id, kind)?;
                self.out.push(descriptor);
            }
        }
        debug!(rounds = round, types = self.out.len(), "closure complete");
        Ok(self.out)
    }

    fn describe_root(&mut self, root: &TypeRef) -> Result<TypeDescriptor, DescribeError> {
        match root {
            TypeRef::Class(id) => {
                let kind = self.source.kind(id)?;
                self.describe_class(id, kind)
            }
            TypeRef::Parameterized { raw, .. } => {
                let kind = self.source.kind(raw)?;
                let mut descriptor = self.describe_class(raw, kind)?;
                descriptor.type_name = self.resolver.resolve(root, "root", &mut self.pending)?;
                Ok(descriptor)
            }
            // arrays carry no members of their own; only the element is of interest
            _ => {
                let type_name = self.resolver.resolve(root, "root", &mut self.pending)?;
                Ok(TypeDescriptor::new(type_name))
            }
        }
    }

    fn describe_class(&mut self, id: &TypeId, kind: TypeKind) -> Result<TypeDescriptor, DescribeError> {
        debug!(ty = %id, ?kind, "describing");
        let mut descriptor = TypeDescriptor::new(self.resolver.name_of(id));
        match kind {
            TypeKind::Enum => {
                descriptor.is_basic_type = true;
                descriptor.constraints.push(enum_constraint(self.source.enum_constants(id)?));
                return Ok(descriptor);
            }
            TypeKind::Primitive => {
                descriptor.is_basic_type = true;
                return Ok(descriptor);
            }
            TypeKind::Class => {}
        }

        let meta = self.source.bean_metadata(id)?;
        descriptor.constraints = meta.constraints.iter().map(|c| self.process_constraint(c)).collect();

        let mut constrained: IndexMap<&str, &PropertyMetadata> =
            meta.properties.iter().map(|p| (p.name.as_str(), p)).collect();
        for field in self.source.fields(id)? {
            let property = constrained.shift_remove(field.name.as_str());
            let described = self.process_property(id, &field, property)?;
            descriptor.properties.insert(field.name, described);
        }
        if let Some((member, _)) = constrained.into_iter().next() {
            return Err(DescribeError::MissingMember { owner: id.clone(), member: member.to_owned() });
        }
        Ok(descriptor)
    }
}

fn enum_constraint(constants: Vec<String>) -> ConstraintDescriptor {
    let mut constraint = ConstraintDescriptor::new(TypeNameDescriptor::scalar(ENUM_CONSTRAINT));
    let values = constants.into_iter().map(serde_json::Value::String).collect();
    constraint.attributes.insert("values".to_owned(), serde_json::Value::Array(values));
    constraint
}

// ------------------------------- Tests ------------------------------------ //
