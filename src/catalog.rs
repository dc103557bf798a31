//! Registered-schema source: types and constraint annotations declared in
//! JSON catalog documents, served through [`TypeIntrospector`] and
//! [`MetadataProvider`].
//!
//! ```json
//! {
//!   "types": [
//!     { "name": "com.acme.Person",
//!       "fields": [
//!         { "name": "name", "type": "java.lang.String",
//!           "constraints": [{ "annotation": "javax.validation.constraints.NotNull" }] },
//!         { "name": "address", "type": "com.acme.Address", "cascade": true }
//!       ] },
//!     { "name": "com.acme.Color", "kind": "enum", "constants": ["RED", "GREEN"] }
//!   ],
//!   "constraints": [
//!     { "name": "com.acme.ZipCode", "reportAsSingle": true,
//!       "attributes": { "message": "bad zip", "groups": [] },
//!       "composedOf": [{ "annotation": "javax.validation.constraints.Pattern",
//!                        "attributes": { "regexp": "[0-9]{5}" } }] }
//!   ]
//! }
//! ```
use std::collections::HashSet;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::error::{CatalogError, DescribeError};
use crate::model::{is_primitive, AttributeValue, FieldInfo, TypeId, TypeKind, TypeRef};
use crate::options::DescribeOptions;
use crate::provider::{
    BeanMetadata, ConstraintMetadata, GroupConversion, MetadataProvider, PropertyMetadata,
    TypeIntrospector,
};

static QUALIFIED_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*(\.[A-Za-z_$][A-Za-z0-9_$]*)*$").expect("valid regex")
});

/// Implicit root of every class hierarchy; ends a superclass walk.
const ROOT_CLASS: &str = "java.lang.Object";

/// Attributes a composing constraint takes over from the constraint it
/// composes.
const INHERITED_ATTRIBUTES: &[&str] = &["groups", "payload"];

// ------------------------------ Documents --------------------------------- //

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CatalogDocument {
    #[serde(default)]
    pub types: Vec<TypeDef>,
    #[serde(default)]
    pub constraints: Vec<ConstraintDef>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TypeDef {
    pub name: TypeId,
    #[serde(default)]
    pub kind: TypeKind,
    #[serde(default)]
    pub superclass: Option<TypeId>,
    #[serde(default)]
    pub type_params: Vec<String>,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
    #[serde(default)]
    pub constraints: Vec<ConstraintUse>,
    /// Enumeration members, declaration order.
    #[serde(default)]
    pub constants: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FieldDef {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(default)]
    pub constraints: Vec<ConstraintUse>,
    #[serde(default)]
    pub cascade: bool,
    #[serde(default)]
    pub group_conversions: Vec<GroupConversionDef>,
}

impl FieldDef {
    fn is_constrained(&self) -> bool {
        !self.constraints.is_empty() || self.cascade || !self.group_conversions.is_empty()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupConversionDef {
    pub from: TypeId,
    pub to: TypeId,
}

/// An annotation applied to a type or field, with the explicitly given
/// attribute values.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConstraintUse {
    pub annotation: TypeId,
    #[serde(default)]
    pub attributes: IndexMap<String, AttributeValue>,
}

impl ConstraintUse {
    pub fn new(annotation: impl Into<TypeId>) -> Self {
        Self { annotation: annotation.into(), attributes: IndexMap::new() }
    }

    pub fn with(mut self, attribute: &str, value: AttributeValue) -> Self {
        self.attributes.insert(attribute.to_owned(), value);
        self
    }
}

/// A constraint annotation declaration. A `null` attribute default means the
/// attribute is required at every use.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConstraintDef {
    pub name: TypeId,
    #[serde(default)]
    pub attributes: IndexMap<String, Option<AttributeValue>>,
    #[serde(default)]
    pub composed_of: Vec<ConstraintUse>,
    #[serde(default)]
    pub report_as_single: bool,
    /// Registered validator implementations; empty for pure composites.
    #[serde(default)]
    pub validators: Vec<String>,
}

// ------------------------------- Catalog ---------------------------------- //

#[derive(Debug, Clone)]
pub struct Catalog {
    types: IndexMap<TypeId, TypeDef>,
    constraints: IndexMap<TypeId, ConstraintDef>,
    /// Undeclared superclasses under these prefixes end a superclass walk.
    library_namespaces: Vec<String>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            types: IndexMap::new(),
            constraints: IndexMap::new(),
            library_namespaces: DescribeOptions::default().opaque_namespaces,
        }
    }
}

impl Catalog {
    pub fn new() -> Self { Self::default() }

    pub fn set_library_namespaces(&mut self, prefixes: impl IntoIterator<Item = String>) {
        self.library_namespaces = prefixes.into_iter().collect();
    }

    /// A catalog preloaded with the standard `javax.validation.constraints`
    /// annotations.
    pub fn with_builtin_constraints() -> Self {
        let mut catalog = Self::new();
        for def in crate::builtin::standard_constraints() {
            catalog.constraints.insert(def.name.clone(), def);
        }
        catalog
    }

    pub fn from_json_str(src: &str) -> Result<Self, CatalogError> {
        let mut catalog = Self::new();
        catalog.merge(crate::path_de::from_str_with_path(src)?)?;
        Ok(catalog)
    }

    pub fn merge_value(&mut self, value: serde_json::Value) -> Result<(), CatalogError> {
        self.merge(crate::path_de::from_value_with_path(value)?)
    }

    /// Add a document. Either every definition is added or none is.
    pub fn merge(&mut self, doc: CatalogDocument) -> Result<(), CatalogError> {
        let mut seen_types = HashSet::new();
        for def in &doc.types {
            check_name("type", def.name.as_str())?;
            if self.types.contains_key(&def.name) || !seen_types.insert(&def.name) {
                return Err(CatalogError::Duplicate { what: "type", name: def.name.clone() });
            }
            for field in &def.fields {
                check_type_vars(def, &field.ty)?;
            }
        }
        let mut seen_constraints = HashSet::new();
        for def in &doc.constraints {
            check_name("constraint", def.name.as_str())?;
            if self.constraints.contains_key(&def.name) || !seen_constraints.insert(&def.name) {
                return Err(CatalogError::Duplicate { what: "constraint", name: def.name.clone() });
            }
        }
        tracing::debug!(types = doc.types.len(), constraints = doc.constraints.len(), "merging catalog document");
        self.types.extend(doc.types.into_iter().map(|def| (def.name.clone(), def)));
        self.constraints.extend(doc.constraints.into_iter().map(|def| (def.name.clone(), def)));
        Ok(())
    }

    pub fn type_def(&self, id: &TypeId) -> Option<&TypeDef> { self.types.get(id) }

    pub fn constraint_def(&self, id: &TypeId) -> Option<&ConstraintDef> { self.constraints.get(id) }

    pub fn type_names(&self) -> impl Iterator<Item = &TypeId> { self.types.keys() }

    /// `ty` followed by its superclasses, nearest first.
    fn lineage(&self, ty: &TypeId) -> Result<Vec<&TypeDef>, DescribeError> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        let mut current = Some(ty);
        while let Some(id) = current {
            if !out.is_empty() && id.as_str() == ROOT_CLASS {
                break;
            }
            if !seen.insert(id) {
                return Err(DescribeError::CyclicSuperclass(ty.clone()));
            }
            let Some(def) = self.types.get(id) else {
                if !out.is_empty() && self.is_library(id) {
                    break;
                }
                return Err(DescribeError::UnknownType(id.clone()));
            };
            out.push(def);
            current = def.superclass.as_ref();
        }
        Ok(out)
    }

    fn is_library(&self, id: &TypeId) -> bool {
        self.library_namespaces.iter().any(|prefix| id.starts_with_namespace(prefix))
    }

    fn expand(&self, usage: &ConstraintUse, stack: &mut Vec<TypeId>) -> Result<ConstraintMetadata, DescribeError> {
        let def = self
            .constraints
            .get(&usage.annotation)
            .ok_or_else(|| DescribeError::UnknownConstraint(usage.annotation.clone()))?;
        if stack.contains(&def.name) {
            return Err(DescribeError::CyclicComposition(def.name.clone()));
        }

        let mut attributes = IndexMap::with_capacity(def.attributes.len());
        for (name, default) in &def.attributes {
            let value = usage.attributes.get(name).or(default.as_ref()).ok_or_else(|| {
                DescribeError::MissingAttribute { annotation: def.name.clone(), attribute: name.clone() }
            })?;
            attributes.insert(name.clone(), value.clone());
        }
        for (name, value) in &usage.attributes {
            if !def.attributes.contains_key(name) {
                attributes.insert(name.clone(), value.clone());
            }
        }

        stack.push(def.name.clone());
        let mut composing = Vec::with_capacity(def.composed_of.len());
        for inner in &def.composed_of {
            let mut meta = self.expand(inner, stack)?;
            for key in INHERITED_ATTRIBUTES {
                if let Some(value) = attributes.get(*key) {
                    meta.attributes.insert((*key).to_owned(), value.clone());
                }
            }
            composing.push(meta);
        }
        stack.pop();

        Ok(ConstraintMetadata {
            annotation: def.name.clone(),
            attributes,
            composing,
            report_as_single: def.report_as_single,
            validator_count: def.validators.len(),
        })
    }

    fn expand_all(&self, uses: &[ConstraintUse]) -> Result<Vec<ConstraintMetadata>, DescribeError> {
        uses.iter().map(|u| self.expand(u, &mut Vec::new())).collect()
    }
}

fn check_name(what: &'static str, name: &str) -> Result<(), CatalogError> {
    if QUALIFIED_NAME.is_match(name) {
        Ok(())
    } else {
        Err(CatalogError::InvalidName { what, name: name.to_owned() })
    }
}

fn check_type_vars(owner: &TypeDef, ty: &TypeRef) -> Result<(), CatalogError> {
    match ty {
        TypeRef::Var { var } if !owner.type_params.contains(var) => Err(CatalogError::UnknownTypeVariable {
            owner: owner.name.clone(),
            var: var.clone(),
        }),
        TypeRef::Array { array } => check_type_vars(owner, array),
        TypeRef::Parameterized { args, .. } => args.iter().try_for_each(|arg| check_type_vars(owner, arg)),
        _ => Ok(()),
    }
}

// ------------------------------ Providers --------------------------------- //

impl TypeIntrospector for Catalog {
    fn kind(&self, ty: &TypeId) -> Result<TypeKind, DescribeError> {
        if is_primitive(ty) {
            return Ok(TypeKind::Primitive);
        }
        self.types
            .get(ty)
            .map(|def| def.kind)
            .ok_or_else(|| DescribeError::UnknownType(ty.clone()))
    }

    fn enum_constants(&self, ty: &TypeId) -> Result<Vec<String>, DescribeError> {
        let def = self.types.get(ty).ok_or_else(|| DescribeError::UnknownType(ty.clone()))?;
        match def.kind {
            TypeKind::Enum => Ok(def.constants.clone()),
            _ => Err(DescribeError::NotAnEnum(ty.clone())),
        }
    }

    fn fields(&self, ty: &TypeId) -> Result<Vec<FieldInfo>, DescribeError> {
        let mut out: IndexMap<&str, FieldInfo> = IndexMap::new();
        for def in self.lineage(ty)? {
            for field in &def.fields {
                out.entry(field.name.as_str()).or_insert_with(|| FieldInfo {
                    name: field.name.clone(),
                    ty: field.ty.clone(),
                });
            }
        }
        Ok(out.into_values().collect())
    }

    fn attribute_default(&self, annotation: &TypeId, attribute: &str) -> Result<Option<AttributeValue>, DescribeError> {
        let def = self
            .constraints
            .get(annotation)
            .ok_or_else(|| DescribeError::UnknownConstraint(annotation.clone()))?;
        Ok(def.attributes.get(attribute).cloned().flatten())
    }
}

impl MetadataProvider for Catalog {
    fn bean_metadata(&self, ty: &TypeId) -> Result<BeanMetadata, DescribeError> {
        let lineage = self.lineage(ty)?;
        let mut meta = BeanMetadata::default();
        let mut shadowed = HashSet::new();
        for def in lineage {
            meta.constraints.extend(self.expand_all(&def.constraints)?);
            for field in &def.fields {
                if !shadowed.insert(field.name.as_str()) || !field.is_constrained() {
                    continue;
                }
                meta.properties.push(PropertyMetadata {
                    name: field.name.clone(),
                    constraints: self.expand_all(&field.constraints)?,
                    cascaded: field.cascade,
                    group_conversions: field
                        .group_conversions
                        .iter()
                        .map(|c| GroupConversion { from: c.from.clone(), to: c.to.clone() })
                        .collect(),
                });
            }
        }
        Ok(meta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn catalog() -> Catalog {
        let mut catalog = Catalog::with_builtin_constraints();
        catalog
            .merge_value(json!({
                "types": [
                    { "name": "com.acme.Base", "fields": [
                        { "name": "id", "type": "long", "constraints": [{ "annotation": "javax.validation.constraints.NotNull" }] },
                        { "name": "note", "type": "java.lang.String" }
                    ] },
                    { "name": "com.acme.Child", "superclass": "com.acme.Base", "fields": [
                        { "name": "note", "type": "com.acme.Note" },
                        { "name": "size", "type": "int" }
                    ] },
                    { "name": "com.acme.Note" },
                    { "name": "com.acme.Color", "kind": "enum", "constants": ["RED", "GREEN", "BLUE"] }
                ],
                "constraints": [
                    { "name": "com.acme.ZipCode", "reportAsSingle": true,
                      "attributes": { "message": "bad zip", "groups": [] },
                      "composedOf": [{ "annotation": "javax.validation.constraints.Pattern",
                                       "attributes": { "regexp": "[0-9]{5}" } }] }
                ]
            }))
            .unwrap();
        catalog
    }

    #[test]
    fn fields_include_inherited_and_subclass_shadows() {
        let fields = catalog().fields(&TypeId::from("com.acme.Child")).unwrap();
        let names: Vec<_> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["note", "size", "id"]);
        assert_eq!(fields[0].ty, TypeRef::class("com.acme.Note"));
    }

    #[test]
    fn inherited_constraints_are_reported() {
        let meta = catalog().bean_metadata(&TypeId::from("com.acme.Child")).unwrap();
        assert_eq!(meta.properties.len(), 1);
        assert_eq!(meta.properties[0].name, "id");
        // defaults are filled in like a validation runtime would
        let not_null = &meta.properties[0].constraints[0];
        assert_eq!(not_null.attributes.get("groups"), Some(&AttributeValue::List(vec![])));
        assert_eq!(not_null.validator_count, 1);
    }

    #[test]
    fn composing_constraints_inherit_groups() {
        let catalog = catalog();
        let usage = ConstraintUse::new("com.acme.ZipCode")
            .with("groups", AttributeValue::List(vec![AttributeValue::class("com.acme.Strict")]));
        let meta = catalog.expand(&usage, &mut Vec::new()).unwrap();
        assert!(meta.report_as_single);
        assert_eq!(meta.validator_count, 0);
        let pattern = &meta.composing[0];
        assert_eq!(pattern.attributes["regexp"], AttributeValue::Str("[0-9]{5}".into()));
        assert_eq!(pattern.attributes["groups"], AttributeValue::List(vec![AttributeValue::class("com.acme.Strict")]));
    }

    #[test]
    fn required_attribute_must_be_given() {
        let catalog = catalog();
        let err = catalog
            .expand(&ConstraintUse::new("javax.validation.constraints.Pattern"), &mut Vec::new())
            .unwrap_err();
        assert!(matches!(err, DescribeError::MissingAttribute { .. }));
    }

    #[test]
    fn composition_cycles_are_errors() {
        let mut catalog = Catalog::new();
        catalog
            .merge_value(json!({ "constraints": [
                { "name": "a.A", "composedOf": [{ "annotation": "a.B" }] },
                { "name": "a.B", "composedOf": [{ "annotation": "a.A" }] }
            ] }))
            .unwrap();
        let err = catalog.expand(&ConstraintUse::new("a.A"), &mut Vec::new()).unwrap_err();
        assert!(matches!(err, DescribeError::CyclicComposition(_)));
    }

    #[test]
    fn superclass_cycles_are_errors() {
        let mut catalog = Catalog::new();
        catalog
            .merge_value(json!({ "types": [
                { "name": "a.A", "superclass": "a.B" },
                { "name": "a.B", "superclass": "a.A" }
            ] }))
            .unwrap();
        assert!(matches!(catalog.fields(&TypeId::from("a.A")), Err(DescribeError::CyclicSuperclass(_))));
    }

    #[test]
    fn undeclared_library_superclass_ends_the_walk() {
        let mut catalog = Catalog::new();
        catalog
            .merge_value(json!({ "types": [
                { "name": "a.Registry", "superclass": "java.util.AbstractMap",
                  "fields": [{ "name": "size", "type": "int" }] },
                { "name": "a.Stray", "superclass": "org.lib.Base" }
            ] }))
            .unwrap();
        let fields = catalog.fields(&TypeId::from("a.Registry")).unwrap();
        assert_eq!(fields.iter().map(|f| f.name.as_str()).collect::<Vec<_>>(), vec!["size"]);
        assert!(matches!(
            catalog.fields(&TypeId::from("a.Stray")),
            Err(DescribeError::UnknownType(id)) if id.as_str() == "org.lib.Base"
        ));

        catalog.set_library_namespaces(["org.lib.".to_owned()]);
        assert!(catalog.fields(&TypeId::from("a.Stray")).unwrap().is_empty());
        assert!(catalog.bean_metadata(&TypeId::from("a.Stray")).is_ok());
    }

    #[test]
    fn merge_rejects_duplicates_bad_names_and_stray_variables() {
        let mut catalog = catalog();
        let dup = catalog.merge_value(json!({ "types": [{ "name": "com.acme.Note" }] }));
        assert!(matches!(dup, Err(CatalogError::Duplicate { .. })));
        let bad = catalog.merge_value(json!({ "types": [{ "name": "com..acme" }] }));
        assert!(matches!(bad, Err(CatalogError::InvalidName { .. })));
        let var = catalog.merge_value(json!({ "types": [{ "name": "com.acme.Box", "fields": [
            { "name": "items", "type": { "raw": "java.util.List", "args": [{ "var": "T" }] } }
        ] }] }));
        assert!(matches!(var, Err(CatalogError::UnknownTypeVariable { .. })));
        // nothing from a rejected document is kept
        assert!(catalog.type_def(&TypeId::from("com.acme.Box")).is_none());
    }

    #[test]
    fn parse_errors_point_at_the_offending_node() {
        let err = Catalog::from_json_str(r#"{"types": [{"name": "a.A", "fields": [{"name": "x"}]}]}"#).unwrap_err();
        match err {
            CatalogError::Parse { path, .. } => assert_eq!(path, "types[0].fields[0]"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn kinds_and_enum_constants() {
        let catalog = catalog();
        assert_eq!(catalog.kind(&TypeId::from("int")).unwrap(), TypeKind::Primitive);
        assert_eq!(catalog.kind(&TypeId::from("com.acme.Color")).unwrap(), TypeKind::Enum);
        assert_eq!(
            catalog.enum_constants(&TypeId::from("com.acme.Color")).unwrap(),
            vec!["RED", "GREEN", "BLUE"]
        );
        assert!(matches!(catalog.kind(&TypeId::from("com.acme.Missing")), Err(DescribeError::UnknownType(_))));
    }
}
