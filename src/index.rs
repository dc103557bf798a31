//! Lookup over an emitted descriptor graph, keyed by the flattened type name
//! (`Person`, `Array,Item`, `List,Item`).
use indexmap::IndexMap;

use crate::descriptor::{PropertyDescriptor, TypeDescriptor};

#[derive(Debug, Clone, Default)]
pub struct DescriptorIndex {
    types: IndexMap<String, TypeDescriptor>,
}

impl DescriptorIndex {
    pub fn new() -> Self { Self::default() }

    pub fn from_json_str(src: &str) -> Result<Self, crate::error::CatalogError> {
        let descriptors: Vec<TypeDescriptor> = crate::path_de::from_str_with_path(src)?;
        let mut index = Self::new();
        index.register(descriptors);
        Ok(index)
    }

    /// Later registrations replace earlier ones with the same key.
    pub fn register(&mut self, descriptors: impl IntoIterator<Item = TypeDescriptor>) {
        for descriptor in descriptors {
            self.types.insert(descriptor.type_name.to_string(), descriptor);
        }
    }

    pub fn type_descriptor(&self, key: &str) -> Option<&TypeDescriptor> { self.types.get(key) }

    pub fn property_descriptor(&self, type_key: &str, property: &str) -> Option<&PropertyDescriptor> {
        self.types.get(type_key)?.properties.get(property)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> { self.types.keys().map(String::as_str) }

    pub fn len(&self) -> usize { self.types.len() }

    pub fn is_empty(&self) -> bool { self.types.is_empty() }
}
