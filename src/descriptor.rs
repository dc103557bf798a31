// Output model handed to the serializer. No framework objects here.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::type_name::TypeNameDescriptor;

fn is_false(b: &bool) -> bool { !*b }

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeDescriptor {
    pub type_name: TypeNameDescriptor,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_basic_type: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<ConstraintDescriptor>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, PropertyDescriptor>,
}

impl TypeDescriptor {
    pub fn new(type_name: TypeNameDescriptor) -> Self {
        Self {
            type_name,
            is_basic_type: false,
            constraints: Vec::new(),
            properties: IndexMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDescriptor {
    #[serde(alias = "porpertyTypeName")]
    pub type_name: TypeNameDescriptor,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<ConstraintDescriptor>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub cascade: bool,
    /// from-group simple name → to-group simple name
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub group_conversions: IndexMap<String, String>,
}

impl PropertyDescriptor {
    pub fn new(type_name: TypeNameDescriptor) -> Self {
        Self {
            type_name,
            constraints: Vec::new(),
            cascade: false,
            group_conversions: IndexMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstraintDescriptor {
    #[serde(alias = "constraintName")]
    pub name: TypeNameDescriptor,
    /// Only attributes that differ from the declared default.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub attributes: IndexMap<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub composing_constraints: Vec<ConstraintDescriptor>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub report_as_single: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub has_no_validator: bool,
}

impl ConstraintDescriptor {
    pub fn new(name: TypeNameDescriptor) -> Self {
        Self {
            name,
            attributes: IndexMap::new(),
            composing_constraints: Vec::new(),
            report_as_single: false,
            has_no_validator: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_and_false_fields_are_omitted() {
        let mut ty = TypeDescriptor::new(TypeNameDescriptor::scalar("Person"));
        ty.properties.insert("name".into(), PropertyDescriptor::new(TypeNameDescriptor::scalar("String")));
        assert_eq!(
            serde_json::to_value(&ty).unwrap(),
            json!({ "typeName": "Person", "properties": { "name": { "typeName": "String" } } })
        );
    }

    #[test]
    fn legacy_keys_are_accepted() {
        let v = json!({
            "typeName": ["Array", "Item"],
            "properties": {
                "x": { "porpertyTypeName": "int",
                       "constraints": [{ "constraintName": "Min", "attributes": { "value": 1 } }] }
            }
        });
        let ty: TypeDescriptor = serde_json::from_value(v).unwrap();
        let x = &ty.properties["x"];
        assert_eq!(x.type_name, TypeNameDescriptor::scalar("int"));
        assert_eq!(x.constraints[0].name, TypeNameDescriptor::scalar("Min"));
        assert_eq!(x.constraints[0].attributes["value"], json!(1));
    }
}
